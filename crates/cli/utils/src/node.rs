//! Local node container, driven through the container engine's CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;
use tokio::process::Command;

use crate::{CONTAINER_ENGINE, CONTAINER_NAME, GENESIS_FILE, NODE_PORTS};

/// Seconds the engine waits for the node to exit before killing it.
const STOP_TIMEOUT_SECS: u32 = 10;

#[derive(Debug, Clone)]
pub struct StartOptions {
    pub docker_image: String,
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub running: bool,
    pub container_id: String,
    pub image: String,
    pub ports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NodeManager {
    engine: String,
    container: String,
}

impl Default for NodeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeManager {
    pub fn new() -> Self {
        Self {
            engine: CONTAINER_ENGINE.to_string(),
            container: CONTAINER_NAME.to_string(),
        }
    }

    pub fn with_engine(mut self, engine: &str) -> Self {
        self.engine = engine.to_string();
        self
    }

    pub fn container_name(&self) -> &str {
        &self.container
    }

    /// Pulls the image and starts a fresh node container.
    pub async fn start(&self, opts: &StartOptions) -> Result<()> {
        if let Some(existing) = self.status().await? {
            if existing.running {
                anyhow::bail!(
                    "node is already running (container: {})",
                    existing.container_id
                );
            }
            // A stopped leftover would block the container name.
            self.engine_call(&["rm", &self.container]).await?;
        }

        let genesis = genesis_path(&opts.config_dir)?;

        self.engine_call(&["pull", &opts.docker_image])
            .await
            .context("Failed to pull image")?;

        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.container.clone(),
        ];
        for port in NODE_PORTS {
            args.push("-p".to_string());
            args.push(format!("0.0.0.0:{port}:{port}"));
        }
        args.push("-v".to_string());
        args.push(format!("{}:/{GENESIS_FILE}:ro", genesis.display()));
        args.push(opts.docker_image.clone());

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.engine_call(&args)
            .await
            .context("Failed to start container")?;
        Ok(())
    }

    /// Stops and removes the node container.
    pub async fn stop(&self) -> Result<()> {
        if self.status().await?.is_none() {
            anyhow::bail!("node is not running");
        }

        let timeout = STOP_TIMEOUT_SECS.to_string();
        self.engine_call(&["stop", "-t", &timeout, &self.container])
            .await
            .context("Failed to stop container")?;
        self.engine_call(&["rm", &self.container])
            .await
            .context("Failed to remove container")?;
        Ok(())
    }

    /// Inspects the node container. `None` when it does not exist.
    pub async fn status(&self) -> Result<Option<NodeStatus>> {
        let output = Command::new(&self.engine)
            .args(["inspect", &self.container])
            .output()
            .await
            .context(format!("Failed to run {}", self.engine))?;

        if !output.status.success() {
            debug!(
                "{} inspect failed: {}",
                self.engine,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        parse_inspect(&String::from_utf8_lossy(&output.stdout)).map(Some)
    }

    /// Last `tail` lines of the node's output.
    pub async fn logs(&self, tail: usize) -> Result<String> {
        let tail = tail.to_string();
        let output = Command::new(&self.engine)
            .args(["logs", "--tail", &tail, &self.container])
            .output()
            .await
            .context(format!("Failed to run {}", self.engine))?;

        if !output.status.success() {
            anyhow::bail!(
                "Failed to fetch node logs: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // The node writes most of its output to stderr.
        let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(logs)
    }

    async fn engine_call(&self, args: &[&str]) -> Result<String> {
        debug!("{} {}", self.engine, args.join(" "));
        let output = Command::new(&self.engine)
            .args(args)
            .output()
            .await
            .context(format!("Failed to run {}", self.engine))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} {} failed: {}",
                self.engine,
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Absolute path of `genesis.json` inside the node config directory.
pub fn genesis_path(config_dir: &Path) -> Result<PathBuf> {
    let config_dir = std::path::absolute(config_dir).context(format!(
        "Failed to resolve config directory {}",
        config_dir.display()
    ))?;
    let genesis = config_dir.join(GENESIS_FILE);
    if !genesis.is_file() {
        anyhow::bail!("{GENESIS_FILE} not found in {}", config_dir.display());
    }
    Ok(genesis)
}

/// Parses the JSON printed by `<engine> inspect <container>`.
pub fn parse_inspect(json: &str) -> Result<NodeStatus> {
    let parsed: Value = serde_json::from_str(json).context("Failed to parse inspect output")?;
    let container = parsed
        .as_array()
        .and_then(|containers| containers.first())
        .ok_or_else(|| anyhow::anyhow!("Inspect output contains no container"))?;

    let container_id: String = container["Id"]
        .as_str()
        .unwrap_or_default()
        .chars()
        .take(12)
        .collect();

    let mut ports = Vec::new();
    if let Some(map) = container["NetworkSettings"]["Ports"].as_object() {
        for (port, bindings) in map {
            for binding in bindings.as_array().into_iter().flatten() {
                if let Some(host_port) = binding["HostPort"].as_str() {
                    ports.push(format!("{host_port}->{port}"));
                }
            }
        }
    }
    ports.sort();

    Ok(NodeStatus {
        running: container["State"]["Running"].as_bool().unwrap_or(false),
        container_id,
        image: container["Config"]["Image"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        ports,
    })
}
