use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use br_types::LedgerAdvancementConfig;
use serde::{Deserialize, Serialize};

use crate::{
    BEDROCK_CONFIG_FILE, DEFAULT_DOCKER_IMAGE, DEFAULT_LOCAL_RPC_URL, DEFAULT_NODE_CONFIG_DIR,
};

/// Contents of `bedrock.toml`. Sections the node tooling does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedrockConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub local_node: LocalNodeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub url: String,
    #[serde(default)]
    pub network_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faucet_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer: Option<String>,
}

/// `[local_node]`: where the node config lives, which image to run and how
/// often to close ledgers. An interval of 0 disables auto-advancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalNodeConfig {
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
    #[serde(default = "default_docker_image")]
    pub docker_image: String,
    /// Milliseconds between two ledger closes.
    #[serde(default = "default_ledger_interval")]
    pub ledger_interval: u64,
}

fn default_config_dir() -> String {
    DEFAULT_NODE_CONFIG_DIR.to_string()
}

fn default_docker_image() -> String {
    DEFAULT_DOCKER_IMAGE.to_string()
}

fn default_ledger_interval() -> u64 {
    br_types::DEFAULT_INTERVAL_MS
}

impl Default for LocalNodeConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            docker_image: default_docker_image(),
            ledger_interval: default_ledger_interval(),
        }
    }
}

impl LocalNodeConfig {
    pub fn auto_advance_enabled(&self) -> bool {
        self.ledger_interval > 0
    }

    /// Ledger advancement settings for the node started from this config.
    pub fn ledger_config(&self) -> Result<LedgerAdvancementConfig> {
        LedgerAdvancementConfig::new(DEFAULT_LOCAL_RPC_URL, self.ledger_interval)
            .context("Invalid [local_node] ledger settings")
    }
}

impl BedrockConfig {
    pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
        self.networks.get(name)
    }
}

/// Reads and parses a `bedrock.toml` file, applying local node defaults.
pub fn read_config_file(file_path: &Path) -> Result<BedrockConfig> {
    let content = fs::read_to_string(file_path).context(format!(
        "Failed to load config: cannot read {}",
        file_path.display()
    ))?;

    parse_config(&content).context(format!(
        "Failed to load config: cannot parse {}",
        file_path.display()
    ))
}

/// Loads `bedrock.toml` from a project directory.
pub fn load_project_config(project_dir: &Path) -> Result<BedrockConfig> {
    read_config_file(&project_dir.join(BEDROCK_CONFIG_FILE))
}

pub fn parse_config(content: &str) -> Result<BedrockConfig> {
    let mut config: BedrockConfig = toml::from_str(content)?;

    // Blank values behave like missing ones.
    if config.local_node.config_dir.trim().is_empty() {
        config.local_node.config_dir = default_config_dir();
    }
    if config.local_node.docker_image.trim().is_empty() {
        config.local_node.docker_image = default_docker_image();
    }

    Ok(config)
}
