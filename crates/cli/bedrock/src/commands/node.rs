use std::{path::Path, time::Duration};

use br_ledger::{DaemonSupervisor, HttpAdminRpc, LedgerAdvancer, LedgerService};
use br_types::LedgerAdvancementConfig;
use br_utils_cli::{
    load_project_config, CliCommand, LocalNodeConfig, NodeManager, StartOptions,
    DEFAULT_LOCAL_WS_URL,
};
use colored::*;
use tokio_util::sync::CancellationToken;

/// How often `node start --foreground` prints the advancement status.
const STATUS_REPORT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(clap::Parser, Debug, Clone)]
#[clap(about = "Manages the local XRPL node")]
pub struct NodeCmd {
    #[command(subcommand)]
    pub action: NodeAction,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum NodeAction {
    /// Starts the node container and automatic ledger advancement
    Start {
        /// Advance ledgers from this process instead of a background daemon
        #[arg(long)]
        foreground: bool,
    },
    /// Stops ledger advancement and the node container
    Stop,
    /// Shows the node container and ledger daemon state
    Status,
    /// Prints the node logs
    Logs {
        /// Number of lines from the end of the logs
        #[arg(long, default_value_t = 100)]
        tail: usize,
    },
}

#[async_trait::async_trait]
impl CliCommand for NodeCmd {
    async fn call(&self, project_dir: &Path) -> anyhow::Result<()> {
        match &self.action {
            NodeAction::Start { foreground } => start(project_dir, *foreground).await,
            NodeAction::Stop => stop(project_dir).await,
            NodeAction::Status => status(project_dir).await,
            NodeAction::Logs { tail } => {
                print!("{}", NodeManager::new().logs(*tail).await?);
                Ok(())
            }
        }
    }
}

async fn start(project_dir: &Path, foreground: bool) -> anyhow::Result<()> {
    let config = load_project_config(project_dir)?;
    let local_node = &config.local_node;

    let manager = NodeManager::new();
    let opts = StartOptions {
        docker_image: local_node.docker_image.clone(),
        config_dir: project_dir.join(&local_node.config_dir),
    };

    println!("Starting local node ({})...", opts.docker_image);
    manager.start(&opts).await?;
    println!("{} Node started", "✓".green());
    println!("  WebSocket: {}", DEFAULT_LOCAL_WS_URL.bright_white());

    if !local_node.auto_advance_enabled() {
        println!(
            "{} ledger_interval is 0: ledgers will not advance automatically",
            "!".yellow()
        );
        return Ok(());
    }
    let ledger = local_node.ledger_config()?;

    if foreground {
        return run_foreground(ledger).await;
    }

    start_daemon(project_dir, &ledger, local_node);
    Ok(())
}

fn start_daemon(
    project_dir: &Path,
    ledger: &LedgerAdvancementConfig,
    local_node: &LocalNodeConfig,
) {
    let supervisor = DaemonSupervisor::for_project(project_dir);
    if supervisor.is_running() {
        println!("{} Ledger daemon already running", "✓".green());
        return;
    }

    match supervisor.start(ledger) {
        Ok(pid) => {
            println!(
                "{} Ledger auto-advance started (every {}ms, pid {pid})",
                "✓".green(),
                local_node.ledger_interval
            );
            println!("  Log: {}", supervisor.log_file().display());
        }
        Err(e) => {
            println!(
                "{}",
                format!("! Failed to start ledger daemon: {e}").yellow()
            );
            println!("{}", "  Ledgers will not advance automatically".yellow());
        }
    }
}

async fn run_foreground(ledger: LedgerAdvancementConfig) -> anyhow::Result<()> {
    let rpc = HttpAdminRpc::new(ledger.rpc_endpoint())?;
    let shutdown = CancellationToken::new();
    let signals = br_ledger::cancel_on_shutdown_signal(shutdown.clone());
    let mut service = LedgerService::new(LedgerAdvancer::new(rpc, ledger), shutdown.clone());

    println!("Waiting for the node to accept requests...");
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            println!("{} Interrupted before the node became ready", "!".yellow());
            return Ok(());
        }
        started = service.start_when_ready() => started?,
    }
    println!(
        "{} Advancing ledgers in the foreground. Press Ctrl+C to stop.",
        "✓".green()
    );

    let mut report = tokio::time::interval(STATUS_REPORT_INTERVAL);
    report.tick().await;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = report.tick() => {
                let status = service.status().await;
                match &status.last_error {
                    Some(error) => println!(
                        "  ledger {} ({} advanced), last error: {}",
                        status.last_ledger_index,
                        status.advanced_count,
                        error.red()
                    ),
                    None => println!(
                        "  ledger {} ({} advanced)",
                        status.last_ledger_index, status.advanced_count
                    ),
                }
            }
        }
    }

    service.stop().await;
    let _ = signals.await;
    let status = service.status().await;
    println!(
        "{} Ledger advancement stopped ({} ledgers advanced)",
        "✓".green(),
        status.advanced_count
    );
    println!("  The node keeps running, use `bedrock node stop` to stop it.");
    Ok(())
}

async fn stop(project_dir: &Path) -> anyhow::Result<()> {
    let supervisor = DaemonSupervisor::for_project(project_dir);
    if let Err(e) = supervisor.stop().await {
        println!("{}", format!("! Failed to stop ledger daemon: {e}").yellow());
    }

    NodeManager::new().stop().await?;
    println!("{} Node stopped", "✓".green());
    Ok(())
}

async fn status(project_dir: &Path) -> anyhow::Result<()> {
    match NodeManager::new().status().await? {
        Some(node) if node.running => {
            println!("{} Node running", "✓".green());
            println!("  Container: {}", node.container_id);
            println!("  Image: {}", node.image);
            if !node.ports.is_empty() {
                println!("  Ports: {}", node.ports.join(", "));
            }
        }
        Some(node) => println!("{} Node stopped (container: {})", "✗".red(), node.container_id),
        None => println!("{} Node not running", "✗".red()),
    }

    let supervisor = DaemonSupervisor::for_project(project_dir);
    if supervisor.is_running() {
        println!("{} Ledger daemon running", "✓".green());
    } else {
        println!("{} Ledger daemon not running", "✗".red());
    }
    println!("  Log: {}", supervisor.log_file().display());
    Ok(())
}
