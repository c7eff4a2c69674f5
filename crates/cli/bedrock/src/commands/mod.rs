pub mod ledger_daemon;
pub mod node;

use std::path::Path;

use br_utils_cli::CliCommand;
use clap::Parser;
use ledger_daemon::LedgerDaemonCmd;
use node::NodeCmd;

#[derive(Debug, Parser, Clone)]
pub enum SubCommand {
    // Manage the local XRPL node
    #[clap(name = "node", bin_name = "node")]
    Node(NodeCmd),
    // Ledger advancement loop, spawned by `node start`
    #[clap(name = "_ledger-daemon", bin_name = "_ledger-daemon", hide = true)]
    LedgerDaemon(LedgerDaemonCmd),
}

impl SubCommand {
    pub async fn call(&self, project_dir: &Path) -> anyhow::Result<()> {
        match self {
            Self::Node(cmd) => cmd.call(project_dir).await?,
            Self::LedgerDaemon(cmd) => cmd.call(project_dir).await?,
        };

        Ok(())
    }
}
