pub mod commands;

use std::path::PathBuf;

use clap::Parser;
use commands::SubCommand;
use env_logger::Env;

#[derive(Parser, Debug)]
#[command(name = "bedrock")]
#[command(about = "Bedrock XRPL smart contract toolkit")]
struct Cli {
    /// Project directory holding bedrock.toml
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: SubCommand,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    cli.command.call(&cli.project_dir).await?;
    Ok(())
}
