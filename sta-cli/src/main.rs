//! STA CLI - Command line tool for seasonal temperature anomaly analysis.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sta-cli",
    version,
    about = "Seasonal temperature anomaly toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: sta_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    sta_cmd::run(cli.command).await
}
