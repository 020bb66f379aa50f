use anyhow::Result;
use clap::Parser;
use ledgerbot::cli::Cli;
use ledgerbot::config;

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    let cli = Cli::parse();
    cli.run().await
}
