use anyhow::Result;
use clap::Parser;

use testrail_mcp_cli::{handlers, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    handlers::run(cli).await
}
