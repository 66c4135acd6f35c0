use anyhow::{Context, Result};
use clap::Parser;

use airq_cli::{run, Args};
use airq_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    airq_obs::init("airq");

    let args = Args::parse();
    let cfg = AppConfig::load().context("Failed to load configuration")?;

    run(args, cfg).await?;
    Ok(())
}
