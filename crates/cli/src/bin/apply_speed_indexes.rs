use anyhow::{Context, Result};
use clap::Parser;
use fare_admin_core::{AdminConfig, TlsPolicy};

/// Apply speed-focused PostgreSQL indexes and refresh planner statistics.
#[derive(Parser)]
#[command(name = "apply-speed-indexes", version)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    Cli::parse();
    fare_admin_cli::init_tracing();

    let config = AdminConfig::load(TlsPolicy::FromUrl).context("loading configuration")?;
    fare_admin_cli::commands::indexes::run(&config).await
}
