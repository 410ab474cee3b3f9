use anyhow::{Context, Result};
use clap::Parser;
use fare_admin_core::{AdminConfig, TlsPolicy};

/// Print EXPLAIN ANALYZE plans for key site queries.
#[derive(Parser)]
#[command(name = "validate-query-plans", version)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    Cli::parse();
    fare_admin_cli::init_tracing();

    let config = AdminConfig::load(TlsPolicy::FromUrl).context("loading configuration")?;
    fare_admin_cli::commands::query_plans::run(&config).await
}
