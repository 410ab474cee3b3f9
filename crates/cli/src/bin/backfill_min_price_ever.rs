use anyhow::{Context, Result};
use clap::Parser;
use fare_admin_core::{AdminConfig, TlsPolicy};

/// One-time backfill: correct min_price_ever in route_insights using the true
/// minimum from matrix_prices. Only rows where the stored value is NULL or
/// higher than the actual minimum are updated.
#[derive(Parser)]
#[command(name = "backfill-min-price-ever", version)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    Cli::parse();
    fare_admin_cli::init_tracing();

    let config = AdminConfig::load(TlsPolicy::Require).context("loading configuration")?;
    fare_admin_cli::commands::backfill::run(&config).await
}
