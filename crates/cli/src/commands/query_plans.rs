//! Print `EXPLAIN (ANALYZE, BUFFERS)` output for the site's key queries.

use std::io::{self, Write};

use anyhow::Result;
use fare_admin_core::{AdminConfig, PLAN_RULE_WIDTH};
use fare_admin_storage::{PgAdmin, PlanReport};

use crate::storage_context;

pub async fn run(config: &AdminConfig) -> Result<()> {
    let admin = storage_context(PgAdmin::connect(config).await, "connecting to database")?;
    let reports =
        storage_context(admin.explain_catalog().await, "explaining catalog queries")?;
    admin.close().await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        render(report, &mut out)?;
    }
    Ok(())
}

pub fn render(report: &PlanReport, out: &mut impl Write) -> io::Result<()> {
    let rule = "=".repeat(PLAN_RULE_WIDTH);
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{}", report.name)?;
    writeln!(out, "{rule}")?;
    for line in &report.lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
