//! Apply the speed-oriented indexes and refresh planner statistics.

use std::io::{self, Write};

use anyhow::Result;
use fare_admin_core::AdminConfig;
use fare_admin_storage::{IndexReport, IndexStep, PgAdmin};

use crate::storage_context;

pub async fn run(config: &AdminConfig) -> Result<()> {
    let admin = storage_context(PgAdmin::connect(config).await, "connecting to database")?;
    println!("Applying performance indexes...");
    let report = storage_context(
        admin
            .apply_speed_indexes(|position, total, index| {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                // A failed progress write must not abort the DDL.
                let _ = progress_line(position, total, index, &mut out).and_then(|()| out.flush());
            })
            .await,
        "applying indexes",
    )?;
    admin.close().await;

    let stdout = io::stdout();
    render(&report, &mut stdout.lock())?;
    Ok(())
}

/// Announce a statement before it is sent.
pub fn progress_line(
    position: usize,
    total: usize,
    index: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "[{position}/{total}] running {index}...")
}

/// Summary printed once every statement has finished.
pub fn render(report: &IndexReport, out: &mut impl Write) -> io::Result<()> {
    for step in &report.steps {
        if let IndexStep::Skipped { .. } = step {
            writeln!(out, "{step}")?;
        }
    }
    let analyzed: Vec<&str> = report
        .steps
        .iter()
        .filter_map(|s| match s {
            IndexStep::Analyzed { table } => Some(*table),
            _ => None,
        })
        .collect();
    writeln!(out, "Analyzed: {}", analyzed.join(", "))?;
    writeln!(out, "Done.")?;
    Ok(())
}
