//! Correct `route_insights.min_price_ever` from the true minimum in `matrix_prices`.

use std::io::{self, Write};

use anyhow::{Result, bail};
use fare_admin_core::{
    AdminConfig, BackfillOutcome, VERIFICATION_SAMPLE_SIZE, Verification, group_thousands,
};
use fare_admin_storage::PgAdmin;

use crate::storage_context;

pub async fn run(config: &AdminConfig) -> Result<()> {
    let admin = storage_context(PgAdmin::connect(config).await, "connecting to database")?;
    let outcome = storage_context(admin.run_min_price_backfill().await, "running backfill")?;
    admin.close().await;

    let stdout = io::stdout();
    render(&outcome, &mut stdout.lock())?;

    // The correction is committed and reported above; only the spot-check failed.
    if let Some(err) = outcome.verification_error() {
        bail!("verification sample failed after commit: {err}");
    }
    Ok(())
}

/// Write the human-readable summary of a run.
pub fn render(outcome: &BackfillOutcome, out: &mut impl Write) -> io::Result<()> {
    match outcome {
        BackfillOutcome::NothingToFix => {
            writeln!(out, "Found 0 routes where min_price_ever needs correction.")?;
            writeln!(out, "Nothing to fix. Exiting.")?;
        },
        BackfillOutcome::Corrected { mismatches, updated, verification } => {
            writeln!(
                out,
                "Found {} routes where min_price_ever needs correction.",
                group_thousands(*mismatches)
            )?;
            writeln!(out, "Updated {} rows.", group_thousands(*updated))?;
            writeln!(out)?;
            match verification {
                Verification::Checked(sample) => {
                    writeln!(out, "Verification sample ({VERIFICATION_SAMPLE_SIZE} routes):")?;
                    for check in sample {
                        writeln!(out, "  {check}")?;
                    }
                },
                Verification::Failed(err) => {
                    writeln!(out, "Verification sample unavailable: {err}")?;
                },
            }
            writeln!(out)?;
            writeln!(out, "Backfill complete.")?;
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use fare_admin_core::{RouteKey, SampleCheck};

    use super::*;

    fn rendered(outcome: &BackfillOutcome) -> String {
        let mut buf = Vec::new();
        render(outcome, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_nothing_to_fix() {
        assert_eq!(
            rendered(&BackfillOutcome::NothingToFix),
            "Found 0 routes where min_price_ever needs correction.\nNothing to fix. Exiting.\n"
        );
    }

    #[test]
    fn test_render_corrected() {
        let outcome = BackfillOutcome::Corrected {
            mismatches: 12_408,
            updated: 12_408,
            verification: Verification::Checked(vec![
                SampleCheck::new(RouteKey::new("ATL", "CUN"), Some(289.0), Some(289.0)),
                SampleCheck::new(RouteKey::new("BOS", "LAX"), Some(199.0), Some(250.0)),
            ]),
        };
        let text = rendered(&outcome);
        assert!(text.starts_with("Found 12,408 routes where min_price_ever needs correction.\n"));
        assert!(text.contains("Updated 12,408 rows.\n\nVerification sample (5 routes):\n"));
        assert!(text.contains("  ATL->CUN: stored=$289, actual_min=$289 [OK]\n"));
        assert!(text.contains("  BOS->LAX: stored=$199, actual_min=$250 [MISMATCH]\n"));
        assert!(text.ends_with("\nBackfill complete.\n"));
    }

    #[test]
    fn test_render_failed_verification_still_reports_counts() {
        let outcome = BackfillOutcome::Corrected {
            mismatches: 1_500,
            updated: 1_499,
            verification: Verification::Failed(
                "backfill verification failed: pool timed out".to_owned(),
            ),
        };
        let text = rendered(&outcome);
        assert!(text.starts_with(
            "Found 1,500 routes where min_price_ever needs correction.\nUpdated 1,499 rows.\n"
        ));
        assert!(text.contains(
            "Verification sample unavailable: backfill verification failed: pool timed out\n"
        ));
        assert!(!text.contains("Verification sample (5 routes)"));
    }
}
