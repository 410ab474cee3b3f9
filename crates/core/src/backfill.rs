//! Result types of the `min_price_ever` backfill.

use std::fmt;

use crate::format::format_price;
use crate::route::RouteKey;

/// Outcome of comparing a stored minimum with the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLabel {
    Ok,
    Mismatch,
}

impl CheckLabel {
    /// Both sides absent counts as a match: a route without detail rows
    /// and without a cached minimum is consistent.
    #[allow(clippy::float_cmp, reason = "both values come from the same NUMERIC column")]
    pub fn compare(stored: Option<f64>, actual: Option<f64>) -> Self {
        if stored == actual { Self::Ok } else { Self::Mismatch }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Mismatch => "MISMATCH",
        }
    }
}

impl fmt::Display for CheckLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the post-commit verification sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCheck {
    pub route: RouteKey,
    pub stored: Option<f64>,
    pub actual_min: Option<f64>,
}

impl SampleCheck {
    pub fn new(route: RouteKey, stored: Option<f64>, actual_min: Option<f64>) -> Self {
        Self { route, stored, actual_min }
    }

    pub fn label(&self) -> CheckLabel {
        CheckLabel::compare(self.stored, self.actual_min)
    }
}

impl fmt::Display for SampleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: stored={}, actual_min={} [{}]",
            self.route,
            format_price(self.stored),
            format_price(self.actual_min),
            self.label()
        )
    }
}

/// Result of the post-commit spot-check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Checked(Vec<SampleCheck>),
    /// The sample query failed after the correction had committed.
    Failed(String),
}

impl Verification {
    /// Checked rows; empty when the sample query failed.
    pub fn checks(&self) -> &[SampleCheck] {
        match self {
            Self::Checked(checks) => checks,
            Self::Failed(_) => &[],
        }
    }
}

/// What a backfill run did.
#[derive(Debug, Clone, PartialEq)]
pub enum BackfillOutcome {
    /// Preflight found no mismatched rows; nothing was written.
    NothingToFix,
    Corrected {
        /// Rows counted by the preflight scan.
        mismatches: u64,
        /// Rows changed by the committed UPDATE.
        updated: u64,
        verification: Verification,
    },
}

impl BackfillOutcome {
    pub fn updated(&self) -> u64 {
        match self {
            Self::NothingToFix => 0,
            Self::Corrected { updated, .. } => *updated,
        }
    }

    /// Sample rows whose stored minimum disagrees with the detail table.
    pub fn sample_mismatches(&self) -> usize {
        match self {
            Self::NothingToFix => 0,
            Self::Corrected { verification, .. } => verification
                .checks()
                .iter()
                .filter(|c| c.label() == CheckLabel::Mismatch)
                .count(),
        }
    }

    /// Error text of a failed verification sample, if any.
    pub fn verification_error(&self) -> Option<&str> {
        match self {
            Self::Corrected { verification: Verification::Failed(err), .. } => Some(err.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_equal_values() {
        assert_eq!(CheckLabel::compare(Some(289.0), Some(289.0)), CheckLabel::Ok);
    }

    #[test]
    fn test_label_both_absent_is_ok() {
        assert_eq!(CheckLabel::compare(None, None), CheckLabel::Ok);
    }

    #[test]
    fn test_label_stale_or_missing() {
        assert_eq!(CheckLabel::compare(None, Some(289.0)), CheckLabel::Mismatch);
        assert_eq!(CheckLabel::compare(Some(412.0), Some(289.0)), CheckLabel::Mismatch);
        // Kept low by the only-lower policy; still reported.
        assert_eq!(CheckLabel::compare(Some(199.0), Some(250.0)), CheckLabel::Mismatch);
        assert_eq!(CheckLabel::compare(Some(199.0), None), CheckLabel::Mismatch);
    }

    #[test]
    fn test_sample_line() {
        let check = SampleCheck::new(RouteKey::new("ATL", "CUN"), Some(289.0), Some(289.0));
        assert_eq!(check.to_string(), "ATL->CUN: stored=$289, actual_min=$289 [OK]");

        let check = SampleCheck::new(RouteKey::new("BOS", "LAX"), None, Some(250.5));
        assert_eq!(check.to_string(), "BOS->LAX: stored=NULL, actual_min=$250.50 [MISMATCH]");
    }

    #[test]
    fn test_outcome_counters() {
        let outcome = BackfillOutcome::Corrected {
            mismatches: 2,
            updated: 2,
            verification: Verification::Checked(vec![
                SampleCheck::new(RouteKey::new("ATL", "CUN"), Some(289.0), Some(289.0)),
                SampleCheck::new(RouteKey::new("BOS", "LAX"), Some(199.0), Some(250.0)),
            ]),
        };
        assert_eq!(outcome.updated(), 2);
        assert_eq!(outcome.sample_mismatches(), 1);
        assert_eq!(outcome.verification_error(), None);
        assert_eq!(BackfillOutcome::NothingToFix.updated(), 0);
    }

    #[test]
    fn test_failed_verification_keeps_committed_counts() {
        let outcome = BackfillOutcome::Corrected {
            mismatches: 3,
            updated: 3,
            verification: Verification::Failed("connection reset".to_owned()),
        };
        assert_eq!(outcome.updated(), 3);
        assert_eq!(outcome.sample_mismatches(), 0);
        assert_eq!(outcome.verification_error(), Some("connection reset"));
    }
}
