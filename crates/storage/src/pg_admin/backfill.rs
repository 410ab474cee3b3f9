//! One-time correction of `route_insights.min_price_ever` from `matrix_prices`.
//!
//! Only rows whose cached minimum is NULL or higher than the true minimum are
//! touched, so the cached value only ever moves down. Rows for routes with no
//! detail prices are left alone.

use fare_admin_core::{
    BackfillOutcome, CheckLabel, RouteKey, SampleCheck, VERIFICATION_SAMPLE_SIZE, Verification,
};
use sqlx::{Executor, Postgres, Transaction};

use super::{PgAdmin, count_to_u64};
use crate::error::StorageError;

const MISMATCH_COUNT_SQL: &str = "
    SELECT COUNT(*)
    FROM route_insights ri
    JOIN (
        SELECT origin, destination, MIN(price) AS true_min
        FROM matrix_prices
        GROUP BY origin, destination
    ) sub ON ri.origin = sub.origin AND ri.destination = sub.destination
    WHERE ri.min_price_ever IS NULL OR sub.true_min < ri.min_price_ever";

// The true minimum is derived again inside the UPDATE; nothing from the
// preflight count is carried over.
const CORRECTION_SQL: &str = "
    UPDATE route_insights ri
    SET min_price_ever = sub.true_min,
        updated_at = NOW()
    FROM (
        SELECT origin, destination, MIN(price) AS true_min
        FROM matrix_prices
        GROUP BY origin, destination
    ) sub
    WHERE ri.origin = sub.origin
      AND ri.destination = sub.destination
      AND (ri.min_price_ever IS NULL OR sub.true_min < ri.min_price_ever)";

const SAMPLE_SQL: &str = "
    SELECT ri.origin,
           ri.destination,
           ri.min_price_ever::DOUBLE PRECISION AS stored,
           (SELECT MIN(price) FROM matrix_prices mp
            WHERE mp.origin = ri.origin AND mp.destination = ri.destination
           )::DOUBLE PRECISION AS true_min
    FROM route_insights ri
    ORDER BY RANDOM()
    LIMIT $1";

/// Open correction transaction.
///
/// Dropping it without [`CorrectionTx::commit`] rolls the transaction back,
/// so an early `?` return never leaves a partial update behind.
pub struct CorrectionTx {
    tx: Transaction<'static, Postgres>,
}

impl CorrectionTx {
    /// Run the conditional UPDATE. Returns the number of rows changed.
    pub async fn apply(&mut self) -> Result<u64, StorageError> {
        let result = sqlx::query(CORRECTION_SQL)
            .execute(&mut *self.tx)
            .await
            .map_err(StorageError::backfill("update"))?;
        Ok(result.rows_affected())
    }

    /// Mismatch count as seen from inside this transaction.
    pub async fn count_mismatches(&mut self) -> Result<u64, StorageError> {
        count_mismatches_on(&mut *self.tx).await
    }

    pub async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await.map_err(StorageError::backfill("commit"))
    }

    pub async fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback().await.map_err(StorageError::backfill("rollback"))
    }
}

async fn count_mismatches_on<'e, E>(executor: E) -> Result<u64, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let count: i64 = sqlx::query_scalar(MISMATCH_COUNT_SQL)
        .fetch_one(executor)
        .await
        .map_err(StorageError::backfill("preflight"))?;
    Ok(count_to_u64(count))
}

impl PgAdmin {
    /// Preflight: summary rows whose `min_price_ever` is NULL or above the detail minimum.
    pub async fn count_min_price_mismatches(&self) -> Result<u64, StorageError> {
        count_mismatches_on(&self.pool).await
    }

    pub async fn begin_correction(&self) -> Result<CorrectionTx, StorageError> {
        let tx = self.pool.begin().await.map_err(StorageError::backfill("begin"))?;
        Ok(CorrectionTx { tx })
    }

    /// Random spot-check of stored minimums against freshly computed ones.
    pub async fn min_price_verification_sample(
        &self,
        limit: i64,
    ) -> Result<Vec<SampleCheck>, StorageError> {
        let rows: Vec<(String, String, Option<f64>, Option<f64>)> = sqlx::query_as(SAMPLE_SQL)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::backfill("verification"))?;
        Ok(rows
            .into_iter()
            .map(|(origin, destination, stored, true_min)| {
                SampleCheck::new(RouteKey::new(origin, destination), stored, true_min)
            })
            .collect())
    }

    /// Preflight count, atomic correction, commit, then a verification sample.
    ///
    /// Once the correction has committed the outcome is always returned: sample
    /// mismatches and a failed sample query are logged and carried in
    /// [`Verification`], never raised as errors.
    pub async fn run_min_price_backfill(&self) -> Result<BackfillOutcome, StorageError> {
        tracing::info!("scanning for mismatched min_price_ever values");
        let mismatches = self.count_min_price_mismatches().await?;
        tracing::info!(mismatches, "preflight scan complete");

        if mismatches == 0 {
            return Ok(BackfillOutcome::NothingToFix);
        }

        tracing::info!("applying backfill UPDATE");
        let mut tx = self.begin_correction().await?;
        let updated = tx.apply().await?;
        tx.commit().await?;
        tracing::info!(updated, "backfill committed");

        let verification =
            match self.min_price_verification_sample(VERIFICATION_SAMPLE_SIZE).await {
                Ok(sample) => {
                    for check in sample.iter().filter(|c| c.label() == CheckLabel::Mismatch) {
                        tracing::warn!(
                            route = %check.route,
                            stored = ?check.stored,
                            actual_min = ?check.actual_min,
                            "verification sample mismatch"
                        );
                    }
                    Verification::Checked(sample)
                },
                Err(err) => {
                    tracing::warn!(
                        transient = err.is_transient(),
                        "verification sample failed: {err}"
                    );
                    Verification::Failed(err.to_string())
                },
            };

        Ok(BackfillOutcome::Corrected { mismatches, updated, verification })
    }
}
