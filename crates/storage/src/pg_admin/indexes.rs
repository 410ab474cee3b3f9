//! Speed-oriented indexes for the site's hot queries.
//!
//! `CREATE INDEX CONCURRENTLY` refuses to run inside a transaction block, so
//! every statement goes through the simple-query protocol on an autocommit
//! connection.

use std::fmt;

use super::PgAdmin;
use crate::error::StorageError;

/// An index the site expects to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedIndex {
    pub name: &'static str,
    pub table: &'static str,
    /// Everything after `ON`.
    pub definition: &'static str,
}

impl SpeedIndex {
    pub fn create_sql(&self) -> String {
        format!("CREATE INDEX CONCURRENTLY IF NOT EXISTS {} ON {}", self.name, self.definition)
    }
}

/// Indexes applied unconditionally, in order.
pub const SPEED_INDEXES: &[SpeedIndex] = &[
    SpeedIndex {
        name: "idx_route_insights_origin_quality_sample",
        table: "route_insights",
        definition: "route_insights (origin, data_quality, sample_size) \
                     WHERE typical_price IS NOT NULL",
    },
    SpeedIndex {
        name: "idx_route_insights_origin_destination_low",
        table: "route_insights",
        definition: "route_insights (origin, destination, low_price_threshold)",
    },
    SpeedIndex {
        name: "idx_matrix_prices_origin_destination_scraped",
        table: "matrix_prices",
        definition: "matrix_prices (origin, destination, scraped_date DESC)",
    },
    SpeedIndex {
        name: "idx_sent_deals_origin_sent_at_desc",
        table: "sent_deals",
        definition: "sent_deals (origin, sent_at DESC)",
    },
];

/// `explorer_prices` only exists on some deployments.
pub(crate) const EXPLORER_TABLE: &str = "explorer_prices";

const EXPLORER_INDEX: SpeedIndex = SpeedIndex {
    name: "idx_explorer_prices_origin_destination_scraped",
    table: EXPLORER_TABLE,
    definition: "explorer_prices (origin, destination, scraped_date DESC)",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStep {
    /// Index created, or already present.
    Ensured { index: &'static str },
    Skipped { index: &'static str, missing_table: &'static str },
    Analyzed { table: &'static str },
}

impl fmt::Display for IndexStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ensured { index } => write!(f, "ensured {index}"),
            Self::Skipped { index, missing_table } => {
                write!(f, "{missing_table} table not found; skipped {index}")
            },
            Self::Analyzed { table } => write!(f, "analyzed {table}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub explorer_present: bool,
    pub steps: Vec<IndexStep>,
}

/// Tables refreshed with `ANALYZE` after the indexes are in place.
pub(crate) fn analyze_targets(explorer_present: bool) -> Vec<&'static str> {
    let mut tables = vec!["route_insights", "matrix_prices"];
    if explorer_present {
        tables.push(EXPLORER_TABLE);
    }
    tables.push("sent_deals");
    tables
}

impl PgAdmin {
    /// Create every index in [`SPEED_INDEXES`], the explorer index when its
    /// table exists, then `ANALYZE` the affected tables.
    ///
    /// `on_start(position, total, name)` fires before each unconditional
    /// statement is sent; `position` is 1-based.
    pub async fn apply_speed_indexes(
        &self,
        mut on_start: impl FnMut(usize, usize, &'static str),
    ) -> Result<IndexReport, StorageError> {
        let mut report = IndexReport::default();
        let total = SPEED_INDEXES.len();

        for (position, index) in SPEED_INDEXES.iter().enumerate() {
            tracing::info!(index = index.name, "[{}/{total}] running", position + 1);
            on_start(position + 1, total, index.name);
            self.ensure_index(index).await?;
            report.steps.push(IndexStep::Ensured { index: index.name });
        }

        report.explorer_present = self.table_exists(EXPLORER_TABLE).await?;
        if report.explorer_present {
            tracing::info!("{EXPLORER_TABLE} found, creating index");
            self.ensure_index(&EXPLORER_INDEX).await?;
            report.steps.push(IndexStep::Ensured { index: EXPLORER_INDEX.name });
        } else {
            tracing::warn!("{EXPLORER_TABLE} table not found; skipping explorer index");
            report.steps.push(IndexStep::Skipped {
                index: EXPLORER_INDEX.name,
                missing_table: EXPLORER_TABLE,
            });
        }

        tracing::info!("running ANALYZE");
        for table in analyze_targets(report.explorer_present) {
            sqlx::raw_sql(&format!("ANALYZE {table}")).execute(&self.pool).await?;
            report.steps.push(IndexStep::Analyzed { table });
        }

        Ok(report)
    }

    async fn ensure_index(&self, index: &SpeedIndex) -> Result<(), StorageError> {
        let sql = index.create_sql();
        tracing::debug!(table = index.table, %sql, "creating index");
        sqlx::raw_sql(&sql).execute(&self.pool).await?;
        Ok(())
    }
}
