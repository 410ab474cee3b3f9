//! `EXPLAIN (ANALYZE, BUFFERS)` for the site's representative queries.

use super::PgAdmin;
use super::indexes::EXPLORER_TABLE;
use crate::error::StorageError;

/// A catalog entry. Every query binds `$1` to `origins` and, when present,
/// `$2` to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanQuery {
    pub name: &'static str,
    pub sql: &'static str,
    pub origins: &'static [&'static str],
    pub destination: Option<&'static str>,
    /// Skip the query unless this table exists.
    pub requires_table: Option<&'static str>,
}

pub const PLAN_CATALOG: &[PlanQuery] = &[
    PlanQuery {
        name: "hub_destinations",
        sql: "EXPLAIN (ANALYZE, BUFFERS)
              SELECT origin, destination, typical_price, low_price_threshold
              FROM route_insights
              WHERE origin = ANY($1)
                AND data_quality IN ('high', 'medium')
                AND sample_size >= 5
                AND typical_price IS NOT NULL
              ORDER BY low_price_threshold ASC NULLS LAST
              LIMIT 80",
        origins: &["ATL", "OKC", "BOS"],
        destination: None,
        requires_table: None,
    },
    PlanQuery {
        name: "route_insights",
        sql: "EXPLAIN (ANALYZE, BUFFERS)
              SELECT origin, destination, low_price_threshold
              FROM route_insights
              WHERE origin = ANY($1)
                AND destination = $2
              ORDER BY low_price_threshold ASC NULLS LAST
              LIMIT 1",
        origins: &["ATL", "OKC"],
        destination: Some("CUN"),
        requires_table: None,
    },
    PlanQuery {
        name: "route_price_trend_matrix_only",
        sql: "EXPLAIN (ANALYZE, BUFFERS)
              SELECT MIN(price) AS min_price, scraped_date
              FROM matrix_prices
              WHERE origin = ANY($1)
                AND destination = $2
                AND scraped_date > NOW() - INTERVAL '90 days'
              GROUP BY scraped_date
              ORDER BY scraped_date ASC",
        origins: &["ATL", "OKC"],
        destination: Some("CUN"),
        requires_table: None,
    },
    PlanQuery {
        name: "route_price_trend_combined",
        sql: "EXPLAIN (ANALYZE, BUFFERS)
              SELECT MIN(min_price) AS min_price, scraped_date
              FROM (
                SELECT MIN(price) AS min_price, scraped_date
                FROM matrix_prices
                WHERE origin = ANY($1)
                  AND destination = $2
                  AND scraped_date > NOW() - INTERVAL '90 days'
                GROUP BY scraped_date
                UNION ALL
                SELECT MIN(price) AS min_price, scraped_date
                FROM explorer_prices
                WHERE origin = ANY($1)
                  AND destination = $2
                  AND scraped_date > NOW() - INTERVAL '90 days'
                GROUP BY scraped_date
              ) combined
              GROUP BY scraped_date
              ORDER BY scraped_date ASC",
        origins: &["ATL", "OKC"],
        destination: Some("CUN"),
        requires_table: Some(EXPLORER_TABLE),
    },
];

/// Plan text for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub name: &'static str,
    pub lines: Vec<String>,
}

impl PgAdmin {
    /// Explain every applicable catalog query, in catalog order.
    pub async fn explain_catalog(&self) -> Result<Vec<PlanReport>, StorageError> {
        let mut reports = Vec::with_capacity(PLAN_CATALOG.len());

        for query in PLAN_CATALOG {
            if let Some(table) = query.requires_table
                && !self.table_exists(table).await?
            {
                tracing::info!(plan = query.name, "{table} table not found; skipping");
                continue;
            }
            reports.push(self.explain(query).await?);
        }
        Ok(reports)
    }

    pub async fn explain(&self, query: &PlanQuery) -> Result<PlanReport, StorageError> {
        tracing::debug!(plan = query.name, "running EXPLAIN");
        let origins: Vec<String> = query.origins.iter().map(|o| (*o).to_owned()).collect();
        let mut statement = sqlx::query_scalar::<_, String>(query.sql).bind(origins);
        if let Some(destination) = query.destination {
            statement = statement.bind(destination);
        }
        let lines = statement.fetch_all(&self.pool).await?;
        Ok(PlanReport { name: query.name, lines })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_names_unique() {
        let names: HashSet<_> = PLAN_CATALOG.iter().map(|q| q.name).collect();
        assert_eq!(names.len(), PLAN_CATALOG.len());
    }

    #[test]
    fn test_catalog_is_explain_analyze() {
        for query in PLAN_CATALOG {
            assert!(query.sql.starts_with("EXPLAIN (ANALYZE, BUFFERS)"), "{}", query.name);
            assert!(!query.origins.is_empty(), "{}", query.name);
        }
    }

    #[test]
    fn test_destination_param_matches_placeholder() {
        for query in PLAN_CATALOG {
            assert_eq!(query.sql.contains("$2"), query.destination.is_some(), "{}", query.name);
        }
    }

    #[test]
    fn test_only_combined_trend_needs_explorer() {
        let gated: Vec<_> =
            PLAN_CATALOG.iter().filter(|q| q.requires_table.is_some()).map(|q| q.name).collect();
        assert_eq!(gated, vec!["route_price_trend_combined"]);
    }
}
