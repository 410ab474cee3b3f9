//! PostgreSQL access for the admin tools using sqlx.
//!
//! Split into modular files by tool.

mod backfill;
mod indexes;
mod query_plans;

use std::str::FromStr;
use std::time::Duration;

use fare_admin_core::{AdminConfig, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS, TlsPolicy};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use crate::error::StorageError;

pub use backfill::CorrectionTx;
pub use indexes::{IndexReport, IndexStep, SPEED_INDEXES, SpeedIndex};
pub use query_plans::{PLAN_CATALOG, PlanQuery, PlanReport};

#[derive(Clone, Debug)]
pub struct PgAdmin {
    pool: PgPool,
}

impl PgAdmin {
    /// Connect using an already-loaded configuration.
    pub async fn connect(config: &AdminConfig) -> Result<Self, StorageError> {
        let options = connect_options(config)?;
        tracing::info!(source = %config.source(), tls = ?config.tls(), "connecting to database");
        Self::connect_with(options, config.acquire_timeout()).await
    }

    /// Connect with explicit options (tests use this to pin `search_path`).
    pub async fn connect_with(
        options: PgConnectOptions,
        acquire_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect_with(options)
            .await?;
        tracing::info!("connected to database");
        Ok(Self { pool })
    }

    /// Whether `table` exists in the `public` schema.
    pub async fn table_exists(&self, table: &str) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
               SELECT 1
               FROM information_schema.tables
               WHERE table_schema = 'public' AND table_name = $1
             )",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Parse the configured URL, forcing TLS when the policy demands it.
pub fn connect_options(config: &AdminConfig) -> Result<PgConnectOptions, StorageError> {
    let options = PgConnectOptions::from_str(config.database_url())?;
    Ok(match config.tls() {
        TlsPolicy::Require => options.ssl_mode(PgSslMode::Require),
        TlsPolicy::FromUrl => options,
    })
}

/// Convert a row count reported by PostgreSQL to `u64`; negative counts are impossible.
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config(url: &str, tls: TlsPolicy) -> AdminConfig {
        AdminConfig::resolve(Some(url.to_owned()), Path::new("/nonexistent/.env.local"), tls)
            .unwrap()
    }

    #[test]
    fn test_require_tls_overrides_url() {
        let options =
            connect_options(&config("postgres://u:p@localhost/db?sslmode=disable", TlsPolicy::Require))
                .unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));
    }

    #[test]
    fn test_url_tls_is_kept() {
        let options =
            connect_options(&config("postgres://u:p@localhost/db?sslmode=disable", TlsPolicy::FromUrl))
                .unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Disable));
        assert_eq!(options.get_database(), Some("db"));
    }

    #[test]
    fn test_count_to_u64() {
        assert_eq!(count_to_u64(42), 42);
        assert_eq!(count_to_u64(-1), 0);
    }
}
