//! Typed error enum for the storage layer.

use thiserror::Error;

/// Storage-layer error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The connection string could not be turned into connect options.
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// SQL / connection / timeout failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A step of the backfill failed; the open transaction was rolled back.
    #[error("backfill {stage} failed: {source}")]
    Backfill {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StorageError {
    /// Whether this error is likely transient. Reported only; nothing retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(err) | Self::Backfill { source: err, .. } => {
                matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
            },
            Self::InvalidConnectionString(_) => false,
        }
    }

    pub(crate) fn backfill(stage: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Backfill { stage, source }
    }
}

/// Custom `From<sqlx::Error>` — NOT blanket `#[from]`.
///
/// - `Configuration` → `InvalidConnectionString` (message only, never the URL)
/// - Everything else → `Database`
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(inner) => Self::InvalidConnectionString(inner.to_string()),
            other => Self::Database(other),
        }
    }
}
