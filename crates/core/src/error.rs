use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration, before any connection is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("DATABASE_URL not set and {} not found", .env_file.display())]
    MissingDatabaseUrl { env_file: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("DATABASE_URL is not a postgres connection string (scheme `{scheme}`)")]
    InvalidUrl { scheme: String },
}
