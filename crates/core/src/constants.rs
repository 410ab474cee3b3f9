//! Shared constants for fare-admin.

/// Environment variable holding the PostgreSQL connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable overriding the location of the fallback env file.
pub const ENV_FILE_VAR: &str = "FARE_ADMIN_ENV_FILE";

/// Fallback env file read when `DATABASE_URL` is unset.
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Environment variable overriding the pool acquire timeout.
pub const ACQUIRE_TIMEOUT_VAR: &str = "FARE_ADMIN_ACQUIRE_TIMEOUT_SECS";

/// PostgreSQL connection pool: maximum connections.
/// Every tool runs its statements strictly one after another.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 1;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 10;

/// Number of summary rows spot-checked after the backfill commits.
pub const VERIFICATION_SAMPLE_SIZE: i64 = 5;

/// Width of the `=` rule printed around each query plan.
pub const PLAN_RULE_WIDTH: usize = 80;
