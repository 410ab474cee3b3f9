//! Shared plumbing for the fare-admin binaries.

pub mod commands;

use fare_admin_storage::StorageError;
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout carries only the report. `RUST_LOG` overrides `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Context line for a failed step; transient failures are flagged as safe to re-run.
pub fn failure_context(action: &str, err: &StorageError) -> String {
    if err.is_transient() {
        format!("{action} (transient; safe to re-run)")
    } else {
        action.to_owned()
    }
}

/// Attach [`failure_context`] to a storage result.
pub fn storage_context<T>(result: Result<T, StorageError>, action: &str) -> anyhow::Result<T> {
    result.map_err(|err| {
        let context = failure_context(action, &err);
        anyhow::Error::new(err).context(context)
    })
}
