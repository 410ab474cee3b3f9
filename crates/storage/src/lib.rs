//! Storage layer for fare-admin
//!
//! PostgreSQL access for the three admin tools: the `min_price_ever`
//! backfill, speed index application and query plan validation.

pub mod error;
mod pg_admin;

pub use error::StorageError;
pub use pg_admin::{
    CorrectionTx, IndexReport, IndexStep, PLAN_CATALOG, PgAdmin, PlanQuery, PlanReport,
    SPEED_INDEXES, SpeedIndex, connect_options,
};
pub use sqlx::Error as SqlxError;
