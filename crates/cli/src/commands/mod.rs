pub mod backfill;
pub mod indexes;
pub mod query_plans;
