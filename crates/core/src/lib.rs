//! Core types for fare-admin
//!
//! Configuration loading and the domain types shared by the storage layer
//! and the command-line tools.

mod backfill;
mod config;
pub mod constants;
mod env_config;
mod error;
mod format;
mod route;

pub use backfill::*;
pub use config::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use format::*;
pub use route::*;
