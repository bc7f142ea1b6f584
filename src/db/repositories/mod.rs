//! Data source implementations.
//!
//! - `postgres`: PostgreSQL implementation with Diesel and r2d2 pooling
//! - `local`: in-memory implementation for unit testing and local development

pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
