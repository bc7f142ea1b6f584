//! Data source module for the yard dashboard.
//!
//! Follows the Repository pattern so storage backends can be swapped
//! without touching the pipeline:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / refresh orchestrator                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  YardRepository trait (repository/) - Abstract Interface│
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  PostgresRepository (Diesel + r2d2)                     │
//! │  LocalRepository (in-memory)                            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one repository instance exists per process (behind a pooled
//! connection manager for Postgres); it is initialized once at startup and
//! shared across every refresh cycle.

// Feature flag priority: postgres > local
// When multiple features are enabled (e.g., --all-features), postgres takes precedence.
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod models;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use models::{RawBatch, ReferenceRow, ShippingRow, YardRow};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{ErrorContext, RepositoryError, RepositoryResult, YardRepository};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn YardRepository>> = OnceLock::new();

// Priority: postgres > local (when --all-features is used)
#[cfg(feature = "postgres-repo")]
fn create_selected_repository() -> RepositoryResult<Arc<dyn YardRepository>> {
    let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
    RepositoryFactory::create_postgres(&config)
}

#[cfg(all(feature = "local-repo", not(feature = "postgres-repo")))]
fn create_selected_repository() -> RepositoryResult<Arc<dyn YardRepository>> {
    Ok(RepositoryFactory::create_local())
}

/// Initialize the global repository singleton for the selected backend.
///
/// Missing credentials surface here as a hard error; the server must not
/// start half-configured.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = create_selected_repository()
        .map_err(|e| anyhow::Error::msg(e.to_string()))
        .context("Failed to initialize data source")?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn YardRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Data source not initialized. Call init_repository() first.")
}
