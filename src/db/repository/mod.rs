//! Abstract interface for the yard data source.
//!
//! The dashboard treats the operational store as an opaque source of three
//! tabular result sets plus one scalar freshness timestamp. Any backend
//! satisfying this trait is substitutable; the pipeline above it never
//! changes.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::db::models::RawBatch;

/// Data source for the yard dashboard.
///
/// Implementations must be `Send + Sync`; the same instance is shared across
/// sequential refresh cycles and possibly overlapping force-refresh
/// requests. Implementations do NOT retry internally — retry policy belongs
/// to the refresh orchestrator, whose policy is fail-and-keep-cache.
#[async_trait]
pub trait YardRepository: Send + Sync {
    /// Execute the three yard queries and return their result sets.
    ///
    /// # Returns
    /// * `Ok(RawBatch)` with the main, reference and shipping rows
    /// * `Err(RepositoryError)` on connectivity or query failure
    async fn fetch_raw(&self) -> RepositoryResult<RawBatch>;

    /// Most recent insert timestamp on the yard-control table, or `None`
    /// when the source is empty.
    async fn fetch_last_update(&self) -> RepositoryResult<Option<NaiveDateTime>>;

    /// Cheap connectivity probe backing the health endpoint.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
