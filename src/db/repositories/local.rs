//! In-memory data source for unit testing and local development.
//!
//! Holds the three result sets as plain vectors and can be flipped into a
//! failing state to exercise the orchestrator's outage path.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db::models::{RawBatch, ReferenceRow, ShippingRow, YardRow};
use crate::db::repository::{RepositoryError, RepositoryResult, YardRepository};

#[derive(Default)]
struct LocalData {
    main: Vec<YardRow>,
    reference: Vec<ReferenceRow>,
    shipping: Vec<ShippingRow>,
    last_update: Option<NaiveDateTime>,
    failing: bool,
}

/// In-memory repository.
///
/// Seed it with [`LocalRepository::seed`], then hand it to the orchestrator
/// as `Arc<dyn YardRepository>`. `fetch_count` says how many times the
/// "database" was actually hit, which lets tests assert that a fresh cache
/// is served without touching the source.
#[derive(Default)]
pub struct LocalRepository {
    inner: RwLock<LocalData>,
    fetches: AtomicU64,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all three result sets.
    pub fn seed(&self, main: Vec<YardRow>, reference: Vec<ReferenceRow>, shipping: Vec<ShippingRow>) {
        let mut data = self.inner.write();
        data.main = main;
        data.reference = reference;
        data.shipping = shipping;
    }

    /// Set the scalar last-update timestamp.
    pub fn set_last_update(&self, ts: Option<NaiveDateTime>) {
        self.inner.write().last_update = ts;
    }

    /// Simulate a source outage: every call fails until reset.
    pub fn set_failing(&self, failing: bool) {
        self.inner.write().failing = failing;
    }

    /// Number of `fetch_raw` calls served so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> RepositoryResult<()> {
        if self.inner.read().failing {
            Err(RepositoryError::connection("simulated source outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl YardRepository for LocalRepository {
    async fn fetch_raw(&self) -> RepositoryResult<RawBatch> {
        self.check_available()?;
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let data = self.inner.read();
        Ok(RawBatch {
            main: data.main.clone(),
            reference: data.reference.clone(),
            shipping: data.shipping.clone(),
        })
    }

    async fn fetch_last_update(&self) -> RepositoryResult<Option<NaiveDateTime>> {
        self.check_available()?;
        Ok(self.inner.read().last_update)
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(!self.inner.read().failing)
    }
}
