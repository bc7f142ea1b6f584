//! Refresh orchestration for the dashboard.
//!
//! One call per render cycle. The cached view is always read before any
//! refresh is attempted, so a blocked or failing data source can never take
//! the last good table away; a refresh that does fail leaves both cache
//! tiers untouched and is surfaced as a non-fatal indicator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

use crate::cache::{PersistedSnapshot, SnapshotStore};
use crate::db::repository::YardRepository;
use crate::models::time::BUSINESS_TZ;
use crate::models::DisplayRow;
use crate::services::{join, shipping, view};

/// Default deadline for one full data-source fetch.
const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Terminal outcome of one orchestration cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The persisted view was fresh enough to serve as-is.
    ServedCached,
    /// A live refresh ran and the snapshot was replaced.
    Refreshed,
    /// The refresh failed; whatever view was already cached (possibly none)
    /// stays on screen.
    RefreshFailed { error: String },
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub rows: Vec<DisplayRow>,
    pub last_update: Option<NaiveDateTime>,
    pub saved_at: Option<DateTime<Utc>>,
    pub qtd_placas: usize,
    pub outcome: RefreshOutcome,
}

impl DashboardState {
    fn from_snapshot(snapshot: PersistedSnapshot, outcome: RefreshOutcome) -> Self {
        Self {
            rows: snapshot.rows,
            last_update: snapshot.last_update,
            saved_at: Some(snapshot.saved_at),
            qtd_placas: snapshot.qtd_placas,
            outcome,
        }
    }

    fn empty(outcome: RefreshOutcome) -> Self {
        Self {
            rows: Vec::new(),
            last_update: None,
            saved_at: None,
            qtd_placas: 0,
            outcome,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RefreshError {
    #[error("{0}")]
    Source(#[from] crate::db::repository::RepositoryError),
    #[error("data source timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to persist snapshot: {0}")]
    Persist(#[from] crate::cache::SnapshotError),
}

/// Decides, per invocation, whether to serve the cache, refresh, or both.
///
/// Holds the in-process memo tier; the persistent tier lives in the
/// [`SnapshotStore`]. Shared behind an `Arc` across request handlers.
pub struct RefreshOrchestrator {
    repository: Arc<dyn YardRepository>,
    store: SnapshotStore,
    source_timeout: Duration,
    memo: Mutex<Option<PersistedSnapshot>>,
}

impl RefreshOrchestrator {
    pub fn new(repository: Arc<dyn YardRepository>, store: SnapshotStore) -> Self {
        Self {
            repository,
            store,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            memo: Mutex::new(None),
        }
    }

    /// Override the data-source deadline.
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Current persisted snapshot, if any. Read-only view for the API.
    pub fn persisted_snapshot(&self) -> Option<PersistedSnapshot> {
        self.store.read()
    }

    /// Run one render cycle against the wall clock.
    pub async fn run_cycle(&self, force: bool) -> DashboardState {
        self.run_cycle_at(force, Utc::now().with_timezone(&BUSINESS_TZ))
            .await
    }

    /// Run one render cycle with an injected clock.
    pub async fn run_cycle_at(&self, force: bool, now: DateTime<Tz>) -> DashboardState {
        if force {
            // An explicit refresh request invalidates the memo tier; the
            // persisted tier is only replaced on success.
            self.memo.lock().take();
        }

        let cached: Option<PersistedSnapshot> = {
            let mut memo = self.memo.lock();
            if memo.is_none() {
                *memo = self.store.read();
            }
            memo.clone()
        };

        let now_utc = now.with_timezone(&Utc);
        let has_view = cached.as_ref().is_some_and(|s| !s.rows.is_empty());
        let fresh = cached
            .as_ref()
            .is_some_and(|s| !self.store.is_stale(s, now_utc));

        if has_view && fresh && !force {
            return DashboardState::from_snapshot(cached.unwrap(), RefreshOutcome::ServedCached);
        }

        match self.refresh(now).await {
            Ok(snapshot) => {
                *self.memo.lock() = Some(snapshot.clone());
                log::info!(
                    "dashboard refreshed: {} rows, {} plates",
                    snapshot.rows.len(),
                    snapshot.qtd_placas
                );
                DashboardState::from_snapshot(snapshot, RefreshOutcome::Refreshed)
            }
            Err(err) => {
                log::error!("dashboard refresh failed, keeping cached view: {err}");
                let outcome = RefreshOutcome::RefreshFailed {
                    error: err.to_string(),
                };
                match cached {
                    Some(snapshot) => DashboardState::from_snapshot(snapshot, outcome),
                    None => DashboardState::empty(outcome),
                }
            }
        }
    }

    /// Fetch, derive and persist. Any failure leaves the previous snapshot
    /// in place.
    async fn refresh(&self, now: DateTime<Tz>) -> Result<PersistedSnapshot, RefreshError> {
        let fetch = async {
            let batch = self.repository.fetch_raw().await?;
            let last_update = self.repository.fetch_last_update().await?;
            Ok::<_, crate::db::repository::RepositoryError>((batch, last_update))
        };
        let (batch, last_update) = tokio::time::timeout(self.source_timeout, fetch)
            .await
            .map_err(|_| RefreshError::Timeout(self.source_timeout))??;

        let shipping_rows = shipping::resolve_precedence(batch.shipping);
        let wide = join::join_rows(batch.main, &batch.reference, &shipping_rows);
        let patio = view::build_view(&wide, now);

        let snapshot = PersistedSnapshot {
            saved_at: now.with_timezone(&Utc),
            last_update,
            qtd_placas: patio.qtd_placas,
            rows: patio.rows,
        };
        self.store.write(&snapshot)?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ReferenceRow, ShippingRow, YardRow};
    use crate::db::repositories::LocalRepository;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Tz> {
        BUSINESS_TZ.with_ymd_and_hms(2024, 8, 15, 12, 0, 0).unwrap()
    }

    fn seeded_repo() -> Arc<LocalRepository> {
        let repo = Arc::new(LocalRepository::new());
        let prevista = (now() + ChronoDuration::minutes(10))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        repo.seed(
            vec![YardRow {
                placa: "AAA1B22".to_string(),
                situacao_id: 2,
                data_prevista_saida: Some(prevista),
                data_efetiva_entrada: Some((now() - ChronoDuration::hours(2)).naive_local()),
                num_romaneio: Some("77".to_string()),
                motorista: Some("josé carlos".to_string()),
                ..Default::default()
            }],
            vec![ReferenceRow {
                placa_controle: "AAA1B22".to_string(),
                referencia: Some("ref-1".to_string()),
            }],
            vec![ShippingRow {
                romaneio_atual: Some("77".to_string()),
                negociador: Some("CARLA".to_string()),
                pais_origem: Some("Brasil".to_string()),
                pais_destino: Some("Chile".to_string()),
                tabela: "TSC".to_string(),
                ..Default::default()
            }],
        );
        repo.set_last_update(Some(
            chrono::NaiveDate::from_ymd_opt(2024, 8, 15)
                .unwrap()
                .and_hms_opt(11, 58, 0)
                .unwrap(),
        ));
        repo
    }

    fn orchestrator(repo: Arc<LocalRepository>, dir: &TempDir) -> RefreshOrchestrator {
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));
        RefreshOrchestrator::new(repo, store).with_source_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn first_run_refreshes_and_persists() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo();
        let orch = orchestrator(repo.clone(), &dir);

        let state = orch.run_cycle_at(false, now()).await;

        assert_eq!(state.outcome, RefreshOutcome::Refreshed);
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.qtd_placas, 1);
        assert_eq!(state.rows[0].cavalo, "AAA1B22");
        assert_eq!(state.rows[0].negociador, "CARLA");
        assert_eq!(state.rows[0].rumo, "RS");
        assert_eq!(state.rows[0].motorista, "JOSÉ");
        assert_eq!(state.rows[0].referencia_atual, "REF-1");
        assert!(state.last_update.is_some());
        assert!(orch.persisted_snapshot().is_some());
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_touching_the_source() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo();
        let orch = orchestrator(repo.clone(), &dir);

        orch.run_cycle_at(false, now()).await;
        let state = orch
            .run_cycle_at(false, now() + ChronoDuration::minutes(5))
            .await;

        assert_eq!(state.outcome, RefreshOutcome::ServedCached);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn stale_cache_triggers_a_refresh() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo();
        let orch = orchestrator(repo.clone(), &dir);

        orch.run_cycle_at(false, now()).await;
        let state = orch
            .run_cycle_at(false, now() + ChronoDuration::minutes(16))
            .await;

        assert_eq!(state.outcome, RefreshOutcome::Refreshed);
        assert_eq!(repo.fetch_count(), 2);
    }

    #[tokio::test]
    async fn force_bypasses_a_fresh_cache() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo();
        let orch = orchestrator(repo.clone(), &dir);

        orch.run_cycle_at(false, now()).await;
        let state = orch
            .run_cycle_at(true, now() + ChronoDuration::minutes(1))
            .await;

        assert_eq!(state.outcome, RefreshOutcome::Refreshed);
        assert_eq!(repo.fetch_count(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cached_view_and_snapshot() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo();
        let orch = orchestrator(repo.clone(), &dir);

        let before = orch.run_cycle_at(false, now()).await;
        let persisted_before = orch.persisted_snapshot().unwrap();

        repo.set_failing(true);
        let state = orch
            .run_cycle_at(false, now() + ChronoDuration::minutes(20))
            .await;

        assert!(matches!(state.outcome, RefreshOutcome::RefreshFailed { .. }));
        assert_eq!(state.rows, before.rows);
        assert_eq!(state.saved_at, before.saved_at);
        assert_eq!(orch.persisted_snapshot().unwrap(), persisted_before);
    }

    #[tokio::test]
    async fn failed_first_run_renders_empty_state() {
        let dir = TempDir::new().unwrap();
        let repo = Arc::new(LocalRepository::new());
        repo.set_failing(true);
        let orch = orchestrator(repo, &dir);

        let state = orch.run_cycle_at(false, now()).await;

        assert!(matches!(state.outcome, RefreshOutcome::RefreshFailed { .. }));
        assert!(state.rows.is_empty());
        assert!(state.saved_at.is_none());
        assert_eq!(state.qtd_placas, 0);
        assert!(orch.persisted_snapshot().is_none());
    }

    #[tokio::test]
    async fn cold_start_serves_the_previous_process_snapshot() {
        let dir = TempDir::new().unwrap();
        let repo = seeded_repo();
        let first = orchestrator(repo.clone(), &dir);
        first.run_cycle_at(false, now()).await;

        // New orchestrator over the same file simulates a process restart.
        let second = orchestrator(repo.clone(), &dir);
        let state = second
            .run_cycle_at(false, now() + ChronoDuration::minutes(2))
            .await;

        assert_eq!(state.outcome, RefreshOutcome::ServedCached);
        assert_eq!(state.rows.len(), 1);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn empty_snapshot_forces_a_refresh() {
        let dir = TempDir::new().unwrap();
        let repo = Arc::new(LocalRepository::new());
        let orch = orchestrator(repo.clone(), &dir);

        // First cycle persists an empty view (source has no rows).
        let state = orch.run_cycle_at(false, now()).await;
        assert_eq!(state.outcome, RefreshOutcome::Refreshed);
        assert!(state.rows.is_empty());

        // An empty cached view is never "good enough": next cycle refreshes
        // again even though the snapshot is fresh.
        let state = orch
            .run_cycle_at(false, now() + ChronoDuration::minutes(1))
            .await;
        assert_eq!(state.outcome, RefreshOutcome::Refreshed);
        assert_eq!(repo.fetch_count(), 2);
    }
}
