//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::YardRepository;
use crate::services::RefreshOrchestrator;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Refresh orchestrator driving the dashboard pipeline
    pub orchestrator: Arc<RefreshOrchestrator>,
    /// Data source, probed directly by the health endpoint
    pub repository: Arc<dyn YardRepository>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(orchestrator: Arc<RefreshOrchestrator>, repository: Arc<dyn YardRepository>) -> Self {
        Self {
            orchestrator,
            repository,
        }
    }
}
