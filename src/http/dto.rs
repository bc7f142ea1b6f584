//! Data Transfer Objects for the HTTP API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DisplayRow;
use crate::services::{DashboardState, RefreshOutcome};

/// Query parameters for the dashboard endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardQuery {
    /// Boolean-ish flag ("1", "true", "yes") forcing a live refresh
    #[serde(default)]
    pub force: Option<String>,
}

/// The dashboard payload: the derived table plus everything the frontend
/// needs for its banner and stale indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Display-ready rows, already ordered
    pub rows: Vec<DisplayRow>,
    /// Newest insert timestamp the source reported
    pub last_update: Option<NaiveDateTime>,
    /// When the served snapshot was written
    pub saved_at: Option<DateTime<Utc>>,
    /// Distinct primary plates awaiting departure
    pub qtd_placas: usize,
    /// Where this payload came from: "fresh", "cache" or "empty"
    pub source: String,
    /// True when a refresh failed and the rows shown are older than wanted
    pub stale: bool,
    /// Non-fatal refresh error, when one happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

impl From<DashboardState> for DashboardResponse {
    fn from(state: DashboardState) -> Self {
        let (source, stale, refresh_error) = match &state.outcome {
            RefreshOutcome::Refreshed => ("fresh", false, None),
            RefreshOutcome::ServedCached => ("cache", false, None),
            RefreshOutcome::RefreshFailed { error } => {
                let source = if state.rows.is_empty() { "empty" } else { "cache" };
                (source, true, Some(error.clone()))
            }
        };

        Self {
            rows: state.rows,
            last_update: state.last_update,
            saved_at: state.saved_at,
            qtd_placas: state.qtd_placas,
            source: source.to_string(),
            stale,
            refresh_error,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_refresh_with_rows_reads_as_stale_cache() {
        let state = DashboardState {
            rows: vec![],
            last_update: None,
            saved_at: None,
            qtd_placas: 0,
            outcome: RefreshOutcome::RefreshFailed {
                error: "boom".to_string(),
            },
        };
        let response = DashboardResponse::from(state);

        assert_eq!(response.source, "empty");
        assert!(response.stale);
        assert_eq!(response.refresh_error.as_deref(), Some("boom"));
    }

    #[test]
    fn refresh_error_is_omitted_from_json_when_absent() {
        let state = DashboardState {
            rows: vec![],
            last_update: None,
            saved_at: Some(Utc::now()),
            qtd_placas: 0,
            outcome: RefreshOutcome::Refreshed,
        };
        let json = serde_json::to_value(DashboardResponse::from(state)).unwrap();

        assert_eq!(json["source"], "fresh");
        assert!(json.get("refresh_error").is_none());
    }
}
