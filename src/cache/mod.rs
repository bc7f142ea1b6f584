//! Persistent snapshot cache for the derived dashboard view.
//!
//! One JSON file holds the most recent successful refresh: the display rows
//! exactly as rendered, the source's last-update timestamp, the distinct
//! plate count and when the snapshot was saved. The file is replaced
//! atomically (write to a sibling temp file, then rename) so a concurrent
//! reader can never observe a torn snapshot, and a corrupt or missing file
//! is simply a cache miss — never an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::DisplayRow;

/// How long a persisted snapshot stays fresh, in seconds.
pub const SNAPSHOT_TTL_SECS: i64 = 15 * 60;

/// The durable record of one successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    /// When this snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// Newest insert timestamp the source reported, if any.
    pub last_update: Option<NaiveDateTime>,
    /// Distinct primary plates in the view.
    pub qtd_placas: usize,
    /// Display-ready rows, in final order.
    pub rows: Vec<DisplayRow>,
}

/// Errors writing a snapshot. Reads never error — see [`SnapshotStore::read`].
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write snapshot file: {0}")]
    Io(#[from] io::Error),
}

/// Owner of the on-disk snapshot.
pub struct SnapshotStore {
    path: PathBuf,
    ttl: Duration,
}

impl SnapshotStore {
    /// Store at `path` with the fixed 15-minute freshness policy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::seconds(SNAPSHOT_TTL_SECS),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot.
    ///
    /// Returns `None` when the file is absent or unparseable; a corrupt
    /// cache behaves exactly like no cache.
    pub fn read(&self) -> Option<PersistedSnapshot> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!(
                    "discarding corrupt snapshot at {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Replace the snapshot on disk, all-or-nothing.
    pub fn write(&self, snapshot: &PersistedSnapshot) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        let temp_path = self.path.with_extension("tmp");

        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Whether the snapshot is old enough to warrant a live refresh.
    pub fn is_stale(&self, snapshot: &PersistedSnapshot, now: DateTime<Utc>) -> bool {
        now - snapshot.saved_at >= self.ttl
    }
}
