//! Flat-file snapshot storage.
//!
//! Layout under the storage root:
//!
//! ```text
//! <SYMBOL>_data/<YYYY-MM-DD>/HH_MM_data.json   one per fetch
//! <SYMBOL>_data/<YYYY-MM-DD>/history.txt       rolling index for the day
//! ```
//!
//! Each day has its own index. Only one writer per symbol and day is
//! expected; there is no cross-process locking.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{day_dir, sort_descending, truncate_to_minute, HistoryEntry, Snapshot, SnapshotId};

const HISTORY_FILE: &str = "history.txt";

/// Snapshot identifiers kept in the index alongside the single marker.
pub const RETAINED_SNAPSHOTS: usize = 2;

pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn history_path(&self, symbol: &str, date: NaiveDate) -> PathBuf {
        self.root.join(day_dir(symbol, date)).join(HISTORY_FILE)
    }

    pub fn snapshot_path(&self, id: &SnapshotId) -> PathBuf {
        self.root.join(id.relative_path())
    }

    /// Writes `snapshot` under the day directory of `at`, named by its hour and minute.
    pub fn persist(&self, symbol: &str, snapshot: &Snapshot, at: NaiveDateTime) -> Result<SnapshotId> {
        let id = SnapshotId::new(symbol, at);
        let path = self.snapshot_path(&id);

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| AppError::data_format(&path, e))?;
        write_atomic(&path, json.as_bytes())?;

        debug!("Persisted {} strikes to {:?}", snapshot.strike_count(), path);
        Ok(id)
    }

    /// Adds `id` and a marker for `at`'s minute to the day's index, keeping
    /// the newest marker and the newest two snapshots.
    pub fn record_history(
        &self,
        symbol: &str,
        date: NaiveDate,
        id: &SnapshotId,
        at: NaiveDateTime,
    ) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.read_history(symbol, date)?;
        entries.push(HistoryEntry::Snapshot(id.clone()));
        entries.push(HistoryEntry::Marker(truncate_to_minute(at.time())));

        let entries = retain_newest(entries);

        let text: String = entries.iter().map(|entry| format!("{entry}\n")).collect();
        write_atomic(&self.history_path(symbol, date), text.as_bytes())?;

        Ok(entries)
    }

    /// Index entries newest-first; empty when the day has no index yet.
    pub fn read_history(&self, symbol: &str, date: NaiveDate) -> Result<Vec<HistoryEntry>> {
        let path = self.history_path(symbol, date);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::io(&path, e)),
        };

        let mut entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.parse::<HistoryEntry>().map_err(|e| AppError::data_format(&path, e)))
            .collect::<Result<Vec<_>>>()?;

        sort_descending(&mut entries);
        entries.dedup();
        Ok(entries)
    }

    pub fn load(&self, id: &SnapshotId) -> Result<Snapshot> {
        let path = self.snapshot_path(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Err(AppError::SnapshotNotFound(path)),
            Err(e) => return Err(AppError::io(&path, e)),
        };

        let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| AppError::data_format(&path, e))?;
        if snapshot.expiry_key().is_none() {
            return Err(AppError::data_format(&path, "no expiry data"));
        }
        Ok(snapshot)
    }
}

/// Dedups, sorts newest-first and truncates to one marker plus
/// `RETAINED_SNAPSHOTS` identifiers.
fn retain_newest(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    sort_descending(&mut entries);
    entries.dedup();

    let mut markers = 0;
    let mut snapshots = 0;
    entries.retain(|entry| match entry {
        HistoryEntry::Marker(_) => {
            markers += 1;
            markers <= 1
        }
        HistoryEntry::Snapshot(_) => {
            snapshots += 1;
            snapshots <= RETAINED_SNAPSHOTS
        }
    });
    entries
}

/// Writes to a sibling temp file, then renames over `path`.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).map_err(|e| AppError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| AppError::io(path, e))
}
