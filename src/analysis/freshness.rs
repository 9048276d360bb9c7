use chrono::NaiveTime;

use crate::models::{HistoryEntry, SnapshotId};

/// Entries needed to reuse cache: one timestamp marker plus two snapshots.
pub const REQUIRED_ENTRIES: usize = 3;

/// Decides whether the newest cached snapshot is still usable.
pub struct FreshnessPolicy {
    max_stale_minutes: f64,
}

impl FreshnessPolicy {
    pub fn new(max_stale_minutes: f64) -> Self {
        Self { max_stale_minutes }
    }

    pub fn should_refetch(&self, history: &[HistoryEntry], now: NaiveTime) -> bool {
        should_refetch(history, now, self.max_stale_minutes)
    }
}

/// `history` must be sorted newest-first, as returned by the store.
///
/// Refetch when the marker plus two snapshots are not all present, when the
/// marker lies after `now` (the day rolled over), or when more than
/// `max_stale_minutes` have elapsed. Elapsed time is measured in seconds so
/// that sub-minute thresholds work.
pub fn should_refetch(history: &[HistoryEntry], now: NaiveTime, max_stale_minutes: f64) -> bool {
    let newest = &history[..history.len().min(REQUIRED_ENTRIES)];
    if newest.len() < REQUIRED_ENTRIES {
        return true;
    }

    let Some(marker) = newest[0].marker() else {
        return true;
    };
    if latest_pair(newest).is_none() {
        return true;
    }

    let elapsed_secs = (now - marker).num_seconds();
    if elapsed_secs < 0 {
        return true;
    }

    elapsed_secs as f64 / 60.0 > max_stale_minutes
}

/// The two newest snapshots as `(current, previous)`.
pub fn latest_pair(history: &[HistoryEntry]) -> Option<(SnapshotId, SnapshotId)> {
    let mut snapshots = history.iter().filter_map(HistoryEntry::snapshot);
    let current = snapshots.next()?.clone();
    let previous = snapshots.next()?.clone();
    Some((current, previous))
}
