use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::chain::EXPIRY_FORMAT;

/// Tag that marks the last-fetch timestamp line in a history file.
pub const MARKER_PREFIX: &str = "_IST ";

const SNAPSHOT_SUFFIX: &str = "_data.json";
const SYMBOL_DIR_SUFFIX: &str = "_data";

/// Identifies one persisted snapshot: `<SYMBOL>_data/<YYYY-MM-DD>/<HH>_<MM>_data.json`.
///
/// Ordering is numeric on (date, time), and the zero-padded path form sorts
/// the same way lexicographically within one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId {
    date: NaiveDate,
    time: NaiveTime,
    symbol: String,
}

impl SnapshotId {
    /// Builds the identifier for a fetch taken at `at`, truncated to the minute.
    pub fn new(symbol: &str, at: NaiveDateTime) -> Self {
        Self {
            date: at.date(),
            time: truncate_to_minute(at.time()),
            symbol: symbol.to_string(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// `HH:MM`, used in report headers.
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.time.format("%H_%M"), SNAPSHOT_SUFFIX)
    }

    /// Path relative to the storage root.
    pub fn relative_path(&self) -> PathBuf {
        day_dir(&self.symbol, self.date).join(self.file_name())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}/{}",
            self.symbol,
            SYMBOL_DIR_SUFFIX,
            self.date.format(EXPIRY_FORMAT),
            self.file_name()
        )
    }
}

impl FromStr for SnapshotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        let [symbol_dir, date, file] = parts.as_slice() else {
            return Err(format!("expected <symbol>_data/<date>/<file>, got '{s}'"));
        };

        let symbol = symbol_dir
            .strip_suffix(SYMBOL_DIR_SUFFIX)
            .filter(|sym| !sym.is_empty())
            .ok_or_else(|| format!("bad symbol directory '{symbol_dir}'"))?;
        let date = NaiveDate::parse_from_str(date, EXPIRY_FORMAT)
            .map_err(|e| format!("bad date '{date}': {e}"))?;
        let stem = file
            .strip_suffix(SNAPSHOT_SUFFIX)
            .ok_or_else(|| format!("bad snapshot file name '{file}'"))?;
        let time = NaiveTime::parse_from_str(stem, "%H_%M")
            .map_err(|e| format!("bad snapshot time '{stem}': {e}"))?;

        Ok(Self {
            date,
            time,
            symbol: symbol.to_string(),
        })
    }
}

/// Directory holding one symbol's snapshots and history index for one day.
pub fn day_dir(symbol: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{symbol}{SYMBOL_DIR_SUFFIX}")).join(date.format(EXPIRY_FORMAT).to_string())
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// One line of the history index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HistoryEntry {
    /// Wall-clock minute of the last fetch.
    Marker(NaiveTime),
    Snapshot(SnapshotId),
}

impl HistoryEntry {
    pub fn marker(&self) -> Option<NaiveTime> {
        match self {
            HistoryEntry::Marker(time) => Some(*time),
            HistoryEntry::Snapshot(_) => None,
        }
    }

    pub fn snapshot(&self) -> Option<&SnapshotId> {
        match self {
            HistoryEntry::Snapshot(id) => Some(id),
            HistoryEntry::Marker(_) => None,
        }
    }
}

// Descending sort puts the marker first, then snapshots newest to oldest.
impl Ord for HistoryEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (HistoryEntry::Marker(a), HistoryEntry::Marker(b)) => a.cmp(b),
            (HistoryEntry::Snapshot(a), HistoryEntry::Snapshot(b)) => a.cmp(b),
            (HistoryEntry::Marker(_), HistoryEntry::Snapshot(_)) => Ordering::Greater,
            (HistoryEntry::Snapshot(_), HistoryEntry::Marker(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for HistoryEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryEntry::Marker(time) => write!(f, "{}{}", MARKER_PREFIX, time.format("%H:%M:%S")),
            HistoryEntry::Snapshot(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for HistoryEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(MARKER_PREFIX) {
            Some(time) => NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
                .map(HistoryEntry::Marker)
                .map_err(|e| format!("bad timestamp marker '{s}': {e}")),
            None => s.parse().map(HistoryEntry::Snapshot),
        }
    }
}

/// Sorts newest-first.
pub fn sort_descending(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.cmp(a));
}
