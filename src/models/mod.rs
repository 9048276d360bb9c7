mod chain;
mod diff;
mod history;

pub use chain::{ChainRecord, OptionChainEntry, Side, SideData, Snapshot, StrikeChain, EXPIRY_FORMAT};
pub use diff::{DiffRow, SideDelta};
pub use history::{
    day_dir, sort_descending, truncate_to_minute, HistoryEntry, SnapshotId, MARKER_PREFIX,
};
