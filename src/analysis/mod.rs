pub mod diff;
pub mod expiry;
pub mod freshness;

pub use diff::DiffEngine;
pub use expiry::{atm_strike, weekly_expiry, StrikeWindow};
pub use freshness::{latest_pair, should_refetch, FreshnessPolicy};
