use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used for expiry keys in snapshot files and provider rows.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Call,
    Put,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Call => write!(f, "CE"),
            Side::Put => write!(f, "PE"),
        }
    }
}

/// One side (CE or PE) of a strike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideData {
    pub oi: i64,
    pub oi_change: i64,
    pub vol: i64,
}

/// Both sides of a strike; a strike is never stored with only one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChainEntry {
    #[serde(rename = "CE")]
    pub ce: SideData,
    #[serde(rename = "PE")]
    pub pe: SideData,
}

impl OptionChainEntry {
    pub fn side(&self, side: Side) -> &SideData {
        match side {
            Side::Call => &self.ce,
            Side::Put => &self.pe,
        }
    }
}

/// Strike -> entry, in provider response order.
pub type StrikeChain = IndexMap<i64, OptionChainEntry>;

/// A single point-in-time fetch: expiry -> strike -> entry.
///
/// Serialized as `{ "<expiry>": { "<strike>": {"CE": {..}, "PE": {..}} } }`.
/// Map order is preserved on both write and read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    expiries: IndexMap<String, StrikeChain>,
}

impl Snapshot {
    /// Empty snapshot carrying a single expiry key.
    pub fn new(expiry: NaiveDate) -> Self {
        let mut expiries = IndexMap::new();
        expiries.insert(expiry.format(EXPIRY_FORMAT).to_string(), StrikeChain::new());
        Self { expiries }
    }

    /// The first (and normally only) expiry key.
    pub fn expiry_key(&self) -> Option<&str> {
        self.expiries.keys().next().map(String::as_str)
    }

    pub fn chain(&self, expiry_key: &str) -> Option<&StrikeChain> {
        self.expiries.get(expiry_key)
    }

    /// Inserts under the first expiry key. Re-inserting a strike keeps its
    /// original position.
    pub fn insert(&mut self, strike: i64, entry: OptionChainEntry) {
        if let Some(chain) = self.expiries.values_mut().next() {
            chain.insert(strike, entry);
        }
    }

    pub fn strike_count(&self) -> usize {
        self.expiries.values().map(IndexMap::len).sum()
    }
}

/// Raw option-chain row as delivered by the data provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainRecord {
    pub strike_price: i64,
    pub expiry_date: String,
    pub calls_oi: i64,
    pub calls_change_oi: i64,
    pub calls_volume: i64,
    pub puts_oi: i64,
    pub puts_change_oi: i64,
    pub puts_volume: i64,
}

impl ChainRecord {
    /// Provider dates carry a time suffix; only the leading `YYYY-MM-DD` counts.
    pub fn expiry_prefix(&self) -> Option<&str> {
        self.expiry_date.get(..10)
    }

    pub fn to_entry(&self) -> OptionChainEntry {
        OptionChainEntry {
            ce: SideData {
                oi: self.calls_oi,
                oi_change: self.calls_change_oi,
                vol: self.calls_volume,
            },
            pe: SideData {
                oi: self.puts_oi,
                oi_change: self.puts_change_oi,
                vol: self.puts_volume,
            },
        }
    }
}
