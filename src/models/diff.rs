/// Open-interest movement on one side of a strike between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideDelta {
    pub previous: i64,
    pub current: i64,
    pub delta: i64,
    /// Percent change, rounded to 2 decimals.
    pub delta_pct: f64,
}

/// One strike of the delta report. Raw contract counts, unscaled.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub strike: i64,
    pub is_atm: bool,
    pub ce: SideDelta,
    pub pe: SideDelta,
}

impl DiffRow {
    /// Strike label, with the at-the-money strike wrapped as `> 17650 <`.
    pub fn label(&self) -> String {
        if self.is_atm {
            format!("> {} <", self.strike)
        } else {
            self.strike.to_string()
        }
    }
}
