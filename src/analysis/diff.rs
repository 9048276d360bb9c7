use crate::error::{AppError, Result};
use crate::models::{DiffRow, OptionChainEntry, Side, SideDelta, Snapshot};

/// Computes the strike-aligned open-interest change between two snapshots.
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rows follow `current`'s stored strike order (provider order, not sorted).
    /// Strikes missing from `previous` are skipped; a zero previous open
    /// interest fails with `ZeroOpenInterest`.
    pub fn diff(&self, current: &Snapshot, previous: &Snapshot, atm_strike: i64) -> Result<Vec<DiffRow>> {
        let expiry = current.expiry_key().ok_or(AppError::EmptySnapshot)?;
        let current_chain = current.chain(expiry).ok_or_else(|| AppError::ExpiryMismatch {
            expected: expiry.to_string(),
            found: "no chain".to_string(),
        })?;
        let previous_chain = previous.chain(expiry).ok_or_else(|| AppError::ExpiryMismatch {
            expected: expiry.to_string(),
            found: previous.expiry_key().unwrap_or("none").to_string(),
        })?;

        let mut rows = Vec::with_capacity(current_chain.len());
        for (&strike, now) in current_chain {
            let Some(before) = previous_chain.get(&strike) else {
                continue;
            };

            rows.push(DiffRow {
                strike,
                is_atm: strike == atm_strike,
                ce: side_delta(strike, Side::Call, now, before)?,
                pe: side_delta(strike, Side::Put, now, before)?,
            });
        }

        Ok(rows)
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn side_delta(
    strike: i64,
    side: Side,
    now: &OptionChainEntry,
    before: &OptionChainEntry,
) -> Result<SideDelta> {
    let current = now.side(side).oi;
    let previous = before.side(side).oi;
    if previous == 0 {
        return Err(AppError::ZeroOpenInterest { strike, side });
    }

    let pct = (current as f64 / previous as f64) * 100.0 - 100.0;

    Ok(SideDelta {
        previous,
        current,
        delta: current - previous,
        delta_pct: round2(pct),
    })
}

/// Two decimals, halfway values to the even digit (0.125 -> 0.12).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::SideData;
    use chrono::NaiveDate;

    fn snapshot(strikes: &[(i64, i64, i64)]) -> Snapshot {
        let mut snapshot = Snapshot::new(NaiveDate::from_ymd_opt(2026, 10, 22).unwrap());
        for &(strike, ce_oi, pe_oi) in strikes {
            snapshot.insert(
                strike,
                OptionChainEntry {
                    ce: SideData {
                        oi: ce_oi,
                        ..Default::default()
                    },
                    pe: SideData {
                        oi: pe_oi,
                        ..Default::default()
                    },
                },
            );
        }
        snapshot
    }

    #[test]
    fn test_delta_and_percentage() {
        let previous = snapshot(&[(17650, 1000, 3000)]);
        let current = snapshot(&[(17650, 1200, 2250)]);

        let rows = DiffEngine::new().diff(&current, &previous, 17600).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.ce.delta, 200);
        assert!((row.ce.delta_pct - 20.0).abs() < 1e-9);
        assert_eq!(row.pe.delta, -750);
        assert!((row.pe.delta_pct + 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_rounds_to_two_places() {
        let previous = snapshot(&[(17650, 3, 7)]);
        let current = snapshot(&[(17650, 4, 8)]);

        let rows = DiffEngine::new().diff(&current, &previous, 0).unwrap();
        assert!((rows[0].ce.delta_pct - 33.33).abs() < 1e-9);
        assert!((rows[0].pe.delta_pct - 14.29).abs() < 1e-9);
    }

    #[test]
    fn test_halfway_percentage_rounds_to_even() {
        let previous = snapshot(&[(17650, 800, 800)]);
        let current = snapshot(&[(17650, 801, 799)]);

        let rows = DiffEngine::new().diff(&current, &previous, 17650).unwrap();
        assert!((rows[0].ce.delta_pct - 0.12).abs() < 1e-9);
        assert!((rows[0].pe.delta_pct + 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_empty_current_snapshot() {
        let previous = snapshot(&[(17650, 1, 1)]);

        let err = DiffEngine::new().diff(&Snapshot::default(), &previous, 17650).unwrap_err();
        assert!(matches!(err, AppError::EmptySnapshot));
        assert_eq!(err.kind(), ErrorKind::DataFormat);
    }

    #[test]
    fn test_zero_previous_open_interest_is_an_error() {
        let previous = snapshot(&[(17650, 0, 10)]);
        let current = snapshot(&[(17650, 100, 10)]);

        let err = DiffEngine::new().diff(&current, &previous, 17650).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DivisionByZero);
        assert!(matches!(
            err,
            AppError::ZeroOpenInterest {
                strike: 17650,
                side: Side::Call
            }
        ));
    }

    #[test]
    fn test_strike_missing_from_previous_is_skipped() {
        let previous = snapshot(&[(17650, 100, 100)]);
        let current = snapshot(&[(17700, 100, 100), (17650, 110, 90)]);

        let rows = DiffEngine::new().diff(&current, &previous, 17650).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].strike, 17650);
    }

    #[test]
    fn test_rows_follow_current_order() {
        let previous = snapshot(&[(17600, 1, 1), (17700, 1, 1), (17650, 1, 1)]);
        let current = snapshot(&[(17700, 2, 2), (17600, 2, 2), (17650, 2, 2)]);

        let rows = DiffEngine::new().diff(&current, &previous, 17650).unwrap();
        let strikes: Vec<i64> = rows.iter().map(|r| r.strike).collect();
        assert_eq!(strikes, vec![17700, 17600, 17650]);
    }

    #[test]
    fn test_atm_label() {
        let previous = snapshot(&[(17600, 1, 1), (17650, 1, 1)]);
        let current = snapshot(&[(17600, 2, 2), (17650, 2, 2)]);

        let rows = DiffEngine::new().diff(&current, &previous, 17650).unwrap();
        assert_eq!(rows[0].label(), "17600");
        assert_eq!(rows[1].label(), "> 17650 <");
    }

    #[test]
    fn test_expiry_mismatch() {
        let previous = Snapshot::new(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        let current = snapshot(&[(17650, 1, 1)]);

        let err = DiffEngine::new().diff(&current, &previous, 17650).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFormat);
    }
}
