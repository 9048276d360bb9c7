use chrono::{Datelike, Days, NaiveDate, Weekday};

/// The upcoming weekly expiry: `date` itself if it is a Thursday, otherwise
/// the next Thursday (at most 6 days ahead).
pub fn weekly_expiry(date: NaiveDate) -> NaiveDate {
    let mut expiry = date;
    while expiry.weekday() != Weekday::Thu {
        expiry = expiry + Days::new(1);
    }
    expiry
}

/// Rounds spot to the nearest multiple of `increment`. Ties go to the even
/// multiple: 17625 at increment 50 is 352.5 steps, giving 352 * 50.
pub fn atm_strike(spot: f64, increment: i64) -> i64 {
    let steps = (spot / increment as f64).round_ties_even();
    steps as i64 * increment
}

/// Inclusive range of strikes kept on fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeWindow {
    pub min: i64,
    pub max: i64,
}

impl StrikeWindow {
    /// `[atm - increment * count, atm + increment * count]`
    pub fn around(atm: i64, increment: i64, count: u32) -> Self {
        let half_width = increment * i64::from(count);
        Self {
            min: atm - half_width,
            max: atm + half_width,
        }
    }

    pub fn contains(&self, strike: i64) -> bool {
        (self.min..=self.max).contains(&strike)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_expiry_on_thursday_is_same_day() {
        // 2026-10-22 is a Thursday
        assert_eq!(weekly_expiry(date(2026, 10, 22)), date(2026, 10, 22));
    }

    #[test]
    fn test_weekly_expiry_advances_to_next_thursday() {
        assert_eq!(weekly_expiry(date(2026, 10, 19)), date(2026, 10, 22));
        // Friday is the worst case: 6 days ahead
        assert_eq!(weekly_expiry(date(2026, 10, 23)), date(2026, 10, 29));
        // Crosses a month boundary
        assert_eq!(weekly_expiry(date(2026, 10, 30)), date(2026, 11, 5));
    }

    #[test]
    fn test_weekly_expiry_property_over_a_year() {
        let start = date(2026, 1, 1);
        for offset in 0..366 {
            let day = start + Days::new(offset);
            let expiry = weekly_expiry(day);
            assert_eq!(expiry.weekday(), Weekday::Thu);
            let ahead = (expiry - day).num_days();
            assert!((0..=6).contains(&ahead), "{day} -> {expiry}");
        }
    }

    #[test]
    fn test_atm_strike_rounding() {
        assert_eq!(atm_strike(17641.3, 50), 17650);
        assert_eq!(atm_strike(17624.9, 50), 17600);
        assert_eq!(atm_strike(41234.0, 100), 41200);
        // Ties go to the even multiple
        assert_eq!(atm_strike(17625.0, 50), 17600);
        assert_eq!(atm_strike(17675.0, 50), 17700);
    }

    #[test]
    fn test_strike_window() {
        let window = StrikeWindow::around(17650, 50, 10);
        assert_eq!(window, StrikeWindow { min: 17150, max: 18150 });
        assert!(window.contains(17150));
        assert!(window.contains(18150));
        assert!(!window.contains(17100));
        assert!(!window.contains(18200));
    }
}
