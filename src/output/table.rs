use crate::models::{DiffRow, SnapshotId};

/// Open interest is shown in thousands of contracts.
const OI_SCALE: f64 = 1000.0;

/// Console rendering of a delta report.
pub struct ReportTable {
    headers: [String; 9],
}

impl ReportTable {
    pub fn new(current: &SnapshotId, previous: &SnapshotId) -> Self {
        let (curr, prev) = (current.label(), previous.label());
        Self {
            headers: [
                format!("CE OI PREV ({prev})"),
                format!("CE OI ({curr})"),
                "CE OI CHANGE".to_string(),
                "CE OI CHANGE (%)".to_string(),
                "STRIKE".to_string(),
                "PE OI CHANGE (%)".to_string(),
                "PE OI CHANGE".to_string(),
                format!("PE OI ({curr})"),
                format!("PE OI PREV ({prev})"),
            ],
        }
    }

    fn cells(row: &DiffRow) -> [String; 9] {
        [
            scaled(row.ce.previous),
            scaled(row.ce.current),
            scaled(row.ce.delta),
            percent(row.ce.delta_pct),
            row.label(),
            percent(row.pe.delta_pct),
            scaled(row.pe.delta),
            scaled(row.pe.current),
            scaled(row.pe.previous),
        ]
    }

    pub fn render(&self, rows: &[DiffRow]) -> String {
        let body: Vec<[String; 9]> = rows.iter().map(Self::cells).collect();

        let mut widths = self.headers.each_ref().map(String::len);
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.len());
            }
        }

        let border = format!(
            "+{}+",
            widths.iter().map(|w| "-".repeat(w + 2)).collect::<Vec<_>>().join("+")
        );

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&line(&self.headers, &widths));
        out.push_str(&border);
        out.push('\n');
        for cells in &body {
            out.push_str(&line(cells, &widths));
        }
        out.push_str(&border);
        out.push('\n');
        out
    }
}

fn line(cells: &[String; 9], widths: &[usize; 9]) -> String {
    let inner: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!(" {cell:^w$} "))
        .collect();
    format!("|{}|\n", inner.join("|"))
}

fn scaled(value: i64) -> String {
    format!("{}", value as f64 / OI_SCALE)
}

fn percent(value: f64) -> String {
    format!("{value:+.2} %")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SideDelta;
    use chrono::NaiveDate;

    fn id(h: u32, m: u32) -> SnapshotId {
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        SnapshotId::new("NIFTY", at)
    }

    fn row(strike: i64, is_atm: bool) -> DiffRow {
        DiffRow {
            strike,
            is_atm,
            ce: SideDelta {
                previous: 1000,
                current: 1200,
                delta: 200,
                delta_pct: 20.0,
            },
            pe: SideDelta {
                previous: 4000,
                current: 3500,
                delta: -500,
                delta_pct: -12.5,
            },
        }
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(scaled(1200), "1.2");
        assert_eq!(scaled(-500), "-0.5");
        assert_eq!(scaled(150000), "150");
        assert_eq!(percent(20.0), "+20.00 %");
        assert_eq!(percent(-12.5), "-12.50 %");
        assert_eq!(percent(0.0), "+0.00 %");
    }

    #[test]
    fn test_render_headers_and_rows() {
        let table = ReportTable::new(&id(9, 20), &id(9, 15));
        let text = table.render(&[row(17600, false), row(17650, true)]);

        assert!(text.contains("CE OI PREV (09:15)"));
        assert!(text.contains("PE OI (09:20)"));
        assert!(text.contains("> 17650 <"));
        assert!(text.contains("+20.00 %"));
        assert!(text.contains("-12.50 %"));

        let lines: Vec<&str> = text.lines().collect();
        // border, header, border, 2 rows, border
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }
}
