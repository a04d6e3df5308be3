use chrono::{Datelike as _, NaiveDate};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Formats an optional f64 to 2 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.2}"),
        _ => "—".to_owned(),
    }
}

/// Formats a value as dollars with thousands separators, e.g. `$12,345.60`.
pub fn fmt_currency(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_owned();
    }
    let sign = if v < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", v.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Renders a plain-text table. The first column is left-aligned, the rest right-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        format!("  {}\n", line.trim_end())
    };

    let mut out = format_row(headers);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&format_row(&rule));
    for row in rows {
        out.push_str(&format_row(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_currency() {
        assert_eq!(fmt_currency(0.0), "$0.00");
        assert_eq!(fmt_currency(350.0), "$350.00");
        assert_eq!(fmt_currency(1234.5), "$1,234.50");
        assert_eq!(fmt_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(fmt_currency(-42.129), "-$42.13");
        assert_eq!(fmt_currency(f64::NAN), "n/a");
    }

    #[test]
    fn test_fmt_opt() {
        assert_eq!(fmt_opt(Some(2.0)), "2.00");
        assert_eq!(fmt_opt(None), "—");
        assert_eq!(fmt_opt(Some(f64::INFINITY)), "—");
    }

    #[test]
    fn test_epoch_day_round_trip() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");
        assert_eq!(days_since_epoch(epoch), 0);
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date");
        assert_eq!(date_from_days(days_since_epoch(date)), Some(date));
        assert_eq!(date_from_days(19_797), Some(date));
    }

    #[test]
    fn test_render_table_alignment() {
        let headers = vec!["Product".to_owned(), "Total".to_owned()];
        let rows = vec![
            vec!["B".to_owned(), "200.00".to_owned()],
            vec!["Widget".to_owned(), "5.00".to_owned()],
        ];
        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "  Product   Total");
        assert_eq!(lines[2], "  B        200.00");
        assert_eq!(lines[3], "  Widget     5.00");
    }
}
