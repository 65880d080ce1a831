//! Tolerant cell parsers. None of these fail: unreadable input degrades to a
//! default (`0.0`, `0`) or to `None` where the caller must decide.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use timesheet_core::CellValue;

/// Largest serial day number a spreadsheet can hold (9999-12-31).
const MAX_SERIAL_DAY: i64 = 2_958_465;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// Month-first before day-first: "03/04/2024" is March 4th, "13/04/2024"
// only parses as April 13th.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
];

/// Parse free-form time text into hours.
///
/// Commas become decimal points, whitespace is stripped, and the first run
/// of digits and periods is read as the number. No run, or a run that is
/// not a number (`"."`, `"1.2.3"`), yields `0.0`.
pub fn clean_time_string(raw: &str) -> f64 {
    let cleaned = raw.replace(',', ".");
    let cleaned = cleaned.trim();

    let Some(start) = cleaned.find(|c: char| c.is_ascii_digit() || c == '.') else {
        return 0.0;
    };
    let run = &cleaned[start..];
    let end = run
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(run.len());

    run[..end].parse::<f64>().unwrap_or(0.0)
}

/// Hours from a time cell.
///
/// Numbers pass through, text goes through [`clean_time_string`]. Blank and
/// non-finite cells are "no hours" (`None`) and make the row incomplete.
pub fn parse_hours(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Null => None,
        CellValue::Float(f) if f.is_finite() => Some(*f),
        CellValue::Float(_) => None,
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => Some(clean_time_string(s)),
        CellValue::Date(_) => Some(0.0),
    }
}

/// Calendar date from a date cell, `None` when it cannot be read.
///
/// Numbers are spreadsheet serial day numbers (day 1 = 1900-01-01, with
/// the customary 1899-12-30 epoch).
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Integer(i) => serial_to_date(*i),
        CellValue::Float(f) if f.is_finite() => serial_to_date(f.trunc() as i64),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // "03/04/2024 10:30" and similar: only the date token matters.
    let token = s.split_whitespace().next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

fn serial_to_date(days: i64) -> Option<NaiveDate> {
    if !(1..=MAX_SERIAL_DAY).contains(&days) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days))
}

/// Month number from a month cell; anything unreadable is `0` ("unknown").
/// Fractional values are truncated. Out-of-range numbers pass through.
pub fn parse_month(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Integer(i) => *i,
        CellValue::Float(f) if f.is_finite() => f.trunc() as i64,
        CellValue::Boolean(b) => i64::from(*b),
        CellValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn comma_decimal_separator() {
        assert_eq!(clean_time_string("1,5"), 1.5);
        assert_eq!(clean_time_string("2,0"), 2.0);
        assert_eq!(clean_time_string(" 0,25 "), 0.25);
    }

    #[test]
    fn first_numeric_run_wins() {
        assert_eq!(clean_time_string("3"), 3.0);
        assert_eq!(clean_time_string("1.5 hrs"), 1.5);
        assert_eq!(clean_time_string("approx 2h 30m"), 2.0);
        assert_eq!(clean_time_string(".5"), 0.5);
    }

    #[test]
    fn garbage_degrades_to_zero() {
        for raw in ["", "   ", "n/a", "half an hour", "-", ".", "1.2.3", "..."] {
            assert_eq!(clean_time_string(raw), 0.0, "input {:?}", raw);
        }
    }

    #[test]
    fn hours_from_cells() {
        assert_eq!(parse_hours(&CellValue::Float(1.75)), Some(1.75));
        assert_eq!(parse_hours(&CellValue::Integer(4)), Some(4.0));
        assert_eq!(parse_hours(&text("2,5")), Some(2.5));
        assert_eq!(parse_hours(&text("none")), Some(0.0));
        assert_eq!(parse_hours(&CellValue::Null), None);
        assert_eq!(parse_hours(&CellValue::Float(f64::NAN)), None);
    }

    #[test]
    fn negative_numeric_hours_pass_through() {
        // Rejected later by the store's CHECK constraint, not here.
        assert_eq!(parse_hours(&CellValue::Float(-1.0)), Some(-1.0));
        // Text never yields a sign.
        assert_eq!(parse_hours(&text("-1,5")), Some(1.5));
    }

    #[test]
    fn dates_in_common_layouts() {
        assert_eq!(parse_date(&text("2024-03-04")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&text("2024/03/04")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&text("2024-03-04 08:15:00")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&text("2024-03-04T08:15:00Z")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&text("03/04/2024")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&text("13/04/2024")), Some(ymd(2024, 4, 13)));
        assert_eq!(parse_date(&text("13.04.2024")), Some(ymd(2024, 4, 13)));
        assert_eq!(parse_date(&text("03/04/2024 10:30")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&CellValue::Date(ymd(2023, 12, 31))), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn serial_day_numbers() {
        assert_eq!(parse_date(&CellValue::Integer(45355)), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&CellValue::Float(45355.75)), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date(&CellValue::Integer(0)), None);
        assert_eq!(parse_date(&CellValue::Integer(-3)), None);
    }

    #[test]
    fn unreadable_dates_are_none() {
        assert_eq!(parse_date(&text("yesterday")), None);
        assert_eq!(parse_date(&text("2024-13-45")), None);
        assert_eq!(parse_date(&text("")), None);
        assert_eq!(parse_date(&CellValue::Null), None);
        assert_eq!(parse_date(&CellValue::Boolean(true)), None);
    }

    #[test]
    fn months() {
        assert_eq!(parse_month(&CellValue::Integer(7)), 7);
        assert_eq!(parse_month(&CellValue::Float(7.9)), 7);
        assert_eq!(parse_month(&text(" 11 ")), 11);
        assert_eq!(parse_month(&text("3.0")), 3);
        assert_eq!(parse_month(&text("March")), 0);
        assert_eq!(parse_month(&CellValue::Null), 0);
        assert_eq!(parse_month(&CellValue::Float(f64::NAN)), 0);
        assert_eq!(parse_month(&CellValue::Integer(13)), 13);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn time_string_never_negative(s in "\\PC*") {
            let hours = clean_time_string(&s);
            prop_assert!(hours >= 0.0);
        }

        #[test]
        fn time_string_without_digits_is_zero(s in "[^0-9]*") {
            prop_assert_eq!(clean_time_string(&s), 0.0);
        }

        #[test]
        fn decimal_comma_reads_like_decimal_point(x in 0.0f64..1e6) {
            let dotted = x.to_string();
            let comma = dotted.replace('.', ",");
            prop_assert_eq!(clean_time_string(&dotted), x);
            prop_assert_eq!(clean_time_string(&comma), x);
        }

        #[test]
        fn parse_month_never_panics(s in "\\PC*") {
            let _ = parse_month(&CellValue::Text(s));
        }
    }
}
