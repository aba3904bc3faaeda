//! Date Normalizer
//! Parses the scraped launch timestamps into canonical UTC instants.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DateError {
    #[error("unparseable launch date: {0:?}")]
    Unparseable(String),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Table enriched with `date_utc` (epoch milliseconds), `year` and `month`
/// columns, plus the raw strings of any records that failed to parse.
pub struct DatedTable {
    pub df: DataFrame,
    pub failures: Vec<String>,
}

/// Parse a raw launch date in either of the two scraped formats:
/// `Tue Aug 07, 2018 05:52 UTC` or `Thu Aug 06, 1960` (midnight UTC).
///
/// The leading weekday token is discarded rather than validated: the scrape
/// contains weekday/date mismatches, and chrono rejects inconsistent `%a`
/// input outright. Anything matching neither format is an error carrying the
/// offending string.
pub fn normalize_date(raw: &str) -> Result<DateTime<Utc>, DateError> {
    let text = strip_weekday(raw.trim());
    let text = text.strip_suffix("UTC").map(str::trim_end).unwrap_or(text);

    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%b %d, %Y %H:%M") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%b %d, %Y") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(DateError::Unparseable(raw.to_string()))
}

fn strip_weekday(text: &str) -> &str {
    match text.split_once(' ') {
        Some((first, rest)) if WEEKDAYS.iter().any(|d| first.eq_ignore_ascii_case(d)) => {
            rest.trim_start()
        }
        _ => text,
    }
}

/// Return a copy of the table with `date_utc`, `year` and `month` columns.
///
/// Records whose `date_raw` parses under neither format are dropped and their
/// raw strings reported; in strict mode the first such record aborts instead.
pub fn with_launch_dates(df: &DataFrame, strict: bool) -> Result<DatedTable, DateError> {
    let raw_dates = df.column("date_raw")?.str()?;

    let mut keep: Vec<bool> = Vec::with_capacity(df.height());
    let mut timestamps: Vec<i64> = Vec::new();
    let mut years: Vec<i32> = Vec::new();
    let mut months: Vec<i32> = Vec::new();
    let mut failures: Vec<String> = Vec::new();

    for raw in raw_dates.into_iter() {
        let raw = raw.unwrap_or("<missing>");
        match normalize_date(raw) {
            Ok(instant) => {
                keep.push(true);
                timestamps.push(instant.timestamp_millis());
                years.push(instant.year());
                months.push(instant.month() as i32);
            }
            Err(err) if strict => return Err(err),
            Err(_) => {
                keep.push(false);
                failures.push(raw.to_string());
            }
        }
    }

    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let df = df.filter(&mask)?.hstack(&[
        Column::new("date_utc".into(), timestamps),
        Column::new("year".into(), years),
        Column::new("month".into(), months),
    ])?;

    Ok(DatedTable { df, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use polars::df;

    #[test]
    fn test_full_format_parses_to_utc() {
        let dt = normalize_date("Tue Aug 07, 2018 05:52 UTC").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2018, 8, 7));
        assert_eq!((dt.hour(), dt.minute()), (5, 52));
    }

    #[test]
    fn test_date_only_format_is_midnight() {
        let dt = normalize_date("Thu Aug 06, 1960").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1960, 8, 6));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_mismatched_weekday_still_parses() {
        // Aug 06, 1960 was a Saturday; the scrape says Thursday.
        assert!(normalize_date("Thu Aug 06, 1960").is_ok());
        assert!(normalize_date("Sat Aug 06, 1960").is_ok());
    }

    #[test]
    fn test_garbage_is_an_error_carrying_the_input() {
        match normalize_date("sometime in 1969") {
            Err(DateError::Unparseable(raw)) => assert_eq!(raw, "sometime in 1969"),
            other => panic!("expected unparseable error, got {other:?}"),
        }
    }

    #[test]
    fn test_idempotent_on_rendered_timestamp() {
        let first = normalize_date("Wed Oct 04, 1957 19:26 UTC").unwrap();
        let rendered = first.format("%a %b %d, %Y %H:%M UTC").to_string();
        assert_eq!(normalize_date(&rendered).unwrap(), first);
    }

    #[test]
    fn test_with_launch_dates_drops_and_reports_failures() {
        let df = df! {
            "organisation" => &["RVSN USSR", "NASA", "SpaceX"],
            "date_raw" => &[
                "Wed Oct 04, 1957 19:26 UTC",
                "not a date",
                "Thu Aug 06, 1960",
            ],
        }
        .unwrap();

        let dated = with_launch_dates(&df, false).unwrap();
        assert_eq!(dated.df.height(), 2);
        assert_eq!(dated.failures, vec!["not a date".to_string()]);

        let years = dated.df.column("year").unwrap().i32().unwrap();
        assert_eq!(years.get(0), Some(1957));
        assert_eq!(years.get(1), Some(1960));
    }

    #[test]
    fn test_with_launch_dates_strict_aborts() {
        let df = df! {
            "date_raw" => &["not a date"],
        }
        .unwrap();

        assert!(matches!(
            with_launch_dates(&df, true),
            Err(DateError::Unparseable(_))
        ));
    }
}
