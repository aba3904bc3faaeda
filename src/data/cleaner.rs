//! Data Cleaner
//! Missing-value filtering, duplicate detection and price parsing.

use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Malformed price value {0:?}")]
    MalformedPrice(String),
}

/// The subset of records with no missing field, used for cost analyses.
pub struct CleanedTable {
    pub df: DataFrame,
    pub dropped_rows: usize,
    pub duplicate_rows: usize,
}

/// Cleaned table with the `price` column parsed to USD millions.
pub struct PricedTable {
    pub df: DataFrame,
    pub failures: Vec<String>,
}

/// Handles missing-value filtering and numeric conversion.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop rows with any missing field into a new table.
    ///
    /// The input table is left untouched; later aggregations that do not
    /// depend on price keep using it. Duplicate rows are counted but never
    /// removed (the scrape is expected to contain none).
    pub fn clean(df: &DataFrame) -> Result<CleanedTable, CleanError> {
        let complete = df.clone().lazy().drop_nulls(None).collect()?;
        let dropped_rows = df.height() - complete.height();

        Ok(CleanedTable {
            df: complete,
            dropped_rows,
            duplicate_rows: Self::count_duplicate_rows(df)?,
        })
    }

    /// Number of rows whose full field tuple occurs more than once, counting
    /// every occurrence.
    fn count_duplicate_rows(df: &DataFrame) -> Result<usize, CleanError> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        for i in 0..df.height() {
            let mut key = String::new();
            for column in df.get_columns() {
                key.push_str(&format!("{:?}|", column.get(i)?));
            }
            *seen.entry(key).or_insert(0) += 1;
        }

        Ok(seen.values().filter(|&&count| count > 1).sum())
    }

    /// Parse a price string in USD millions, e.g. `"1,160.0"`.
    ///
    /// Thousands separators are stripped before conversion. Anything that
    /// still fails to parse is an error carrying the offending text, never a
    /// silent zero: a coerced zero would corrupt every sum and mean downstream.
    pub fn parse_price(raw: &str) -> Result<f64, CleanError> {
        let stripped = raw.trim().replace(',', "");
        stripped
            .parse::<f64>()
            .map_err(|_| CleanError::MalformedPrice(raw.to_string()))
    }

    /// Return a copy of the cleaned table with a `price` column in Float64.
    ///
    /// Records with a malformed price are dropped and reported; in strict mode
    /// the first malformed value aborts instead.
    pub fn with_prices(df: &DataFrame, strict: bool) -> Result<PricedTable, CleanError> {
        let raw_prices = df.column("price_raw")?.str()?;

        let mut keep: Vec<bool> = Vec::with_capacity(df.height());
        let mut prices: Vec<f64> = Vec::new();
        let mut failures: Vec<String> = Vec::new();

        for raw in raw_prices.into_iter() {
            let raw = raw.unwrap_or("<missing>");
            match Self::parse_price(raw) {
                Ok(price) => {
                    keep.push(true);
                    prices.push(price);
                }
                Err(err) if strict => return Err(err),
                Err(_) => {
                    keep.push(false);
                    failures.push(raw.to_string());
                }
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let df = df
            .filter(&mask)?
            .hstack(&[Column::new("price".into(), prices)])?;

        Ok(PricedTable { df, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> DataFrame {
        df! {
            "organisation" => &[Some("SpaceX"), Some("NASA"), Some("SpaceX"), None],
            "price_raw" => &[Some("50.0"), Some("1,160.0"), Some("50.0"), Some("62.0")],
        }
        .unwrap()
    }

    #[test]
    fn test_clean_drops_and_counts_incomplete_rows() {
        let cleaned = DataCleaner::clean(&sample()).unwrap();
        assert_eq!(cleaned.df.height(), 3);
        assert_eq!(cleaned.dropped_rows, 1);
    }

    #[test]
    fn test_clean_flags_duplicates_without_removing() {
        let cleaned = DataCleaner::clean(&sample()).unwrap();
        // Rows 0 and 2 are identical.
        assert_eq!(cleaned.duplicate_rows, 2);
        assert_eq!(cleaned.df.height(), 3);
    }

    #[test]
    fn test_parse_price_strips_thousands_separators() {
        assert_eq!(DataCleaner::parse_price("1,160.0").unwrap(), 1160.0);
        assert_eq!(DataCleaner::parse_price("5,000.0").unwrap(), 5000.0);
        assert_eq!(DataCleaner::parse_price("62.0").unwrap(), 62.0);
    }

    #[test]
    fn test_malformed_price_is_an_error() {
        assert!(matches!(
            DataCleaner::parse_price("about 60"),
            Err(CleanError::MalformedPrice(_))
        ));
    }

    #[test]
    fn test_with_prices_lenient_drops_and_reports() {
        let df = df! {
            "price_raw" => &["50.0", "n/a", "1,160.0"],
        }
        .unwrap();

        let priced = DataCleaner::with_prices(&df, false).unwrap();
        assert_eq!(priced.df.height(), 2);
        assert_eq!(priced.failures, vec!["n/a".to_string()]);

        let prices = priced.df.column("price").unwrap().f64().unwrap();
        assert_eq!(prices.get(0), Some(50.0));
        assert_eq!(prices.get(1), Some(1160.0));
    }

    #[test]
    fn test_with_prices_strict_aborts() {
        let df = df! {
            "price_raw" => &["n/a"],
        }
        .unwrap();

        assert!(matches!(
            DataCleaner::with_prices(&df, true),
            Err(CleanError::MalformedPrice(_))
        ));
    }
}
