//! Normalization Stage
//! Pure enrichment passes over the loaded table: country codes, UTC dates,
//! and rocket-status canonicalization. Each pass returns a new table.

pub mod countries;
pub mod date;
pub mod location;

pub use date::{normalize_date, with_launch_dates, DateError, DatedTable};
pub use location::{normalize_location, with_country_codes};

use polars::prelude::*;

/// Strip the scrape's `Status` prefix from rocket statuses.
///
/// The raw file says `StatusActive` / `StatusRetired`; every analysis and
/// chart uses the plain `Active` / `Retired`. Already-plain values pass
/// through untouched.
pub fn with_canonical_rocket_status(df: &DataFrame) -> PolarsResult<DataFrame> {
    let statuses = df.column("rocket_status")?.str()?;

    let mut canonical: Vec<Option<&str>> = Vec::with_capacity(df.height());
    for status in statuses.into_iter() {
        canonical.push(status.map(|s| s.strip_prefix("Status").unwrap_or(s)));
    }

    let mut out = df.drop("rocket_status")?;
    out.with_column(Column::new("rocket_status".into(), canonical))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_status_prefix_is_stripped() {
        let df = df! {
            "rocket_status" => &["StatusActive", "StatusRetired", "Active"],
        }
        .unwrap();

        let out = with_canonical_rocket_status(&df).unwrap();
        let statuses = out.column("rocket_status").unwrap().str().unwrap();
        assert_eq!(statuses.get(0), Some("Active"));
        assert_eq!(statuses.get(1), Some("Retired"));
        assert_eq!(statuses.get(2), Some("Active"));
    }
}
