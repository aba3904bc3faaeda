//! Mission CSV Loader
//! Reads the launch-history CSV into a DataFrame with canonical column names.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Required column {0:?} is missing from the CSV")]
    MissingColumn(String),
}

/// Source columns and the canonical names the rest of the pipeline uses.
const REQUIRED: [(&str, &str); 5] = [
    ("Organisation", "organisation"),
    ("Location", "location"),
    ("Date", "date_raw"),
    ("Rocket_Status", "rocket_status"),
    ("Mission_Status", "mission_status"),
];

/// The optional cost column, USD millions with thousands separators.
const PRICE: (&str, &str) = ("Price", "price_raw");

/// The loaded mission table plus what the source file actually contained.
pub struct MissionTable {
    df: DataFrame,
    file_path: PathBuf,
    source_columns: Vec<String>,
}

impl MissionTable {
    /// Load a mission CSV using Polars.
    ///
    /// Every column is read as a string (schema inference disabled): dates and
    /// prices are free text that the normalizers parse explicitly, with their
    /// own per-record errors, instead of letting the reader coerce silently.
    /// Scrape-artifact columns (`Unnamed: 0`, `Detail`, ...) are left behind;
    /// only the canonical columns survive, renamed to lowercase.
    pub fn load_csv(file_path: &Path) -> Result<Self, LoaderError> {
        let raw = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let source_columns: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for (source, _) in REQUIRED {
            if !source_columns.iter().any(|c| c == source) {
                return Err(LoaderError::MissingColumn(source.to_string()));
            }
        }

        let has_price = source_columns.iter().any(|c| c == PRICE.0);
        let mut keep: Vec<&str> = REQUIRED.iter().map(|(source, _)| *source).collect();
        if has_price {
            keep.push(PRICE.0);
        }

        let mut df = raw.select(keep)?;
        for (source, canonical) in REQUIRED {
            df.rename(source, canonical.into())?;
        }
        if has_price {
            df.rename(PRICE.0, PRICE.1.into())?;
        } else {
            df.with_column(Column::full_null(
                PRICE.1.into(),
                df.height(),
                &DataType::String,
            ))?;
        }

        // `DataFrame::rename` swaps the column names but leaves the cached
        // schema pointing at the original source names, so any later `.lazy()`
        // consumer looks up a name that no longer exists. Rebuild from the
        // columns to bring the schema back in sync with the renamed columns.
        let df = DataFrame::new(df.get_columns().to_vec())?;

        Ok(Self {
            df,
            file_path: file_path.to_path_buf(),
            source_columns,
        })
    }

    /// The canonicalized DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Column names exactly as they appeared in the source file.
    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_selects_and_renames_canonical_columns() {
        let file = write_csv(
            "Unnamed: 0,Organisation,Location,Date,Detail,Rocket_Status,Price,Mission_Status\n\
             0,SpaceX,\"Kennedy Space Center, Florida, USA\",\"Tue Aug 07, 2018 05:52 UTC\",Falcon 9,StatusActive,50.0,Success\n",
        );

        let table = MissionTable::load_csv(file.path()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.source_columns().len(), 8);

        let names: Vec<String> = table
            .dataframe()
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            [
                "organisation",
                "location",
                "date_raw",
                "rocket_status",
                "mission_status",
                "price_raw",
            ]
        );
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let file =
            write_csv("Organisation,Location,Date\nNASA,\"Florida, USA\",\"Thu Aug 06, 1960\"\n");

        match MissionTable::load_csv(file.path()) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, "Rocket_Status"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("load should have failed"),
        }
    }

    #[test]
    fn test_absent_price_becomes_null_column() {
        let file = write_csv(
            "Organisation,Location,Date,Rocket_Status,Mission_Status\n\
             NASA,\"Cape Canaveral, USA\",\"Thu Aug 06, 1960\",StatusRetired,Success\n",
        );

        let table = MissionTable::load_csv(file.path()).unwrap();
        let prices = table.dataframe().column("price_raw").unwrap();
        assert_eq!(prices.null_count(), 1);
    }
}
