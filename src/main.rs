//! launchscope - Space Mission History Analysis & Chart Report Generator
//!
//! Batch entry point: parse the few command-line options, run the analysis
//! pipeline once, print the headline numbers.

use anyhow::{Context, Result};
use launchscope::pipeline::{self, AnalysisConfig};
use std::path::PathBuf;

const USAGE: &str = "\
Usage: launchscope [CSV_PATH] [options]

Options:
  --out <DIR>    output directory for charts and reports (default: analysis_out)
  --strict       abort on the first malformed price or unparseable date
  --no-report    skip the PowerPoint report deck
  -h, --help     show this help
";

fn main() -> Result<()> {
    env_logger::init();

    let config = parse_args()?;
    let summary = pipeline::run(&config)?;

    println!("Analysed {} of {} source rows ({}-{})",
        summary.analysed_rows, summary.source_rows, summary.first_year, summary.last_year);
    println!(
        "Cleaned table: {} rows ({} dropped for missing fields, {} duplicates flagged)",
        summary.cleaned_rows, summary.dropped_rows, summary.duplicate_rows
    );
    if !summary.unparseable_dates.is_empty() || !summary.malformed_prices.is_empty() {
        println!(
            "Records dropped for bad data: {} dates, {} prices",
            summary.unparseable_dates.len(),
            summary.malformed_prices.len()
        );
    }
    println!(
        "{} charts written to {}",
        summary.charts.len(),
        config.out_dir.display()
    );

    Ok(())
}

fn parse_args() -> Result<AnalysisConfig> {
    let mut csv_path = PathBuf::from("mission_launches.csv");
    let mut out_dir = PathBuf::from("analysis_out");
    let mut strict = false;
    let mut report = true;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                out_dir = PathBuf::from(args.next().context("--out needs a directory")?);
            }
            "--strict" => strict = true,
            "--no-report" => report = false,
            "-h" | "--help" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => {
                anyhow::bail!("unknown option {flag:?}\n{USAGE}");
            }
            path => csv_path = PathBuf::from(path),
        }
    }

    Ok(AnalysisConfig {
        csv_path,
        out_dir,
        strict,
        report,
    })
}
