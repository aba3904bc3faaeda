//! Analysis Pipeline
//! Wires the immutable stages: load -> clean -> normalize -> aggregate ->
//! render -> report. Every stage takes a table and returns a new one; the
//! only parallelism is the terminal fan-out over independent chart renders.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::charts::ChartRenderer;
use crate::data::{DataCleaner, MissionTable};
use crate::normalize;
use crate::report::{ChartSlide, DeckBuilder};
use crate::stats::{CountRow, LaunchQueries, PriceStats, YearLeader};

/// Window for the month-on-month rolling average overlay.
const ROLLING_WINDOW: usize = 12;
/// How many organisations the over-time comparison chart tracks.
const TOP_ORGANISATIONS: usize = 10;
/// Bins for the launch-cost histogram.
const PRICE_BINS: usize = 30;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    pub out_dir: PathBuf,
    /// Abort on the first malformed price or unparseable date instead of
    /// dropping the record.
    pub strict: bool,
    /// Also bundle the rendered charts into a PowerPoint deck.
    pub report: bool,
}

/// Machine-readable run report, written to `summary.json`.
#[derive(Serialize)]
pub struct RunSummary {
    pub source_rows: usize,
    pub source_columns: Vec<String>,
    pub analysed_rows: usize,
    pub cleaned_rows: usize,
    pub dropped_rows: usize,
    pub duplicate_rows: usize,
    pub unparseable_dates: Vec<String>,
    pub malformed_prices: Vec<String>,
    pub unknown_country_rows: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub price_stats: PriceStats,
    pub country_leaders: Vec<YearLeader>,
    pub country_leaders_successful_only: Vec<YearLeader>,
    pub organisation_leaders: Vec<YearLeader>,
    pub charts: Vec<String>,
}

type RenderFn<'a> = Box<dyn Fn(&Path, &str) -> Result<()> + Send + Sync + 'a>;

struct ChartJob<'a> {
    file: &'static str,
    title: &'static str,
    size: (u32, u32),
    render: RenderFn<'a>,
}

/// Run the whole analysis over one CSV.
pub fn run(config: &AnalysisConfig) -> Result<RunSummary> {
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating output directory {}", config.out_dir.display()))?;

    // Load
    let table = MissionTable::load_csv(&config.csv_path)
        .with_context(|| format!("loading {}", config.csv_path.display()))?;
    log::info!(
        "loaded {} rows from {} (source columns: {:?})",
        table.row_count(),
        table.file_path().display(),
        table.source_columns()
    );

    // Clean: the price-bearing subset, plus the duplicate flag on the source
    let cleaned = DataCleaner::clean(table.dataframe())?;
    log::info!(
        "cleaner dropped {} incomplete rows, {} remain for cost analyses",
        cleaned.dropped_rows,
        cleaned.df.height()
    );
    if cleaned.duplicate_rows > 0 {
        log::warn!("{} duplicate rows detected (kept)", cleaned.duplicate_rows);
    }

    // Normalize the full table
    let missions = normalize::with_canonical_rocket_status(table.dataframe())?;
    let missions = normalize::with_country_codes(&missions)?;
    let dated = normalize::with_launch_dates(&missions, config.strict)?;
    for raw in &dated.failures {
        log::error!("dropping record with unparseable date: {raw:?}");
    }
    let missions = dated.df;

    // Normalize and price the cleaned subset
    let priced = normalize::with_canonical_rocket_status(&cleaned.df)?;
    let priced = normalize::with_country_codes(&priced)?;
    let priced = normalize::with_launch_dates(&priced, config.strict)?.df;
    let priced = DataCleaner::with_prices(&priced, config.strict)?;
    for raw in &priced.failures {
        log::error!("dropping record with malformed price: {raw:?}");
    }
    let priced_df = priced.df;

    let unknown_country_rows = missions.column("country_code")?.null_count();
    if unknown_country_rows > 0 {
        log::info!("{unknown_country_rows} locations did not resolve to a country code");
    }

    // Aggregations
    let org_counts = LaunchQueries::count_by(&missions, "organisation")?;
    let rocket_status_counts = LaunchQueries::count_by(&missions, "rocket_status")?;
    let mission_status_counts = LaunchQueries::count_by(&missions, "mission_status")?;
    let country_counts = LaunchQueries::count_by(&missions, "country_code")?;
    let country_failures =
        LaunchQueries::count_by(&LaunchQueries::failures_only(&missions)?, "country_code")?;
    let prices = LaunchQueries::price_values(&priced_df)?;
    let price_stats = LaunchQueries::describe(&prices);
    let sunburst = LaunchQueries::sunburst_rows(&missions)?;
    let per_year = LaunchQueries::launches_per_year(&missions)?;
    let monthly = LaunchQueries::monthly_series(&missions)?;
    let monthly_counts: Vec<f64> = monthly.iter().map(|s| s.count as f64).collect();
    let rolling = LaunchQueries::rolling_average(&monthly_counts, ROLLING_WINDOW);
    let month_popularity: Vec<CountRow> = LaunchQueries::calendar_month_counts(&missions)?
        .iter()
        .enumerate()
        .map(|(i, &count)| CountRow {
            key: MONTH_NAMES[i].to_string(),
            count,
        })
        .collect();
    let price_per_year = LaunchQueries::mean_price_per_year(&priced_df)?;
    let money_by_org = LaunchQueries::sum_by(&priced_df, "organisation", "price")?;
    let money_per_launch = LaunchQueries::mean_by(&priced_df, "organisation", "price")?;
    let top_orgs = LaunchQueries::top_organisations(&missions, TOP_ORGANISATIONS)?;
    let org_series = LaunchQueries::organisation_year_series(&missions, &top_orgs)?;
    let (usa_total, ussr_total) = LaunchQueries::superpower_totals(&missions)?;
    let superpower_years = LaunchQueries::superpower_by_year(&missions)?;
    let failures_yearly = LaunchQueries::failures_per_year(&missions)?;
    let failure_rates = LaunchQueries::failure_rate_by_year(&missions)?;
    let country_leaders = LaunchQueries::leader_by_year(&missions, "country_code")?;
    let country_leaders_successful_only =
        LaunchQueries::leader_by_year(&LaunchQueries::successes_only(&missions)?, "country_code")?;
    let organisation_leaders = LaunchQueries::leader_by_year(&missions, "organisation")?;

    // Chart-ready series shapes
    let launches_series = vec![(
        "Launches".to_string(),
        per_year
            .iter()
            .map(|r| (r.year, r.count as f64))
            .collect::<Vec<_>>(),
    )];
    let price_series = vec![(
        "Average price".to_string(),
        price_per_year
            .iter()
            .map(|r| (r.year, r.value))
            .collect::<Vec<_>>(),
    )];
    let superpower_series = vec![
        (
            "USA".to_string(),
            superpower_years
                .iter()
                .map(|r| (r.year, r.usa as f64))
                .collect::<Vec<_>>(),
        ),
        (
            "USSR".to_string(),
            superpower_years
                .iter()
                .map(|r| (r.year, r.ussr as f64))
                .collect::<Vec<_>>(),
        ),
    ];
    let failures_series = vec![(
        "Failed missions".to_string(),
        failures_yearly
            .iter()
            .map(|r| (r.year, r.count as f64))
            .collect::<Vec<_>>(),
    )];
    let failure_rate_series = vec![(
        "Failure rate".to_string(),
        failure_rates
            .iter()
            .map(|r| (r.year, r.value))
            .collect::<Vec<_>>(),
    )];
    let status_slices: Vec<(String, f64)> = mission_status_counts
        .iter()
        .map(|r| (r.key.clone(), r.count as f64))
        .collect();
    let superpower_slices = vec![
        ("USA".to_string(), usa_total as f64),
        ("USSR".to_string(), ussr_total as f64),
    ];
    let money_by_org_top: Vec<CountRow> = money_by_org
        .iter()
        .take(25)
        .map(|r| CountRow {
            key: r.key.clone(),
            count: r.value.round() as u32,
        })
        .collect();
    let money_per_launch_top: Vec<CountRow> = money_per_launch
        .iter()
        .take(25)
        .map(|r| CountRow {
            key: r.key.clone(),
            count: r.value.round() as u32,
        })
        .collect();

    let jobs: Vec<ChartJob> = vec![
        ChartJob {
            file: "launches_by_organisation.png",
            title: "Space Launches by Organisation",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::bar_chart(p, t, "Number of Launches", &org_counts)
            }),
        },
        ChartJob {
            file: "rocket_status.png",
            title: "Active vs Decommissioned Rockets",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::bar_chart(p, t, "Number of Rockets", &rocket_status_counts)
            }),
        },
        ChartJob {
            file: "mission_status.png",
            title: "Mission Outcome Distribution",
            size: (900, 760),
            render: Box::new(|p, t| ChartRenderer::pie_chart(p, t, &status_slices)),
        },
        ChartJob {
            file: "price_histogram.png",
            title: "Space Mission Cost Distribution",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::histogram(p, t, "Cost of Mission in $ Millions", &prices, PRICE_BINS)
            }),
        },
        ChartJob {
            file: "launches_by_country.png",
            title: "Launches by Country",
            size: (1000, 720),
            render: Box::new(|p, t| ChartRenderer::country_ramp_chart(p, t, &country_counts)),
        },
        ChartJob {
            file: "failures_by_country.png",
            title: "Mission Failures by Country",
            size: (1000, 720),
            render: Box::new(|p, t| ChartRenderer::country_ramp_chart(p, t, &country_failures)),
        },
        ChartJob {
            file: "sunburst.png",
            title: "Launches by Country, Organisation and Outcome",
            size: (1100, 1100),
            render: Box::new(|p, t| ChartRenderer::sunburst_chart(p, t, &sunburst)),
        },
        ChartJob {
            file: "launches_per_year.png",
            title: "Launches per Year",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::line_chart(p, t, "Number of Launches", &launches_series)
            }),
        },
        ChartJob {
            file: "launches_month_on_month.png",
            title: "Month-on-Month Launches",
            size: (1400, 720),
            render: Box::new(|p, t| {
                ChartRenderer::monthly_chart(p, t, &monthly, &rolling, ROLLING_WINDOW)
            }),
        },
        ChartJob {
            file: "launches_by_month.png",
            title: "Launches by Calendar Month",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::bar_chart(p, t, "Number of Launches", &month_popularity)
            }),
        },
        ChartJob {
            file: "money_by_organisation.png",
            title: "Total Spend by Organisation",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::bar_chart(p, t, "Total Spend ($ Millions)", &money_by_org_top)
            }),
        },
        ChartJob {
            file: "money_per_launch.png",
            title: "Average Spend per Launch by Organisation",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::bar_chart(p, t, "Average Spend ($ Millions)", &money_per_launch_top)
            }),
        },
        ChartJob {
            file: "price_over_time.png",
            title: "Average Launch Price Over Time",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::line_chart(p, t, "Average Price ($ Millions)", &price_series)
            }),
        },
        ChartJob {
            file: "top_organisations_over_time.png",
            title: "Launches Over Time: Top 10 Organisations",
            size: (1280, 720),
            render: Box::new(|p, t| ChartRenderer::organisation_series_chart(p, t, &org_series)),
        },
        ChartJob {
            file: "superpower_pie.png",
            title: "Cold War Launches: USA vs USSR",
            size: (900, 760),
            render: Box::new(|p, t| ChartRenderer::pie_chart(p, t, &superpower_slices)),
        },
        ChartJob {
            file: "superpower_year_on_year.png",
            title: "Cold War Launches Year-on-Year",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::line_chart(p, t, "Number of Launches", &superpower_series)
            }),
        },
        ChartJob {
            file: "failures_per_year.png",
            title: "Mission Failures Year-on-Year",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::line_chart(p, t, "Failed Missions", &failures_series)
            }),
        },
        ChartJob {
            file: "failure_rate.png",
            title: "Mission Failure Rate Over Time",
            size: (1280, 720),
            render: Box::new(|p, t| {
                ChartRenderer::line_chart(p, t, "% of Launches Failed", &failure_rate_series)
            }),
        },
    ];

    // Render in parallel; each chart is an independent side effect.
    let render_results: Vec<Result<()>> = jobs
        .par_iter()
        .map(|job| {
            let path = config.out_dir.join(job.file);
            (job.render)(&path, job.title)
                .with_context(|| format!("rendering {}", job.file))
        })
        .collect();
    for result in render_results {
        result?;
    }
    log::info!("rendered {} charts to {}", jobs.len(), config.out_dir.display());

    let first_year = per_year.first().map(|r| r.year).unwrap_or(0);
    let last_year = per_year.last().map(|r| r.year).unwrap_or(0);

    if config.report {
        let headline = vec![
            format!("{} missions analysed, {}-{}", missions.height(), first_year, last_year),
            format!(
                "{} records carry a launch price (median ${:.1}M)",
                price_stats.count, price_stats.median
            ),
            format!(
                "{} incomplete rows dropped, {} locations without a country code",
                cleaned.dropped_rows, unknown_country_rows
            ),
        ];
        let slides: Vec<ChartSlide> = jobs
            .iter()
            .map(|job| {
                let path = config.out_dir.join(job.file);
                Ok(ChartSlide {
                    title: job.title.to_string(),
                    png: fs::read(&path)
                        .with_context(|| format!("reading {}", path.display()))?,
                    width_px: job.size.0,
                    height_px: job.size.1,
                })
            })
            .collect::<Result<_>>()?;
        DeckBuilder::write_deck(
            &config.out_dir.join("mission_report.pptx"),
            "Space Mission Launch History",
            &headline,
            &slides,
        )?;
    }

    let summary = RunSummary {
        source_rows: table.row_count(),
        source_columns: table.source_columns().to_vec(),
        analysed_rows: missions.height(),
        cleaned_rows: priced_df.height(),
        dropped_rows: cleaned.dropped_rows,
        duplicate_rows: cleaned.duplicate_rows,
        unparseable_dates: dated.failures,
        malformed_prices: priced.failures,
        unknown_country_rows,
        first_year,
        last_year,
        price_stats,
        country_leaders,
        country_leaders_successful_only,
        organisation_leaders,
        charts: jobs.iter().map(|job| job.file.to_string()).collect(),
    };

    let summary_path = config.out_dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    log::info!("run summary written: {}", summary_path.display());

    Ok(summary)
}
