//! Aggregation Queries
//! Pure group-by/aggregate computations over the normalized mission table.
//! Every query takes a table reference and returns owned results; nothing
//! mutates shared state, so the queries can run in any order.

use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Final year of the Cold War period used by the superpower views.
pub const COLD_WAR_END: i32 = 1991;

/// Country codes folded into the USSR bucket. Baikonur sits in modern
/// Kazakhstan, so Soviet-era launches carry the KAZ code.
pub const USSR_CODES: [&str; 2] = ["RUS", "KAZ"];

#[derive(Debug, Clone, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct KeyValue {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct YearCount {
    pub year: i32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearLeader {
    pub year: i32,
    pub leader: String,
    pub count: u32,
}

/// One slot on the contiguous month-on-month axis.
#[derive(Debug, Clone, Copy)]
pub struct MonthSlot {
    pub year: i32,
    pub month: i32,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct OrgSeries {
    pub organisation: String,
    pub points: Vec<YearCount>,
}

/// One leaf of the country -> organisation -> mission status hierarchy.
#[derive(Debug, Clone)]
pub struct SunburstRow {
    pub country: String,
    pub organisation: String,
    pub status: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SuperpowerYear {
    pub year: i32,
    pub usa: u32,
    pub ussr: u32,
}

/// Descriptive statistics for the launch-price distribution.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// The fixed query set over the normalized mission table.
pub struct LaunchQueries;

impl LaunchQueries {
    /// Count rows per distinct value of `key`, descending by count.
    ///
    /// Ties keep first-seen key order (stable sort), which only affects
    /// display order. Null keys are skipped; callers that care about the
    /// unresolved bucket count them separately.
    pub fn count_by(df: &DataFrame, key: &str) -> Result<Vec<CountRow>, QueryError> {
        let keys = df.column(key)?.str()?;

        let mut counts: HashMap<&str, u32> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for k in keys.into_iter().flatten() {
            let entry = counts.entry(k).or_insert(0);
            if *entry == 0 {
                first_seen.push(k);
            }
            *entry += 1;
        }

        let mut rows: Vec<CountRow> = first_seen
            .into_iter()
            .map(|k| CountRow {
                key: k.to_string(),
                count: counts[k],
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }

    /// Sum `value` per distinct `key`, over rows where the value is present.
    pub fn sum_by(df: &DataFrame, key: &str, value: &str) -> Result<Vec<KeyValue>, QueryError> {
        Self::fold_by(df, key, value, |sum, _count| sum)
    }

    /// Mean of `value` per distinct `key`, over rows where the value is present.
    pub fn mean_by(df: &DataFrame, key: &str, value: &str) -> Result<Vec<KeyValue>, QueryError> {
        Self::fold_by(df, key, value, |sum, count| sum / count as f64)
    }

    fn fold_by(
        df: &DataFrame,
        key: &str,
        value: &str,
        finish: fn(f64, u32) -> f64,
    ) -> Result<Vec<KeyValue>, QueryError> {
        let keys = df.column(key)?.str()?;
        let values = df.column(value)?.f64()?;

        let mut sums: HashMap<&str, (f64, u32)> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for i in 0..df.height() {
            if let (Some(k), Some(v)) = (keys.get(i), values.get(i)) {
                let entry = sums.entry(k).or_insert((0.0, 0));
                if entry.1 == 0 {
                    first_seen.push(k);
                }
                entry.0 += v;
                entry.1 += 1;
            }
        }

        let mut rows: Vec<KeyValue> = first_seen
            .into_iter()
            .map(|k| {
                let (sum, count) = sums[k];
                KeyValue {
                    key: k.to_string(),
                    value: finish(sum, count),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.value.total_cmp(&a.value));
        Ok(rows)
    }

    /// Trailing-window arithmetic mean, window inclusive of the current slot.
    ///
    /// Output has the same length as the input; the first `window - 1` slots
    /// have no defined value (insufficient history).
    pub fn rolling_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
        if window == 0 {
            return vec![None; values.len()];
        }
        (0..values.len())
            .map(|i| {
                if i + 1 < window {
                    None
                } else {
                    let sum: f64 = values[i + 1 - window..=i].iter().sum();
                    Some(sum / window as f64)
                }
            })
            .collect()
    }

    /// Launch counts per calendar year, ascending by year.
    pub fn launches_per_year(df: &DataFrame) -> Result<Vec<YearCount>, QueryError> {
        let years = df.column("year")?.i32()?;

        let mut counts: HashMap<i32, u32> = HashMap::new();
        for year in years.into_iter().flatten() {
            *counts.entry(year).or_insert(0) += 1;
        }

        let mut rows: Vec<YearCount> = counts
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect();
        rows.sort_by_key(|r| r.year);
        Ok(rows)
    }

    /// Launch counts per calendar month (January = index 0).
    pub fn calendar_month_counts(df: &DataFrame) -> Result<[u32; 12], QueryError> {
        let months = df.column("month")?.i32()?;

        let mut counts = [0u32; 12];
        for month in months.into_iter().flatten() {
            if (1..=12).contains(&month) {
                counts[month as usize - 1] += 1;
            }
        }
        Ok(counts)
    }

    /// Month-on-month launch counts over a contiguous year-month axis.
    ///
    /// Gaps are zero-filled so a trailing rolling average over the slots is a
    /// true window over time rather than over sparse observations.
    pub fn monthly_series(df: &DataFrame) -> Result<Vec<MonthSlot>, QueryError> {
        let years = df.column("year")?.i32()?;
        let months = df.column("month")?.i32()?;

        let mut counts: HashMap<(i32, i32), u32> = HashMap::new();
        for i in 0..df.height() {
            if let (Some(y), Some(m)) = (years.get(i), months.get(i)) {
                *counts.entry((y, m)).or_insert(0) += 1;
            }
        }

        let (Some(&first), Some(&last)) = (counts.keys().min(), counts.keys().max()) else {
            return Ok(Vec::new());
        };

        let mut slots = Vec::new();
        let (mut year, mut month) = first;
        loop {
            slots.push(MonthSlot {
                year,
                month,
                count: counts.get(&(year, month)).copied().unwrap_or(0),
            });
            if (year, month) == last {
                break;
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Ok(slots)
    }

    /// Mean launch price per year over the priced table, ascending by year.
    pub fn mean_price_per_year(df: &DataFrame) -> Result<Vec<YearValue>, QueryError> {
        let years = df.column("year")?.i32()?;
        let prices = df.column("price")?.f64()?;

        let mut sums: HashMap<i32, (f64, u32)> = HashMap::new();
        for i in 0..df.height() {
            if let (Some(y), Some(p)) = (years.get(i), prices.get(i)) {
                let entry = sums.entry(y).or_insert((0.0, 0));
                entry.0 += p;
                entry.1 += 1;
            }
        }

        let mut rows: Vec<YearValue> = sums
            .into_iter()
            .map(|(year, (sum, count))| YearValue {
                year,
                value: sum / count as f64,
            })
            .collect();
        rows.sort_by_key(|r| r.year);
        Ok(rows)
    }

    /// Per year, the group with the most launches.
    ///
    /// Groups tied on count resolve to the one that sorts first
    /// alphabetically, so the result is deterministic regardless of row order.
    pub fn leader_by_year(df: &DataFrame, group_col: &str) -> Result<Vec<YearLeader>, QueryError> {
        let years = df.column("year")?.i32()?;
        let groups = df.column(group_col)?.str()?;

        let mut counts: HashMap<(i32, &str), u32> = HashMap::new();
        for i in 0..df.height() {
            if let (Some(y), Some(g)) = (years.get(i), groups.get(i)) {
                *counts.entry((y, g)).or_insert(0) += 1;
            }
        }

        let mut leaders: HashMap<i32, (&str, u32)> = HashMap::new();
        for ((year, group), count) in counts {
            match leaders.get(&year) {
                Some(&(best, best_count))
                    if best_count > count || (best_count == count && best < group) => {}
                _ => {
                    leaders.insert(year, (group, count));
                }
            }
        }

        let mut rows: Vec<YearLeader> = leaders
            .into_iter()
            .map(|(year, (leader, count))| YearLeader {
                year,
                leader: leader.to_string(),
                count,
            })
            .collect();
        rows.sort_by_key(|r| r.year);
        Ok(rows)
    }

    /// Only the launches whose mission succeeded.
    pub fn successes_only(df: &DataFrame) -> Result<DataFrame, QueryError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col("mission_status").eq(lit("Success")))
            .collect()?;
        Ok(filtered)
    }

    /// Only the launches whose mission did not succeed, any failure subtype.
    pub fn failures_only(df: &DataFrame) -> Result<DataFrame, QueryError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col("mission_status").neq(lit("Success")))
            .collect()?;
        Ok(filtered)
    }

    /// Failed launches per year, ascending by year.
    pub fn failures_per_year(df: &DataFrame) -> Result<Vec<YearCount>, QueryError> {
        Self::launches_per_year(&Self::failures_only(df)?)
    }

    /// Percentage of failed launches per year, in [0, 100].
    ///
    /// A year with zero launches cannot appear (years come from the records
    /// themselves), but the division is guarded anyway.
    pub fn failure_rate_by_year(df: &DataFrame) -> Result<Vec<YearValue>, QueryError> {
        let totals = Self::launches_per_year(df)?;
        let failures: HashMap<i32, u32> = Self::failures_per_year(df)?
            .into_iter()
            .map(|r| (r.year, r.count))
            .collect();

        Ok(totals
            .into_iter()
            .filter(|total| total.count > 0)
            .map(|total| {
                let failed = failures.get(&total.year).copied().unwrap_or(0);
                YearValue {
                    year: total.year,
                    value: failed as f64 * 100.0 / total.count as f64,
                }
            })
            .collect())
    }

    /// Total Cold War launches for the USA and USSR buckets (years <= 1991).
    pub fn superpower_totals(df: &DataFrame) -> Result<(u32, u32), QueryError> {
        let mut usa = 0;
        let mut ussr = 0;
        for row in Self::superpower_by_year(df)? {
            usa += row.usa;
            ussr += row.ussr;
        }
        Ok((usa, ussr))
    }

    /// Year-on-year Cold War launch counts for the two superpowers.
    pub fn superpower_by_year(df: &DataFrame) -> Result<Vec<SuperpowerYear>, QueryError> {
        let years = df.column("year")?.i32()?;
        let codes = df.column("country_code")?.str()?;

        let mut per_year: HashMap<i32, (u32, u32)> = HashMap::new();
        for i in 0..df.height() {
            let (Some(year), Some(code)) = (years.get(i), codes.get(i)) else {
                continue;
            };
            if year > COLD_WAR_END {
                continue;
            }
            let entry = per_year.entry(year).or_insert((0, 0));
            if code == "USA" {
                entry.0 += 1;
            } else if USSR_CODES.contains(&code) {
                entry.1 += 1;
            }
        }

        let mut rows: Vec<SuperpowerYear> = per_year
            .into_iter()
            .map(|(year, (usa, ussr))| SuperpowerYear { year, usa, ussr })
            .collect();
        rows.sort_by_key(|r| r.year);
        Ok(rows)
    }

    /// The `n` organisations with the most launches overall.
    pub fn top_organisations(df: &DataFrame, n: usize) -> Result<Vec<String>, QueryError> {
        let mut rows = Self::count_by(df, "organisation")?;
        rows.truncate(n);
        Ok(rows.into_iter().map(|r| r.key).collect())
    }

    /// Launches per year for each listed organisation, zero-filled across the
    /// table's full year range so the series chart lines up.
    pub fn organisation_year_series(
        df: &DataFrame,
        organisations: &[String],
    ) -> Result<Vec<OrgSeries>, QueryError> {
        let years = df.column("year")?.i32()?;
        let orgs = df.column("organisation")?.str()?;

        let mut counts: HashMap<(&str, i32), u32> = HashMap::new();
        let mut min_year = i32::MAX;
        let mut max_year = i32::MIN;
        for i in 0..df.height() {
            if let (Some(y), Some(o)) = (years.get(i), orgs.get(i)) {
                min_year = min_year.min(y);
                max_year = max_year.max(y);
                *counts.entry((o, y)).or_insert(0) += 1;
            }
        }
        if min_year > max_year {
            return Ok(Vec::new());
        }

        Ok(organisations
            .iter()
            .map(|org| OrgSeries {
                organisation: org.clone(),
                points: (min_year..=max_year)
                    .map(|year| YearCount {
                        year,
                        count: counts.get(&(org.as_str(), year)).copied().unwrap_or(0),
                    })
                    .collect(),
            })
            .collect())
    }

    /// Counts for the country -> organisation -> mission status hierarchy.
    ///
    /// Records with an unresolved country code land in the `Unknown` bucket
    /// rather than disappearing.
    pub fn sunburst_rows(df: &DataFrame) -> Result<Vec<SunburstRow>, QueryError> {
        let codes = df.column("country_code")?.str()?;
        let orgs = df.column("organisation")?.str()?;
        let statuses = df.column("mission_status")?.str()?;

        let mut counts: HashMap<(&str, &str, &str), u32> = HashMap::new();
        for i in 0..df.height() {
            if let (Some(org), Some(status)) = (orgs.get(i), statuses.get(i)) {
                let country = codes.get(i).unwrap_or("Unknown");
                *counts.entry((country, org, status)).or_insert(0) += 1;
            }
        }

        let mut rows: Vec<SunburstRow> = counts
            .into_iter()
            .map(|((country, organisation, status), count)| SunburstRow {
                country: country.to_string(),
                organisation: organisation.to_string(),
                status: status.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.country, &a.organisation, &a.status).cmp(&(&b.country, &b.organisation, &b.status))
        });
        Ok(rows)
    }

    /// All parsed prices, for the histogram.
    pub fn price_values(df: &DataFrame) -> Result<Vec<f64>, QueryError> {
        let prices = df.column("price")?.f64()?;
        Ok(prices.into_iter().flatten().collect())
    }

    /// Descriptive statistics over a set of values.
    pub fn describe(values: &[f64]) -> PriceStats {
        let count = values.len();
        if count == 0 {
            return PriceStats {
                count: 0,
                mean: f64::NAN,
                median: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        PriceStats {
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn mission_fixture() -> DataFrame {
        df! {
            "organisation" => &["RVSN USSR", "NASA", "RVSN USSR", "SpaceX", "CASC", "NASA"],
            "mission_status" => &["Success", "Failure", "Success", "Success", "Partial Failure", "Success"],
            "country_code" => &[Some("KAZ"), Some("USA"), Some("RUS"), Some("USA"), None, Some("USA")],
            "year" => &[1961i32, 1961, 1962, 2018, 2018, 1961],
            "month" => &[4i32, 5, 8, 2, 2, 7],
        }
        .unwrap()
    }

    #[test]
    fn test_count_by_totals_match_row_count() {
        let df = mission_fixture();
        let rows = LaunchQueries::count_by(&df, "organisation").unwrap();
        let total: u32 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total as usize, df.height());
    }

    #[test]
    fn test_count_by_orders_descending_with_stable_ties() {
        let df = mission_fixture();
        let rows = LaunchQueries::count_by(&df, "organisation").unwrap();
        assert_eq!(rows[0].key, "RVSN USSR");
        assert_eq!(rows[0].count, 2);
        // NASA also has 2 but was seen later than RVSN USSR.
        assert_eq!(rows[1].key, "NASA");
        assert_eq!(rows[2].count, 1);
    }

    #[test]
    fn test_count_by_skips_null_keys() {
        let df = mission_fixture();
        let rows = LaunchQueries::count_by(&df, "country_code").unwrap();
        let total: u32 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_rolling_average_contract() {
        let rolled = LaunchQueries::rolling_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(rolled, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_average_window_longer_than_input() {
        let rolled = LaunchQueries::rolling_average(&[1.0, 2.0], 5);
        assert_eq!(rolled, vec![None, None]);
    }

    #[test]
    fn test_sum_and_mean_by() {
        let df = df! {
            "organisation" => &["NASA", "NASA", "SpaceX"],
            "price" => &[Some(100.0), Some(200.0), None],
        }
        .unwrap();

        let sums = LaunchQueries::sum_by(&df, "organisation", "price").unwrap();
        assert_eq!(sums.len(), 1); // SpaceX has no priced rows
        assert_eq!(sums[0].key, "NASA");
        assert_eq!(sums[0].value, 300.0);

        let means = LaunchQueries::mean_by(&df, "organisation", "price").unwrap();
        assert_eq!(means[0].value, 150.0);
    }

    #[test]
    fn test_launches_per_year_sorted() {
        let df = mission_fixture();
        let rows = LaunchQueries::launches_per_year(&df).unwrap();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1961, 1962, 2018]);
        assert_eq!(rows[0].count, 3);
    }

    #[test]
    fn test_monthly_series_fills_gaps_with_zero() {
        let df = df! {
            "year" => &[1961i32, 1961],
            "month" => &[4i32, 7],
        }
        .unwrap();

        let slots = LaunchQueries::monthly_series(&df).unwrap();
        assert_eq!(slots.len(), 4); // Apr, May, Jun, Jul
        assert_eq!(slots[0].count, 1);
        assert_eq!(slots[1].count, 0);
        assert_eq!(slots[2].count, 0);
        assert_eq!(slots[3].count, 1);
    }

    #[test]
    fn test_leader_by_year_picks_max_count() {
        let df = mission_fixture();
        let leaders = LaunchQueries::leader_by_year(&df, "organisation").unwrap();
        // 1961: NASA has 2, RVSN USSR has 1.
        assert_eq!(leaders[0].year, 1961);
        assert_eq!(leaders[0].leader, "NASA");
        assert_eq!(leaders[0].count, 2);
        assert_eq!(leaders[1].leader, "RVSN USSR");
    }

    #[test]
    fn test_leader_by_year_ties_break_alphabetically() {
        let df = df! {
            "organisation" => &["ULA", "Arianespace", "ULA", "Arianespace"],
            "year" => &[2015i32, 2015, 2015, 2015],
        }
        .unwrap();

        let leaders = LaunchQueries::leader_by_year(&df, "organisation").unwrap();
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].leader, "Arianespace");
        assert_eq!(leaders[0].count, 2);
    }

    #[test]
    fn test_failure_rate_in_range() {
        let df = mission_fixture();
        let rates = LaunchQueries::failure_rate_by_year(&df).unwrap();
        assert!(!rates.is_empty());
        for rate in &rates {
            assert!((0.0..=100.0).contains(&rate.value), "rate {}", rate.value);
        }
        // 1961 had 1 failure out of 3.
        let y1961 = rates.iter().find(|r| r.year == 1961).unwrap();
        assert!((y1961.value - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_superpower_bucket_includes_kazakhstan() {
        let df = mission_fixture();
        let (usa, ussr) = LaunchQueries::superpower_totals(&df).unwrap();
        assert_eq!(usa, 2); // 2018 rows are past the Cold War
        assert_eq!(ussr, 2); // KAZ 1961 + RUS 1962
    }

    #[test]
    fn test_sunburst_buckets_unknown_country() {
        let df = mission_fixture();
        let rows = LaunchQueries::sunburst_rows(&df).unwrap();
        let total: u32 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total as usize, df.height());
        assert!(rows.iter().any(|r| r.country == "Unknown"));
    }

    #[test]
    fn test_describe_median_even_count() {
        let stats = LaunchQueries::describe(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }
}
