//! End-to-end test over the data stages: load, clean, normalize, aggregate.
//! Chart rendering only consumes the shapes these stages produce, so the
//! fixture run stops at the aggregation outputs.

use launchscope::data::{DataCleaner, MissionTable};
use launchscope::normalize;
use launchscope::stats::LaunchQueries;
use polars::prelude::DataFrame;
use std::io::Write;

const FIXTURE: &str = "\
Unnamed: 0,Organisation,Location,Date,Detail,Rocket_Status,Price,Mission_Status
0,RVSN USSR,\"Site 1/5, Baikonur Cosmodrome, Kazakhstan\",\"Wed Oct 04, 1957 19:26 UTC\",Sputnik 8K71PS,StatusRetired,,Success
1,RVSN USSR,\"Site 1/5, Baikonur Cosmodrome, Kazakhstan\",\"Sun Nov 03, 1957 02:30 UTC\",Sputnik 8K71PS,StatusRetired,,Success
2,US Navy,\"LC-18A, Cape Canaveral AFS, Florida, USA\",\"Fri Dec 06, 1957 16:44 UTC\",Vanguard,StatusRetired,,Failure
3,NASA,\"LC-39A, Kennedy Space Center, Florida, USA\",\"Wed Jul 16, 1969 13:32 UTC\",Saturn V,StatusRetired,\"1,160.0\",Success
4,SpaceX,\"LC-39A, Kennedy Space Center, Florida, USA\",\"Sat May 30, 2020 19:22 UTC\",Falcon 9,StatusActive,50.0,Success
5,CASC,\"LC-9, Taiyuan Satellite Launch Center, China\",\"Sat Dec 07, 2019\",Long March 4B,StatusActive,64.68,Success
6,ExPace,\"Tai Rui Barge, Yellow Sea, China\",\"Thu Sep 12, 2019 03:26 UTC\",Kuaizhou 1A,StatusActive,28.3,Success
7,Sea Launch,\"LP Odyssey, Kiritimati Launch Area, Pacific Ocean\",\"Tue Mar 12, 1999 09:29 UTC\",Zenit-3SL,StatusRetired,,Failure
8,ISRO,\"First Launch Pad, Satish Dhawan Space Centre, India\",\"Fri Nov 14, 2008\",PSLV-XL,StatusActive,31.0,Success
9,Roscosmos,\"Site 1/5, Baikonur Cosmodrome, Kazakhstan\",Coming Soon,Soyuz,StatusActive,48.5,Success
10,Arianespace,\"ELA-3, Guiana Space Centre, France\",\"Tue Feb 05, 2019 21:01 UTC\",Ariane 5,StatusActive,N/A,Success
";

fn load_fixture() -> MissionTable {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FIXTURE.as_bytes()).unwrap();
    MissionTable::load_csv(file.path()).unwrap()
}

/// The normalized full table: canonical statuses, country codes, UTC dates.
fn normalized(table: &MissionTable) -> (DataFrame, Vec<String>) {
    let df = normalize::with_canonical_rocket_status(table.dataframe()).unwrap();
    let df = normalize::with_country_codes(&df).unwrap();
    let dated = normalize::with_launch_dates(&df, false).unwrap();
    (dated.df, dated.failures)
}

#[test]
fn test_load_reports_source_shape() {
    let table = load_fixture();
    assert_eq!(table.row_count(), 11);
    assert!(table.source_columns().iter().any(|c| c == "Unnamed: 0"));
    assert_eq!(table.dataframe().width(), 6);
}

#[test]
fn test_unparseable_date_drops_only_that_record() {
    let table = load_fixture();
    let (missions, failures) = normalized(&table);
    assert_eq!(missions.height(), 10);
    assert_eq!(failures, vec!["Coming Soon".to_string()]);
}

#[test]
fn test_cleaner_and_price_parsing() {
    let table = load_fixture();
    let cleaned = DataCleaner::clean(table.dataframe()).unwrap();
    // Four rows have no price at all.
    assert_eq!(cleaned.dropped_rows, 4);
    assert_eq!(cleaned.duplicate_rows, 0);

    let dated = normalize::with_launch_dates(&cleaned.df, false).unwrap();
    let priced = DataCleaner::with_prices(&dated.df, false).unwrap();
    assert_eq!(priced.failures, vec!["N/A".to_string()]);

    let mut prices = LaunchQueries::price_values(&priced.df).unwrap();
    prices.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(prices, vec![28.3, 31.0, 50.0, 64.68, 1160.0]);
}

#[test]
fn test_country_codes_cover_aliases_and_unknowns() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let unknown = missions.column("country_code").unwrap().null_count();
    assert_eq!(unknown, 1); // the Pacific Ocean sea launch

    let by_country = LaunchQueries::count_by(&missions, "country_code").unwrap();
    let get = |code: &str| {
        by_country
            .iter()
            .find(|r| r.key == code)
            .map(|r| r.count)
            .unwrap_or(0)
    };
    assert_eq!(get("KAZ"), 2);
    assert_eq!(get("USA"), 3);
    assert_eq!(get("CHN"), 2); // last-segment China + Yellow Sea alias
    assert_eq!(get("IND"), 1);
    assert_eq!(get("FRA"), 1);
}

#[test]
fn test_organisation_counts_sum_to_table_height() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let by_org = LaunchQueries::count_by(&missions, "organisation").unwrap();
    let total: u32 = by_org.iter().map(|r| r.count).sum();
    assert_eq!(total as usize, missions.height());
}

#[test]
fn test_rocket_status_is_canonical() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let statuses = LaunchQueries::count_by(&missions, "rocket_status").unwrap();
    let keys: Vec<&str> = statuses.iter().map(|r| r.key.as_str()).collect();
    assert!(keys.contains(&"Active"));
    assert!(keys.contains(&"Retired"));
    assert!(!keys.iter().any(|k| k.starts_with("Status")));
}

#[test]
fn test_failure_rates_stay_in_percentage_range() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let rates = LaunchQueries::failure_rate_by_year(&missions).unwrap();
    assert!(!rates.is_empty());
    for rate in &rates {
        assert!((0.0..=100.0).contains(&rate.value));
    }
    let y1957 = rates.iter().find(|r| r.year == 1957).unwrap();
    assert!((y1957.value - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cold_war_buckets() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let (usa, ussr) = LaunchQueries::superpower_totals(&missions).unwrap();
    assert_eq!(usa, 2); // 1957 Vanguard + 1969 Saturn V
    assert_eq!(ussr, 2); // the two 1957 Baikonur launches
}

#[test]
fn test_country_leader_per_year() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let leaders = LaunchQueries::leader_by_year(&missions, "country_code").unwrap();
    let y1957 = leaders.iter().find(|l| l.year == 1957).unwrap();
    assert_eq!(y1957.leader, "KAZ");
    assert_eq!(y1957.count, 2);
}

#[test]
fn test_sunburst_accounts_for_every_mission() {
    let table = load_fixture();
    let (missions, _) = normalized(&table);

    let rows = LaunchQueries::sunburst_rows(&missions).unwrap();
    let total: u32 = rows.iter().map(|r| r.count).sum();
    assert_eq!(total as usize, missions.height());
    assert!(rows.iter().any(|r| r.country == "Unknown"));
}

#[test]
fn test_strict_mode_aborts_on_bad_date() {
    let table = load_fixture();
    let df = normalize::with_canonical_rocket_status(table.dataframe()).unwrap();
    let df = normalize::with_country_codes(&df).unwrap();
    assert!(normalize::with_launch_dates(&df, true).is_err());
}
