//! Stats module - aggregation queries over the mission table

mod queries;

pub use queries::{
    CountRow, KeyValue, LaunchQueries, MonthSlot, OrgSeries, PriceStats, QueryError,
    SunburstRow, SuperpowerYear, YearCount, YearLeader, YearValue, COLD_WAR_END, USSR_CODES,
};
