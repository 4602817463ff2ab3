//! Network-wide headline numbers from the monthly summary tables.

use crate::analyzers::types::Kpi;
use crate::analyzers::utility::{mean, pct_change};
use crate::dataset::Dataset;
use crate::gtfs::MonthlyValue;

const DECEMBER: &str = "December";

/// On-time percentage, excess wait and ridership for `year`, each with the
/// change between the last two Decembers on record.
pub fn network_kpis(data: &Dataset, year: i32) -> Vec<Kpi> {
    vec![
        kpi(format!("% on-time buses ({year})"), data.performance(), year),
        kpi("Average wait time (minutes)".to_string(), data.excess_wait_time(), year),
        kpi(format!("Average number of riders ({year})"), data.riders(), year),
    ]
}

fn kpi(label: String, rows: &[MonthlyValue], year: i32) -> Kpi {
    Kpi {
        label,
        value: year_mean(rows, year),
        delta_pct: december_change(rows),
    }
}

pub fn year_mean(rows: &[MonthlyValue], year: i32) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter(|r| r.year == year).map(|r| r.value).collect();
    mean(&values)
}

/// Percent change between the last two December rows in table order.
pub fn december_change(rows: &[MonthlyValue]) -> Option<f64> {
    let mut decembers = rows.iter().filter(|r| r.month == DECEMBER).map(|r| r.value);
    let last = decembers.next_back()?;
    let previous = decembers.next_back()?;
    pct_change(previous, last)
}
