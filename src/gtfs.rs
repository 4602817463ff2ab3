//! Row types for the GTFS static tables and the derived dashboard CSVs.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub route_id: String,
    pub route_short_name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub trip_headsign: String,
    #[serde(default)]
    pub direction_id: Option<u8>,
    #[serde(default)]
    pub shape_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Calendar {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_bool")]
    pub monday: bool,
    #[serde(deserialize_with = "deserialize_bool")]
    pub tuesday: bool,
    #[serde(deserialize_with = "deserialize_bool")]
    pub wednesday: bool,
    #[serde(deserialize_with = "deserialize_bool")]
    pub thursday: bool,
    #[serde(deserialize_with = "deserialize_bool")]
    pub friday: bool,
    #[serde(deserialize_with = "deserialize_bool")]
    pub saturday: bool,
    #[serde(deserialize_with = "deserialize_bool")]
    pub sunday: bool,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl Calendar {
    pub fn runs_on_weekday(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// Whether `date` falls inside the calendar's validity range. Missing
    /// bounds are open.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum Exception {
    Added,
    Removed,
}

impl TryFrom<u8> for Exception {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Exception::Added),
            2 => Ok(Exception::Removed),
            other => Err(format!("Invalid exception_type {other}, expected 1 or 2")),
        }
    }
}

impl From<Exception> for u8 {
    fn from(value: Exception) -> Self {
        match value {
            Exception::Added => 1,
            Exception::Removed => 2,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CalendarDate {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub exception_type: Exception,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ShapePoint {
    pub shape_id: String,
    pub shape_pt_lat: f64,
    pub shape_pt_lon: f64,
    pub shape_pt_sequence: u32,
}

/// One row of `longest_trips.csv`: the trip with the most stops for a
/// route and heading.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LongestTrip {
    /// Route label as the dashboard selects it (the short name).
    pub route_id: String,
    pub heading: String,
    #[serde(rename = "longest_trip")]
    pub longest_trip_id: String,
    #[serde(rename = "n")]
    pub stop_count: u32,
    pub trip_time: f64,
    #[serde(rename = "distance(km)")]
    pub distance_km: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HourlyAverage {
    pub heading: String,
    #[serde(rename = "time")]
    pub hour: u32,
    pub day: String,
    pub avg_trip_time: f64,
}

/// A monthly figure from one of the network-level tables.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthlyValue {
    pub year: i32,
    pub month: String,
    pub value: f64,
}

#[derive(Deserialize, Debug)]
pub struct RidersRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Ridership - Conventional", deserialize_with = "deserialize_grouped_number")]
    riders: f64,
}

#[derive(Deserialize, Debug)]
pub struct PerformanceRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "on-time", deserialize_with = "deserialize_percent")]
    on_time: f64,
}

#[derive(Deserialize, Debug)]
pub struct WaitTimeRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Month")]
    month: String,
    wait_time: f64,
}

impl From<RidersRow> for MonthlyValue {
    fn from(row: RidersRow) -> Self {
        MonthlyValue {
            year: row.year,
            month: row.month,
            value: row.riders,
        }
    }
}

impl From<PerformanceRow> for MonthlyValue {
    fn from(row: PerformanceRow) -> Self {
        MonthlyValue {
            year: row.year,
            month: row.month,
            value: row.on_time,
        }
    }
}

impl From<WaitTimeRow> for MonthlyValue {
    fn from(row: WaitTimeRow) -> Self {
        MonthlyValue {
            year: row.year,
            month: row.month,
            value: row.wait_time,
        }
    }
}

fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(de::Error::custom(format!(
            "Invalid value `{other}`, expected 0 or 1"
        ))),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d")
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(de::Error::custom)
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => parse_date(&s).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// `"7,123,456"` -> `7123456.0`
fn deserialize_grouped_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim()
        .replace(',', "")
        .parse()
        .map_err(|_| de::Error::custom(format!("Invalid number `{s}`")))
}

/// `"84.2%"` -> `84.2`
fn deserialize_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim()
        .trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| de::Error::custom(format!("Invalid percentage `{s}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read<T: serde::de::DeserializeOwned>(data: &str) -> Vec<T> {
        csv::Reader::from_reader(data.as_bytes())
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_calendar_flags_and_dates() {
        let rows: Vec<Calendar> = read(
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WKD,1,1,1,1,1,0,0,20240101,20241231\n",
        );
        let cal = &rows[0];
        assert!(cal.runs_on_weekday(Weekday::Mon));
        assert!(!cal.runs_on_weekday(Weekday::Sun));
        assert!(cal.covers(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(!cal.covers(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    }

    #[test]
    fn test_calendar_without_date_range() {
        let rows: Vec<Calendar> = read(
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday\n\
             SAT,0,0,0,0,0,1,0\n",
        );
        assert_eq!(rows[0].start_date, None);
        assert!(rows[0].covers(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
    }

    #[test]
    fn test_calendar_rejects_bad_flag() {
        let result: Result<Vec<Calendar>, _> = csv::Reader::from_reader(
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday\nX,2,0,0,0,0,0,0\n"
                .as_bytes(),
        )
        .deserialize()
        .collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_calendar_date_exception() {
        let rows: Vec<CalendarDate> =
            read("service_id,date,exception_type\nWKD,20240704,2\nSUN,20240704,1\n");
        assert_eq!(rows[0].exception_type, Exception::Removed);
        assert_eq!(rows[1].exception_type, Exception::Added);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }

    #[test]
    fn test_trip_optional_columns() {
        let rows: Vec<Trip> = read("route_id,service_id,trip_id\n95,WKD,t1\n");
        assert_eq!(rows[0].trip_headsign, "");
        assert_eq!(rows[0].direction_id, None);
        assert_eq!(rows[0].shape_id, None);
    }

    #[test]
    fn test_longest_trip_columns() {
        let rows: Vec<LongestTrip> = read(
            "route_id,heading,longest_trip,n,trip_time,distance(km)\n95,Downtown,t9,54,71.0,28.4\n",
        );
        assert_eq!(rows[0].longest_trip_id, "t9");
        assert_eq!(rows[0].stop_count, 54);
        assert_eq!(rows[0].distance_km, 28.4);
    }

    #[test]
    fn test_monthly_rows_strip_formatting() {
        let riders: Vec<RidersRow> =
            read("Year,Month,Ridership - Conventional\n2022,January,\"7,123,456\"\n");
        let perf: Vec<PerformanceRow> = read("Year,Month,on-time\n2022,January,84.5%\n");

        assert_eq!(MonthlyValue::from(riders.into_iter().next().unwrap()).value, 7_123_456.0);
        assert_eq!(MonthlyValue::from(perf.into_iter().next().unwrap()).value, 84.5);
    }
}
