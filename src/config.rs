//! Where the input tables live.
//!
//! By default every table is looked up by its conventional file name inside
//! one data directory. A JSON file can override individual names:
//! ```json
//! {
//!   "stop_times": "stop_times.txt.gz",
//!   "longest_trips": "../derived/longest_trips.csv"
//! }
//! ```
//! Relative overrides are resolved against the data directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Routes,
    Trips,
    StopTimes,
    Stops,
    Calendar,
    CalendarDates,
    Shapes,
    Riders,
    Performance,
    ExcessWaitTime,
    LongestTrips,
    HourlyAverageTrips,
}

impl Table {
    pub const ALL: [Table; 12] = [
        Table::Routes,
        Table::Trips,
        Table::StopTimes,
        Table::Stops,
        Table::Calendar,
        Table::CalendarDates,
        Table::Shapes,
        Table::Riders,
        Table::Performance,
        Table::ExcessWaitTime,
        Table::LongestTrips,
        Table::HourlyAverageTrips,
    ];

    /// Key used in the override file.
    pub fn key(self) -> &'static str {
        match self {
            Table::Routes => "routes",
            Table::Trips => "trips",
            Table::StopTimes => "stop_times",
            Table::Stops => "stops",
            Table::Calendar => "calendar",
            Table::CalendarDates => "calendar_dates",
            Table::Shapes => "shapes",
            Table::Riders => "riders",
            Table::Performance => "performance",
            Table::ExcessWaitTime => "excess_wait_time",
            Table::LongestTrips => "longest_trips",
            Table::HourlyAverageTrips => "hourly_average_trips",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Table::Routes => "routes.txt",
            Table::Trips => "trips.txt",
            Table::StopTimes => "stop_times.txt",
            Table::Stops => "stops.txt",
            Table::Calendar => "calendar.txt",
            Table::CalendarDates => "calendar_dates.txt",
            Table::Shapes => "shapes.txt",
            Table::Riders => "riders.csv",
            Table::Performance => "performance.csv",
            Table::ExcessWaitTime => "excess_wait_time.csv",
            Table::LongestTrips => "longest_trips.csv",
            Table::HourlyAverageTrips => "hourly_average_trips.csv",
        }
    }

    /// Tables the dashboard can run without.
    pub fn is_optional(self) -> bool {
        matches!(self, Table::CalendarDates)
    }

    fn from_key(key: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.key() == key)
    }
}

#[derive(Debug, Clone)]
pub struct DataPaths {
    data_dir: PathBuf,
    overrides: HashMap<Table, PathBuf>,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            overrides: HashMap::new(),
        }
    }

    /// Loads file name overrides from a JSON object at `path`.
    pub fn with_overrides_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.with_overrides_json(&content)
    }

    pub fn with_overrides_json(mut self, json: &str) -> Result<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        for (key, file) in entries {
            let table = Table::from_key(&key).ok_or_else(|| Error::not_found("table", &key))?;
            self.overrides.insert(table, PathBuf::from(file));
        }
        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, table: Table) -> PathBuf {
        match self.overrides.get(&table) {
            Some(file) if file.is_absolute() => file.clone(),
            Some(file) => self.data_dir.join(file),
            None => self.data_dir.join(table.default_file_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let paths = DataPaths::new("transit");
        assert_eq!(paths.path(Table::StopTimes), Path::new("transit/stop_times.txt"));
        assert_eq!(
            paths.path(Table::HourlyAverageTrips),
            Path::new("transit/hourly_average_trips.csv")
        );
    }

    #[test]
    fn test_overrides_resolve_against_data_dir() {
        let paths = DataPaths::new("transit")
            .with_overrides_json(r#"{"stop_times": "stop_times.txt.gz", "riders": "/srv/riders.csv"}"#)
            .unwrap();
        assert_eq!(paths.path(Table::StopTimes), Path::new("transit/stop_times.txt.gz"));
        assert_eq!(paths.path(Table::Riders), Path::new("/srv/riders.csv"));
        assert_eq!(paths.path(Table::Routes), Path::new("transit/routes.txt"));
    }

    #[test]
    fn test_unknown_override_key() {
        let result = DataPaths::new("transit").with_overrides_json(r#"{"agency": "agency.txt"}"#);
        assert!(matches!(result, Err(Error::NotFound { kind: "table", .. })));
    }

    #[test]
    fn test_every_table_has_unique_key() {
        for table in Table::ALL {
            assert_eq!(Table::from_key(table.key()), Some(table));
        }
    }
}
