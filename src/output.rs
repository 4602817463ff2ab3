//! Output formatting and persistence for analytics results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use csv::WriterBuilder;
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::Path;

/// Prints a result to stdout using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    println!("{value:#?}");
}

/// Prints a result to stdout as pretty-printed JSON. Logs stay on stderr.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

pub fn render_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Appends one record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &impl Serialize) -> Result<()> {
    append_records(path, std::slice::from_ref(record))
}

/// Appends flat records as rows to a CSV file, writing the header only when
/// the file is created.
pub fn append_records<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{BusiestRoute, Kpi};
    use crate::stats::FeedStats;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn busiest(route_id: &str, stop_count: u32) -> BusiestRoute {
        BusiestRoute {
            route_id: route_id.to_string(),
            short_name: route_id.to_string(),
            stop_count,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&FeedStats::default());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&FeedStats::default()).unwrap();
    }

    #[test]
    fn test_render_json_is_plain_json() {
        let rendered = render_json(&[busiest("95", 54)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["short_name"], "95");
        assert_eq!(parsed[0]["stop_count"], 54);
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("transit_insights_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_record(&path, &FeedStats::default()).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,routes"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("transit_insights_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[busiest("95", 54), busiest("7", 48)]).unwrap();
        append_records(&path, &[busiest("12", 30)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 3 data rows
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "route_id,short_name,stop_count");
        assert_eq!(lines[3], "12,12,30");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_missing_values() {
        let path = temp_path("transit_insights_test_kpi.csv");
        let _ = fs::remove_file(&path);

        let kpi = Kpi {
            label: "Average wait time (minutes)".to_string(),
            value: Some(2.5),
            delta_pct: None,
        };
        append_record(&path, &kpi).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().nth(1), Some("Average wait time (minutes),2.5,"));

        fs::remove_file(&path).unwrap();
    }
}
