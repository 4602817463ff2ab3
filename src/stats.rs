use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::Dataset;

/// Size of the loaded feed, as shown on the dashboard home page.
#[derive(Debug, Default, Serialize)]
pub struct FeedStats {
    pub timestamp: DateTime<Utc>,
    pub routes: usize,
    pub trips: usize,
    pub stops: usize,
    pub stop_times: usize,
    pub services: usize,
    pub shapes: usize,

    // trip fields
    pub with_headsign: usize,
    pub with_direction: usize,
    pub with_shape: usize,
}

impl FeedStats {
    pub fn from_dataset(data: &Dataset) -> Self {
        let mut s = FeedStats {
            timestamp: Utc::now(),
            routes: data.routes().len(),
            trips: data.trips().len(),
            stops: data.stops().len(),
            stop_times: data.stop_time_count(),
            shapes: data.shape_count(),
            ..Default::default()
        };

        let mut services: HashSet<&str> = data
            .calendars()
            .iter()
            .map(|c| c.service_id.as_str())
            .collect();

        for t in data.trips() {
            services.insert(t.service_id.as_str());

            if !t.trip_headsign.is_empty() {
                s.with_headsign += 1;
            }

            if t.direction_id.is_some() {
                s.with_direction += 1;
            }

            if t.shape_id.is_some() {
                s.with_shape += 1;
            }
        }

        s.services = services.len();
        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn shape_pct(&self) -> f64 {
        Self::pct(self.with_shape, self.trips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Tables;
    use crate::dataset::fixtures::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(FeedStats::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(FeedStats::pct(50, 100), 50.0);
        assert_eq!(FeedStats::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_dataset_empty() {
        let data = Dataset::from(Tables::default());
        let stats = FeedStats::from_dataset(&data);

        assert_eq!(stats.routes, 0);
        assert_eq!(stats.trips, 0);
        assert_eq!(stats.services, 0);
    }

    #[test]
    fn test_from_dataset_counts() {
        let mut shaped = trip("r1", "SAT", "t2", "");
        shaped.shape_id = Some("sh".to_string());
        shaped.direction_id = None;

        let data = Dataset::from(Tables {
            routes: vec![route("r1", "95"), route("r2", "7")],
            trips: vec![trip("r1", "WKD", "t1", "Downtown"), shaped],
            stop_times: stop_times("t1", &[("08:00:00", "08:00:00"), ("08:05:00", "08:05:00")]),
            stops: vec![stop("s1", "Rideau", 45.4, -75.7)],
            calendars: vec![calendar("WKD", WEEKDAYS), calendar("SUN", SUNDAY)],
            ..Default::default()
        });
        let stats = FeedStats::from_dataset(&data);

        assert_eq!(stats.routes, 2);
        assert_eq!(stats.trips, 2);
        assert_eq!(stats.stops, 1);
        assert_eq!(stats.stop_times, 2);
        assert_eq!(stats.services, 3);
        assert_eq!(stats.with_headsign, 1);
        assert_eq!(stats.with_direction, 1);
        assert_eq!(stats.with_shape, 1);
        assert_eq!(stats.shape_pct(), 50.0);
    }
}
