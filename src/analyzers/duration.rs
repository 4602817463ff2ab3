//! Durations derived from a trip's ordered stop times.

use crate::error::{Error, Result};
use crate::gtfs::StopTime;
use crate::time::{GtfsTime, elapsed_minutes};

/// Minutes from the first stop's departure to the last stop's arrival.
///
/// `ordered` must be sorted by `stop_sequence`.
///
/// # Errors
///
/// [`Error::EmptyTrip`] for an empty slice, [`Error::InvalidTime`] for a
/// malformed time.
pub fn total_trip_time(ordered: &[StopTime]) -> Result<f64> {
    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return Err(Error::EmptyTrip);
    };
    elapsed_minutes(&first.departure_time, &last.arrival_time)
}

/// Minutes between consecutive arrivals; one entry per adjacent pair.
pub fn inter_stop_times(ordered: &[StopTime]) -> Result<Vec<f64>> {
    ordered
        .windows(2)
        .map(|pair| elapsed_minutes(&pair[0].arrival_time, &pair[1].arrival_time))
        .collect()
}

/// Departure time of the first stop, used to order trips chronologically.
pub fn first_departure(ordered: &[StopTime]) -> Result<GtfsTime> {
    let first = ordered.first().ok_or(Error::EmptyTrip)?;
    GtfsTime::parse(&first.departure_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::stop_times;

    #[test]
    fn test_total_uses_first_departure_and_last_arrival() {
        let trip = stop_times(
            "t1",
            &[
                ("07:58:00", "08:00:00"),
                ("08:07:00", "08:08:00"),
                ("08:30:00", "08:35:00"),
            ],
        );
        assert_eq!(total_trip_time(&trip).unwrap(), 30.0);
        assert_eq!(
            total_trip_time(&trip).unwrap(),
            elapsed_minutes(&trip[0].departure_time, &trip[2].arrival_time).unwrap()
        );
    }

    #[test]
    fn test_total_across_midnight() {
        let trip = stop_times("t1", &[("23:40:00", "23:45:00"), ("24:20:00", "24:20:00")]);
        assert_eq!(total_trip_time(&trip).unwrap(), 35.0);
    }

    #[test]
    fn test_total_single_stop() {
        let trip = stop_times("t1", &[("09:00:00", "09:02:00")]);
        // Departure after arrival wraps by a day.
        assert_eq!(total_trip_time(&trip).unwrap(), 1438.0);
    }

    #[test]
    fn test_total_empty_trip() {
        assert!(matches!(total_trip_time(&[]), Err(Error::EmptyTrip)));
    }

    #[test]
    fn test_inter_stop_lengths() {
        for k in 0..5 {
            let times: Vec<(&str, &str)> = vec![("10:00:00", "10:00:00"); k];
            let trip = stop_times("t1", &times);
            assert_eq!(inter_stop_times(&trip).unwrap().len(), k.saturating_sub(1));
        }
    }

    #[test]
    fn test_inter_stop_uses_arrivals() {
        let trip = stop_times(
            "t1",
            &[
                ("10:00:00", "10:05:00"),
                ("10:10:00", "10:11:00"),
                ("10:12:30", "10:13:00"),
            ],
        );
        assert_eq!(inter_stop_times(&trip).unwrap(), vec![10.0, 2.5]);
    }

    #[test]
    fn test_inter_stop_bad_time() {
        let trip = stop_times("t1", &[("10:00:00", "10:00:00"), ("10:6x:00", "10:07:00")]);
        assert!(matches!(inter_stop_times(&trip), Err(Error::InvalidTime(s)) if s == "10:6x:00"));
    }

    #[test]
    fn test_first_departure() {
        let trip = stop_times("t1", &[("24:58:00", "25:01:00"), ("25:10:00", "25:10:00")]);
        let dep = first_departure(&trip).unwrap();
        assert_eq!(dep.hour(), 1);
        assert!(first_departure(&[]).is_err());
    }
}
