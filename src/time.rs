//! GTFS time-of-day arithmetic.
//!
//! GTFS writes times relative to the start of the service day, so a bus that
//! leaves at half past midnight on a late-night run is scheduled as
//! `24:30:00`. Durations are computed on the wall clock: hours of 24 or more
//! are folded back by one day, and a negative difference is wrapped by a full
//! day.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};

use crate::error::{Error, Result};

pub const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// A parsed `HH:MM:SS` GTFS time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GtfsTime {
    /// Seconds since the start of the service day, un-folded.
    service_seconds: u32,
    wall_clock: NaiveTime,
}

impl GtfsTime {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTime(s.to_owned());

        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let field = |v: &str| -> Result<u32> {
            if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            v.parse().map_err(|_| invalid())
        };
        let hours = field(h)?;
        let minutes = field(m)?;
        let seconds = field(sec)?;

        let wall_hour = if hours >= 24 { hours - 24 } else { hours };
        let wall_clock = NaiveTime::from_hms_opt(wall_hour, minutes, seconds).ok_or_else(invalid)?;

        Ok(Self {
            service_seconds: hours * 3600 + minutes * 60 + seconds,
            wall_clock,
        })
    }

    /// Seconds since the start of the service day; orders times within a trip.
    pub fn service_seconds(&self) -> u32 {
        self.service_seconds
    }

    pub fn wall_clock(&self) -> NaiveTime {
        self.wall_clock
    }

    /// Hour on the wall clock, 0..=23.
    pub fn hour(&self) -> u32 {
        self.wall_clock.hour()
    }

    pub fn is_after_midnight(&self) -> bool {
        self.service_seconds >= 24 * 3600
    }

    /// Minutes from `self` to `end` on the wall clock, wrapping once past
    /// midnight so the result is never negative.
    pub fn minutes_until(&self, end: &GtfsTime) -> f64 {
        let delta = end.wall_clock.signed_duration_since(self.wall_clock);
        let minutes = delta.num_seconds() as f64 / 60.0;
        if minutes < 0.0 {
            minutes + MINUTES_PER_DAY
        } else {
            minutes
        }
    }
}

impl FromStr for GtfsTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.service_seconds;
        write!(f, "{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
    }
}

/// Minutes elapsed between two GTFS time strings.
///
/// # Errors
///
/// Returns [`Error::InvalidTime`] naming the offending string if either side
/// is not a well-formed `HH:MM:SS`.
pub fn elapsed_minutes(start: &str, end: &str) -> Result<f64> {
    let start = GtfsTime::parse(start)?;
    let end = GtfsTime::parse(end)?;
    Ok(start.minutes_until(&end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_same_hour() {
        assert_eq!(elapsed_minutes("08:00:00", "08:15:00").unwrap(), 15.0);
    }

    #[test]
    fn test_elapsed_past_midnight_marker() {
        assert_eq!(elapsed_minutes("23:50:00", "24:10:00").unwrap(), 20.0);
    }

    #[test]
    fn test_elapsed_wraps_negative_difference() {
        assert_eq!(elapsed_minutes("23:50:00", "00:05:00").unwrap(), 15.0);
    }

    #[test]
    fn test_elapsed_both_after_midnight() {
        assert_eq!(elapsed_minutes("24:05:00", "25:35:00").unwrap(), 90.0);
    }

    #[test]
    fn test_elapsed_counts_seconds() {
        assert_eq!(elapsed_minutes("10:00:00", "10:01:30").unwrap(), 1.5);
    }

    #[test]
    fn test_elapsed_zero() {
        assert_eq!(elapsed_minutes("12:00:00", "12:00:00").unwrap(), 0.0);
    }

    #[test]
    fn test_single_digit_hour() {
        let t = GtfsTime::parse("7:05:00").unwrap();
        assert_eq!(t.hour(), 7);
        assert_eq!(t.to_string(), "07:05:00");
    }

    #[test]
    fn test_after_midnight_folds_hour() {
        let t = GtfsTime::parse("25:10:00").unwrap();
        assert!(t.is_after_midnight());
        assert_eq!(t.hour(), 1);
        assert_eq!(t.service_seconds(), 25 * 3600 + 600);
        assert_eq!(t.to_string(), "25:10:00");
    }

    #[test]
    fn test_malformed_times_name_the_input() {
        for bad in ["", "8:00", "08:60:00", "08:00:61", "ab:cd:ef", "48:00:00", "08:00:00:00", "-1:00:00"] {
            match elapsed_minutes(bad, "08:00:00") {
                Err(Error::InvalidTime(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidTime for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_end_is_reported() {
        match elapsed_minutes("08:00:00", "bogus") {
            Err(Error::InvalidTime(s)) => assert_eq!(s, "bogus"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
