//! Which services run on a given day.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::gtfs::Exception;

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Parses one of the calendar column names, `monday` through `sunday`.
pub fn parse_weekday(name: &str) -> Result<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, day)| day)
        .ok_or_else(|| Error::InvalidWeekday(name.to_string()))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize].0
}

/// Service ids whose calendar row has the flag for `day` set.
///
/// The set is unordered; callers that need a stable iteration order must
/// sort it.
pub fn service_ids_for_day(data: &Dataset, day: Weekday) -> HashSet<&str> {
    data.calendars()
        .iter()
        .filter(|cal| cal.runs_on_weekday(day))
        .map(|cal| cal.service_id.as_str())
        .collect()
}

/// Service ids running on a concrete date: the weekly pattern within the
/// calendar's date range, then `calendar_dates` exceptions applied on top.
pub fn service_ids_on_date(data: &Dataset, date: NaiveDate) -> HashSet<&str> {
    let mut active: HashSet<&str> = data
        .calendars()
        .iter()
        .filter(|cal| cal.covers(date) && cal.runs_on_weekday(date.weekday()))
        .map(|cal| cal.service_id.as_str())
        .collect();

    for exception in data.calendar_dates().iter().filter(|cd| cd.date == date) {
        match exception.exception_type {
            Exception::Added => {
                active.insert(exception.service_id.as_str());
            }
            Exception::Removed => {
                active.remove(exception.service_id.as_str());
            }
        }
    }

    active
}

/// The weekly granularity the dashboard compares: regular weekdays against
/// each weekend day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    pub const ALL: [DayType; 3] = [DayType::Weekday, DayType::Saturday, DayType::Sunday];

    /// The calendar day whose services stand in for this day type. Monday
    /// service stands in for every weekday.
    pub fn representative(self) -> Weekday {
        match self {
            DayType::Weekday => Weekday::Mon,
            DayType::Saturday => Weekday::Sat,
            DayType::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayType::Weekday => "Weekday",
            DayType::Saturday => "Saturday",
            DayType::Sunday => "Sunday",
        })
    }
}

impl FromStr for DayType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "weekday" => Ok(DayType::Weekday),
            "saturday" => Ok(DayType::Saturday),
            "sunday" => Ok(DayType::Sunday),
            _ => Err(Error::InvalidWeekday(s.to_string())),
        }
    }
}
