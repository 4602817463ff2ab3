//! The reference data for one dashboard session.
//!
//! [`Dataset`] is built once at startup and handed by reference to every
//! query. Nothing in it changes afterwards.

use std::collections::HashMap;

use itertools::Itertools;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::{DataPaths, Table};
use crate::error::{Error, Result};
use crate::gtfs::{
    Calendar, CalendarDate, HourlyAverage, LongestTrip, MonthlyValue, PerformanceRow, RidersRow,
    Route, ShapePoint, Stop, StopTime, Trip, WaitTimeRow,
};
use crate::parser::read_table;

/// Raw table contents, in file order.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub stops: Vec<Stop>,
    pub calendars: Vec<Calendar>,
    pub calendar_dates: Vec<CalendarDate>,
    pub shapes: Vec<ShapePoint>,
    pub riders: Vec<MonthlyValue>,
    pub performance: Vec<MonthlyValue>,
    pub excess_wait_time: Vec<MonthlyValue>,
    pub longest_trips: Vec<LongestTrip>,
    pub hourly_averages: Vec<HourlyAverage>,
}

impl Tables {
    /// Reads every table named by `paths`.
    ///
    /// # Errors
    ///
    /// Any missing or malformed required table is fatal.
    #[tracing::instrument(skip_all, fields(data_dir = %paths.data_dir().display()))]
    pub fn load(paths: &DataPaths) -> Result<Self> {
        Ok(Tables {
            routes: load(paths, Table::Routes)?,
            trips: load(paths, Table::Trips)?,
            stop_times: load(paths, Table::StopTimes)?,
            stops: load(paths, Table::Stops)?,
            calendars: load(paths, Table::Calendar)?,
            calendar_dates: load(paths, Table::CalendarDates)?,
            shapes: load(paths, Table::Shapes)?,
            riders: load_monthly::<RidersRow>(paths, Table::Riders)?,
            performance: load_monthly::<PerformanceRow>(paths, Table::Performance)?,
            excess_wait_time: load_monthly::<WaitTimeRow>(paths, Table::ExcessWaitTime)?,
            longest_trips: load(paths, Table::LongestTrips)?,
            hourly_averages: load(paths, Table::HourlyAverageTrips)?,
        })
    }
}

fn load<T: DeserializeOwned>(paths: &DataPaths, table: Table) -> Result<Vec<T>> {
    let path = paths.path(table);
    if table.is_optional() && !path.exists() {
        info!(table = table.key(), path = %path.display(), "Optional table absent, skipping");
        return Ok(Vec::new());
    }

    let rows: Vec<T> = read_table(&path)?;
    info!(table = table.key(), rows = rows.len(), "Loaded table");
    Ok(rows)
}

fn load_monthly<T>(paths: &DataPaths, table: Table) -> Result<Vec<MonthlyValue>>
where
    T: DeserializeOwned + Into<MonthlyValue>,
{
    Ok(load::<T>(paths, table)?.into_iter().map(Into::into).collect())
}

#[derive(Debug)]
pub struct Dataset {
    routes: Vec<Route>,
    trips: Vec<Trip>,
    stops: Vec<Stop>,
    calendars: Vec<Calendar>,
    calendar_dates: Vec<CalendarDate>,
    riders: Vec<MonthlyValue>,
    performance: Vec<MonthlyValue>,
    excess_wait_time: Vec<MonthlyValue>,
    longest_trips: Vec<LongestTrip>,
    hourly_averages: Vec<HourlyAverage>,
    stop_time_count: usize,

    /// Per trip, ordered by `stop_sequence`.
    stop_times: HashMap<String, Vec<StopTime>>,
    /// Per shape, ordered by `shape_pt_sequence`.
    shapes: HashMap<String, Vec<ShapePoint>>,
    route_by_id: HashMap<String, usize>,
    route_by_short_name: HashMap<String, usize>,
    trip_by_id: HashMap<String, usize>,
    stop_by_id: HashMap<String, usize>,
}

impl Dataset {
    pub fn load(paths: &DataPaths) -> Result<Self> {
        Ok(Self::from(Tables::load(paths)?))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// All trips in trip-table order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn calendars(&self) -> &[Calendar] {
        &self.calendars
    }

    pub fn calendar_dates(&self) -> &[CalendarDate] {
        &self.calendar_dates
    }

    pub fn riders(&self) -> &[MonthlyValue] {
        &self.riders
    }

    pub fn performance(&self) -> &[MonthlyValue] {
        &self.performance
    }

    pub fn excess_wait_time(&self) -> &[MonthlyValue] {
        &self.excess_wait_time
    }

    pub fn longest_trips(&self) -> &[LongestTrip] {
        &self.longest_trips
    }

    pub fn hourly_averages(&self) -> &[HourlyAverage] {
        &self.hourly_averages
    }

    pub fn stop_time_count(&self) -> usize {
        self.stop_time_count
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn route(&self, route_id: &str) -> Result<&Route> {
        self.route_by_id
            .get(route_id)
            .map(|&i| &self.routes[i])
            .ok_or_else(|| Error::not_found("route", route_id))
    }

    /// Looks a route up by the number riders see. If the feed repeats a short
    /// name the first route wins.
    pub fn route_by_short_name(&self, short_name: &str) -> Result<&Route> {
        self.route_by_short_name
            .get(short_name)
            .map(|&i| &self.routes[i])
            .ok_or_else(|| Error::not_found("route short name", short_name))
    }

    pub fn trip(&self, trip_id: &str) -> Result<&Trip> {
        self.trip_by_id
            .get(trip_id)
            .map(|&i| &self.trips[i])
            .ok_or_else(|| Error::not_found("trip", trip_id))
    }

    pub fn stop(&self, stop_id: &str) -> Result<&Stop> {
        self.stop_by_id
            .get(stop_id)
            .map(|&i| &self.stops[i])
            .ok_or_else(|| Error::not_found("stop", stop_id))
    }

    /// Stop times of a trip ordered by sequence. Empty for a trip with no
    /// stop times.
    pub fn stop_times(&self, trip_id: &str) -> &[StopTime] {
        self.stop_times
            .get(trip_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every trip id that has stop times, with its ordered stop times.
    pub fn stop_times_by_trip(&self) -> impl Iterator<Item = (&str, &[StopTime])> {
        self.stop_times
            .iter()
            .map(|(trip_id, stop_times)| (trip_id.as_str(), stop_times.as_slice()))
    }

    pub fn shape(&self, shape_id: &str) -> Result<&[ShapePoint]> {
        self.shapes
            .get(shape_id)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::not_found("shape", shape_id))
    }
}

impl From<Tables> for Dataset {
    fn from(tables: Tables) -> Self {
        let stop_time_count = tables.stop_times.len();

        let stop_times: HashMap<String, Vec<StopTime>> = tables
            .stop_times
            .into_iter()
            .into_group_map_by(|st| st.trip_id.clone())
            .into_iter()
            .map(|(trip_id, mut group)| {
                group.sort_by_key(|st| st.stop_sequence);
                (trip_id, group)
            })
            .collect();

        let shapes: HashMap<String, Vec<ShapePoint>> = tables
            .shapes
            .into_iter()
            .into_group_map_by(|pt| pt.shape_id.clone())
            .into_iter()
            .map(|(shape_id, mut points)| {
                points.sort_by_key(|pt| pt.shape_pt_sequence);
                (shape_id, points)
            })
            .collect();

        let route_by_id = index_by(&tables.routes, |r| &r.route_id);
        let route_by_short_name = index_by(&tables.routes, |r| &r.route_short_name);
        let trip_by_id = index_by(&tables.trips, |t| &t.trip_id);
        let stop_by_id = index_by(&tables.stops, |s| &s.stop_id);

        let without_stop_times = tables
            .trips
            .iter()
            .filter(|t| !stop_times.contains_key(&t.trip_id))
            .count();
        if without_stop_times > 0 {
            warn!(trips = without_stop_times, "Trips without stop times");
        }

        Dataset {
            routes: tables.routes,
            trips: tables.trips,
            stops: tables.stops,
            calendars: tables.calendars,
            calendar_dates: tables.calendar_dates,
            riders: tables.riders,
            performance: tables.performance,
            excess_wait_time: tables.excess_wait_time,
            longest_trips: tables.longest_trips,
            hourly_averages: tables.hourly_averages,
            stop_time_count,
            stop_times,
            shapes,
            route_by_id,
            route_by_short_name,
            trip_by_id,
            stop_by_id,
        }
    }
}

/// Position of the first row for each key.
fn index_by<T>(rows: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        index.entry(key(row).clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small in-memory feeds shared by the analyzer tests.

    use super::*;

    pub fn route(id: &str, short_name: &str) -> Route {
        Route {
            route_id: id.to_string(),
            route_short_name: short_name.to_string(),
        }
    }

    pub fn trip(route_id: &str, service_id: &str, trip_id: &str, headsign: &str) -> Trip {
        Trip {
            route_id: route_id.to_string(),
            service_id: service_id.to_string(),
            trip_id: trip_id.to_string(),
            trip_headsign: headsign.to_string(),
            direction_id: Some(0),
            shape_id: None,
        }
    }

    pub fn stop(id: &str, name: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            stop_id: id.to_string(),
            stop_name: name.to_string(),
            stop_lat: lat,
            stop_lon: lon,
        }
    }

    /// Stop times for `trip_id`, one per `(arrival, departure)` pair, on
    /// stops `s1`, `s2`, ...
    pub fn stop_times(trip_id: &str, times: &[(&str, &str)]) -> Vec<StopTime> {
        times
            .iter()
            .enumerate()
            .map(|(i, (arrival, departure))| StopTime {
                trip_id: trip_id.to_string(),
                arrival_time: arrival.to_string(),
                departure_time: departure.to_string(),
                stop_id: format!("s{}", i + 1),
                stop_sequence: i as u32 + 1,
            })
            .collect()
    }

    pub fn calendar(service_id: &str, days: [bool; 7]) -> Calendar {
        Calendar {
            service_id: service_id.to_string(),
            monday: days[0],
            tuesday: days[1],
            wednesday: days[2],
            thursday: days[3],
            friday: days[4],
            saturday: days[5],
            sunday: days[6],
            start_date: None,
            end_date: None,
        }
    }

    pub const WEEKDAYS: [bool; 7] = [true, true, true, true, true, false, false];
    pub const SATURDAY: [bool; 7] = [false, false, false, false, false, true, false];
    pub const SUNDAY: [bool; 7] = [false, false, false, false, false, false, true];
}
