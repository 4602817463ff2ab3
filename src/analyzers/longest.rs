//! Lookups into the precomputed longest-trip and hourly-average tables.

use tracing::debug;

use crate::analyzers::duration::inter_stop_times;
use crate::analyzers::types::{GeometryStop, HourlyPoint, LatLon, RouteGeometry, RouteStats};
use crate::analyzers::utility::{mean, round2};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::gtfs::{LongestTrip, StopTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    TripTime,
    StopCount,
}

/// The longest-trip row for a route label and heading.
pub fn longest_trip<'a>(data: &'a Dataset, route: &str, heading: &str) -> Result<&'a LongestTrip> {
    data.longest_trips()
        .iter()
        .find(|row| row.route_id == route && row.heading == heading)
        .ok_or_else(|| Error::not_found("longest trip", format!("{route} / {heading}")))
}

/// Stop count and duration of the longest trip, plus the average gap
/// between its stops rounded to two decimals. A single-stop trip has no
/// average gap.
pub fn route_stats(data: &Dataset, route: &str, heading: &str) -> Result<RouteStats> {
    let longest = longest_trip(data, route, heading)?;
    let gaps = inter_stop_times(served_stops(data, &longest.longest_trip_id)?)?;

    Ok(RouteStats {
        total_stops: longest.stop_count,
        total_time: longest.trip_time,
        avg_time_between_stops: mean(&gaps).map(round2),
    })
}

/// The `n` highest and `n` lowest rows by `rank`, highest first. A row that
/// would appear in both halves is listed once.
pub fn extremes(data: &Dataset, n: usize, rank: RankBy) -> Vec<&LongestTrip> {
    let mut rows: Vec<&LongestTrip> = data.longest_trips().iter().collect();
    match rank {
        RankBy::TripTime => rows.sort_by(|a, b| b.trip_time.total_cmp(&a.trip_time)),
        RankBy::StopCount => rows.sort_by(|a, b| b.stop_count.cmp(&a.stop_count)),
    }

    if rows.len() <= n * 2 {
        return rows;
    }
    let bottom = rows.split_off(rows.len() - n);
    rows.truncate(n);
    rows.extend(bottom);
    rows
}

/// Shape and stops of the longest trip for a route label and heading.
#[tracing::instrument(skip(data))]
pub fn route_geometry(data: &Dataset, route: &str, heading: &str) -> Result<RouteGeometry> {
    let longest = longest_trip(data, route, heading)?;
    let trip = data.trip(&longest.longest_trip_id)?;

    let shape = match &trip.shape_id {
        Some(shape_id) => data
            .shape(shape_id)?
            .iter()
            .map(|pt| LatLon {
                lat: pt.shape_pt_lat,
                lon: pt.shape_pt_lon,
            })
            .collect(),
        None => Vec::new(),
    };

    let stops = served_stops(data, &trip.trip_id)?
        .iter()
        .map(|st| -> Result<GeometryStop> {
            let stop = data.stop(&st.stop_id)?;
            Ok(GeometryStop {
                stop_id: stop.stop_id.clone(),
                name: stop.stop_name.clone(),
                position: LatLon {
                    lat: stop.stop_lat,
                    lon: stop.stop_lon,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(trip_id = %trip.trip_id, shape_points = shape.len(), stops = stops.len(), "Route geometry");
    Ok(RouteGeometry {
        trip_id: trip.trip_id.clone(),
        shape,
        stops,
    })
}

/// Stop times of a trip the precomputed tables point at. A row naming a
/// trip without stop times is an [`Error::EmptyTrip`].
fn served_stops<'a>(data: &'a Dataset, trip_id: &str) -> Result<&'a [StopTime]> {
    match data.stop_times(trip_id) {
        [] => Err(Error::EmptyTrip),
        stop_times => Ok(stop_times),
    }
}

/// Hourly average trip times for a heading, hours past midnight folded into
/// 0..=23 and Monday service labelled as weekday service.
pub fn hourly_averages(data: &Dataset, heading: &str) -> Vec<HourlyPoint> {
    data.hourly_averages()
        .iter()
        .filter(|row| row.heading == heading)
        .map(|row| HourlyPoint {
            day: row.day.replace("monday", "weekday"),
            hour: if row.hour > 23 { row.hour - 24 } else { row.hour },
            avg_trip_time: row.avg_trip_time,
        })
        .collect()
}
