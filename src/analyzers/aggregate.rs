use std::collections::{BTreeMap, HashSet};

use chrono::Weekday;
use itertools::Itertools;
use tracing::debug;

use crate::analyzers::cache::{Operation, QueryCache, QueryKey};
use crate::analyzers::calendar::{DayType, service_ids_for_day};
use crate::analyzers::duration::{first_departure, inter_stop_times, total_trip_time};
use crate::analyzers::types::{BusiestRoute, DayAverage, Distribution};
use crate::analyzers::utility::{mean, quantile, stddev};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::gtfs::Trip;

/// How trips are picked within each service when sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplePolicy {
    /// The last N trips in trip-table order. Table order is not time order,
    /// so this samples whatever the feed happens to list last.
    #[default]
    TableOrder,
    /// The N trips with the latest first departure.
    LatestDeparture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub per_service: usize,
    pub policy: SamplePolicy,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            per_service: 5,
            policy: SamplePolicy::TableOrder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TripTime,
    InterStopTime,
}

/// Trips with `headsign` sampled per service active on `day`.
///
/// Services are visited in ascending id order so repeated runs produce the
/// same sequence.
pub fn sampled_trips<'a>(
    data: &'a Dataset,
    headsign: &str,
    day: Weekday,
    sampling: Sampling,
) -> Result<Vec<&'a Trip>> {
    let services = service_ids_for_day(data, day).into_iter().sorted_unstable();

    let mut sampled = Vec::new();
    for service_id in services {
        let matching: Vec<&Trip> = data
            .trips()
            .iter()
            .filter(|t| t.service_id == service_id && t.trip_headsign == headsign)
            .collect();

        let ordered = match sampling.policy {
            SamplePolicy::TableOrder => matching,
            SamplePolicy::LatestDeparture => {
                let mut keyed = matching
                    .into_iter()
                    .map(|t| -> Result<_> { Ok((first_departure(data.stop_times(&t.trip_id))?, t)) })
                    .collect::<Result<Vec<_>>>()?;
                keyed.sort_by_key(|(departure, _)| departure.service_seconds());
                keyed.into_iter().map(|(_, t)| t).collect()
            }
        };

        let skip = ordered.len().saturating_sub(sampling.per_service);
        debug!(
            service_id,
            available = ordered.len(),
            sampled = ordered.len() - skip,
            "Sampled trips"
        );
        sampled.extend(ordered.into_iter().skip(skip));
    }

    Ok(sampled)
}

/// Total trip time of each sampled trip, concatenated across services.
pub fn average_trip_time(
    data: &Dataset,
    headsign: &str,
    day: Weekday,
    sampling: Sampling,
) -> Result<Vec<f64>> {
    sampled_trips(data, headsign, day, sampling)?
        .into_iter()
        .map(|t| total_trip_time(data.stop_times(&t.trip_id)))
        .collect()
}

/// Inter-stop times of every sampled trip, flattened.
pub fn average_inter_stop_time(
    data: &Dataset,
    headsign: &str,
    day: Weekday,
    sampling: Sampling,
) -> Result<Vec<f64>> {
    let mut durations = Vec::new();
    for t in sampled_trips(data, headsign, day, sampling)? {
        durations.extend(inter_stop_times(data.stop_times(&t.trip_id))?);
    }
    Ok(durations)
}

/// The first `n` routes met when walking stop-sequence positions from the
/// deepest down, each with the position it was first seen at.
///
/// Within a position trips are visited by ascending trip id.
pub fn busiest_stops(data: &Dataset, n: usize) -> Result<Vec<BusiestRoute>> {
    let mut by_position: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for (trip_id, stop_times) in data.stop_times_by_trip() {
        for st in stop_times {
            by_position.entry(st.stop_sequence).or_default().push(trip_id);
        }
    }

    let mut seen = HashSet::new();
    let mut busiest = Vec::with_capacity(n);

    'positions: for (&position, trip_ids) in by_position.iter_mut().rev() {
        trip_ids.sort_unstable();
        trip_ids.dedup();

        for trip_id in trip_ids.iter() {
            if busiest.len() >= n {
                break 'positions;
            }
            let trip = data.trip(trip_id)?;
            if seen.insert(trip.route_id.as_str()) {
                let route = data.route(&trip.route_id)?;
                busiest.push(BusiestRoute {
                    route_id: route.route_id.clone(),
                    short_name: route.route_short_name.clone(),
                    stop_count: position,
                });
            }
        }
    }

    Ok(busiest)
}

/// Trip time of every trip of a route heading towards `headsign`.
pub fn trip_time_distribution(data: &Dataset, short_name: &str, headsign: &str) -> Result<Vec<f64>> {
    let route = data.route_by_short_name(short_name)?;
    data.trips()
        .iter()
        .filter(|t| t.route_id == route.route_id && t.trip_headsign == headsign)
        .map(|t| total_trip_time(data.stop_times(&t.trip_id)))
        .collect()
}

/// Full trip times of every trip on `day`, keyed by the wall-clock hour the
/// trip leaves its first stop.
pub fn hourly_trip_times(
    data: &Dataset,
    headsign: &str,
    day: Weekday,
) -> Result<BTreeMap<u32, Vec<f64>>> {
    let services = service_ids_for_day(data, day);
    let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

    for t in data
        .trips()
        .iter()
        .filter(|t| t.trip_headsign == headsign && services.contains(t.service_id.as_str()))
    {
        let stop_times = data.stop_times(&t.trip_id);
        let hour = first_departure(stop_times)?.hour();
        by_hour.entry(hour).or_default().push(total_trip_time(stop_times)?);
    }

    Ok(by_hour)
}

/// Distinct headsigns of a route, in the order trips list them.
pub fn headings<'a>(data: &'a Dataset, short_name: &str) -> Result<Vec<&'a str>> {
    let route = data.route_by_short_name(short_name)?;
    Ok(data
        .trips()
        .iter()
        .filter(|t| t.route_id == route.route_id)
        .map(|t| t.trip_headsign.as_str())
        .unique()
        .collect())
}

pub fn route_short_names(data: &Dataset) -> Vec<&str> {
    data.routes()
        .iter()
        .map(|r| r.route_short_name.as_str())
        .collect()
}

pub fn distribution(values: &[f64]) -> Option<Distribution> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(Distribution {
        count: sorted.len(),
        min: *sorted.first()?,
        q1: quantile(&sorted, 0.25)?,
        median: quantile(&sorted, 0.5)?,
        q3: quantile(&sorted, 0.75)?,
        max: *sorted.last()?,
        mean: mean(&sorted)?,
    })
}

/// Query front end over a [`Dataset`] that memoizes the sampled aggregates.
#[derive(Debug)]
pub struct Analytics<'a> {
    data: &'a Dataset,
    cache: QueryCache,
}

impl<'a> Analytics<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Self {
            data,
            cache: QueryCache::new(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.data
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    #[tracing::instrument(skip(self))]
    pub fn average_trip_time(&self, headsign: &str, day: Weekday, sampling: Sampling) -> Result<Vec<f64>> {
        let key = Self::key(Operation::TripTime, headsign, day, sampling);
        self.cache
            .get_or_try_insert_with(key, || average_trip_time(self.data, headsign, day, sampling))
    }

    #[tracing::instrument(skip(self))]
    pub fn average_inter_stop_time(
        &self,
        headsign: &str,
        day: Weekday,
        sampling: Sampling,
    ) -> Result<Vec<f64>> {
        let key = Self::key(Operation::InterStopTime, headsign, day, sampling);
        self.cache.get_or_try_insert_with(key, || {
            average_inter_stop_time(self.data, headsign, day, sampling)
        })
    }

    /// Mean of `metric` for weekdays, Saturdays and Sundays.
    pub fn weekly_averages(
        &self,
        headsign: &str,
        metric: Metric,
        sampling: Sampling,
    ) -> Result<Vec<DayAverage>> {
        DayType::ALL
            .into_iter()
            .map(|day| -> Result<DayAverage> {
                let weekday = day.representative();
                let values = match metric {
                    Metric::TripTime => self.average_trip_time(headsign, weekday, sampling)?,
                    Metric::InterStopTime => self.average_inter_stop_time(headsign, weekday, sampling)?,
                };
                let avg = mean(&values);
                Ok(DayAverage {
                    day,
                    samples: values.len(),
                    mean: avg,
                    stddev: avg.map(|m| stddev(&values, m)),
                })
            })
            .collect()
    }

    pub fn busiest_stops(&self, n: usize) -> Result<Vec<BusiestRoute>> {
        busiest_stops(self.data, n)
    }

    fn key(operation: Operation, headsign: &str, day: Weekday, sampling: Sampling) -> QueryKey {
        QueryKey {
            operation,
            headsign: headsign.to_string(),
            day,
            per_service: sampling.per_service,
            policy: sampling.policy,
        }
    }
}
