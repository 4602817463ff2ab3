//! Records produced by the analyzers, ready to serialize for a renderer.

use serde::Serialize;

use crate::analyzers::calendar::DayType;

/// A route and the deepest stop-sequence position any of its trips reaches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusiestRoute {
    pub route_id: String,
    pub short_name: String,
    pub stop_count: u32,
}

/// Average of a sampled metric for one day type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAverage {
    pub day: DayType,
    pub samples: usize,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
}

/// Box plot input for a set of trip durations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

/// Headline figures for a route and heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStats {
    pub total_stops: u32,
    pub total_time: f64,
    pub avg_time_between_stops: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryStop {
    pub stop_id: String,
    pub name: String,
    pub position: LatLon,
}

/// What a map needs to draw one route and heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGeometry {
    pub trip_id: String,
    pub shape: Vec<LatLon>,
    pub stops: Vec<GeometryStop>,
}

/// Average trip time per hour of day, one line per day type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub day: String,
    pub hour: u32,
    pub avg_trip_time: f64,
}

/// A dashboard headline metric with its December-over-December change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: Option<f64>,
    pub delta_pct: Option<f64>,
}
