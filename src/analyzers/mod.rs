//! Schedule analytics over a loaded [`Dataset`](crate::dataset::Dataset).
//!
//! Trip durations are derived from stop times, grouped by the services that
//! run on a weekday, and summarised for the dashboard views. The
//! precomputed longest-trip and monthly tables are looked up as-is.

pub mod aggregate;
pub mod cache;
pub mod calendar;
pub mod duration;
pub mod kpi;
pub mod longest;
pub mod types;
pub mod utility;
