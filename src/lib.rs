pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod error;
pub mod gtfs;
pub mod output;
pub mod parser;
pub mod stats;
pub mod time;

pub use dataset::Dataset;
pub use error::{Error, Result};
