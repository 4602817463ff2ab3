use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid GTFS time {0:?}, expected HH:MM:SS")]
    InvalidTime(String),

    #[error("Invalid weekday {0:?}, expected one of monday..sunday")]
    InvalidWeekday(String),

    #[error("Cannot compute a duration for a trip without stop times")]
    EmptyTrip,

    #[error("No such {kind} {key:?}")]
    NotFound { kind: &'static str, key: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
