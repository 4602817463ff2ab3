//! CSV reader for GTFS tables and the derived dashboard summaries.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Deserializes every row of a CSV table from `reader`.
///
/// A leading UTF-8 byte order mark is dropped by the csv reader and
/// whitespace around fields is trimmed.
///
/// # Errors
///
/// Returns [`Error::Csv`] tagged with `origin` on the first malformed row.
pub fn parse_table<T: DeserializeOwned, R: Read>(reader: R, origin: &str) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    rdr.deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|source| Error::Csv {
            path: origin.to_string(),
            source,
        })
}

/// Reads a table from disk, decompressing it first if the name ends in `.gz`.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|source| Error::Io {
        path: origin.clone(),
        source,
    })?;
    let reader = BufReader::new(file);

    let rows = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        parse_table(GzDecoder::new(reader), &origin)?
    } else {
        parse_table(reader, &origin)?
    };

    debug!(path = %origin, rows = rows.len(), "Table read");
    Ok(rows)
}
