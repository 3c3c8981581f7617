//! Opening trip files for reading.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::adapter::RawTripRecord;
use crate::errors::Result;

/// Opens `path` for buffered reading, gunzipping it when the name ends in `.gz`.
pub fn open_input(path: &Path) -> std::io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(path = %path.display(), gzipped, "Opening trip file");

    if gzipped {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// CSV reader over `path` with the first row taken as the header.
pub fn csv_reader(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    Ok(csv::Reader::from_reader(open_input(path)?))
}

/// Reads the header and first data row of a CSV file as a column to value map.
///
/// Returns `None` when the file has a header but no data rows.
pub fn first_record(path: impl AsRef<Path>) -> Result<Option<RawTripRecord>> {
    let mut reader = csv_reader(path.as_ref())?;
    let first = reader.deserialize::<RawTripRecord>().next().transpose()?;
    Ok(first)
}
