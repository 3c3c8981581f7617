//! Record normalizer: rewrites a raw city export as a condensed trip file.

use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::Path;

use csv::WriterBuilder;
use tracing::{debug, info, warn};

use crate::adapter::{CanonicalTripRecord, RawTripRecord};
use crate::city::City;
use crate::errors::{AnalysisError, Result};
use crate::input::csv_reader;

/// Column order of every condensed file.
pub const CONDENSED_HEADER: [&str; 5] = ["duration", "month", "hour", "day_of_week", "user_type"];

/// Normalizes every row of `input` into `output`, in input order.
///
/// The first row that cannot be adapted aborts the run and the partial
/// output file is removed. An unreadable input leaves `output` untouched.
/// Returns the number of trips written.
#[tracing::instrument(skip_all, fields(city = %city, input = %input.display(), output = %output.display()))]
pub fn condense_data(input: &Path, output: &Path, city: City) -> Result<usize> {
    let reader = csv_reader(input)?;
    let file = File::create(output)?;

    match write_condensed(reader, file, city) {
        Ok(rows) => {
            info!(rows, "Condensed trip file written");
            Ok(rows)
        }
        Err(e) => {
            warn!(error = %e, "Normalization failed, removing partial output");
            let _ = fs::remove_file(output);
            Err(e)
        }
    }
}

fn write_condensed(mut reader: csv::Reader<Box<dyn Read>>, file: File, city: City) -> Result<usize> {
    // header is written explicitly so an empty input still yields one
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer.write_record(CONDENSED_HEADER)?;

    let mut rows = 0;
    for (index, result) in reader.deserialize::<RawTripRecord>().enumerate() {
        let raw = result?;
        let trip = CanonicalTripRecord::from_raw(&raw, city).map_err(|source| {
            AnalysisError::Normalization {
                row: index + 1,
                source,
            }
        })?;
        writer.serialize(&trip)?;
        rows += 1;
    }

    writer.flush()?;
    debug!(rows, "Flushed condensed rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaError;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("bikeshare_eda_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_condense_writes_header_and_rows_in_order() {
        let input = temp_path("condense_in.csv");
        let output = temp_path("condense_out.csv");
        fs::write(
            &input,
            "Duration (ms),Start date,End date,Member Type\n\
             427387,3/31/2016 22:57,3/31/2016 23:04,Registered\n\
             1200000,4/2/2016 9:15,4/2/2016 9:35,Casual\n",
        )
        .unwrap();

        let rows = condense_data(&input, &output, City::Washington).unwrap();
        assert_eq!(rows, 2);

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "duration,month,hour,day_of_week,user_type");
        assert!(lines[1].ends_with(",3,22,Thursday,Subscriber"));
        assert_eq!(lines[2], "20.0,4,9,Saturday,Customer");
        assert_eq!(lines.len(), 3);

        fs::remove_file(&input).unwrap();
        fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_condense_empty_input_keeps_header() {
        let input = temp_path("condense_empty_in.csv");
        let output = temp_path("condense_empty_out.csv");
        fs::write(&input, "tripduration,starttime,usertype\n").unwrap();

        assert_eq!(condense_data(&input, &output, City::Nyc).unwrap(), 0);
        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content.trim_end(), "duration,month,hour,day_of_week,user_type");

        fs::remove_file(&input).unwrap();
        fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_bad_row_aborts_whole_file() {
        let input = temp_path("condense_bad_in.csv");
        let output = temp_path("condense_bad_out.csv");
        fs::write(
            &input,
            "tripduration,starttime,usertype\n\
             839,1/1/2016 00:09:55,Customer\n\
             686,1/1/2016 00:21,Subscriber\n",
        )
        .unwrap();

        let err = condense_data(&input, &output, City::Nyc).unwrap_err();
        match err {
            AnalysisError::Normalization { row, source } => {
                assert_eq!(row, 2);
                assert!(matches!(source, SchemaError::TimestampParse { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists());

        fs::remove_file(&input).unwrap();
    }

    #[test]
    fn test_missing_input_keeps_existing_output() {
        let input = temp_path("condense_missing_in.csv");
        let output = temp_path("condense_existing_out.csv");
        let _ = fs::remove_file(&input);
        fs::write(
            &output,
            "duration,month,hour,day_of_week,user_type\n7.0,1,17,Monday,Subscriber\n",
        )
        .unwrap();

        let err = condense_data(&input, &output, City::Nyc).unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));
        assert!(output.exists());
        assert!(fs::read_to_string(&output).unwrap().contains("7.0,1,17,Monday,Subscriber"));

        fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_nyc_blank_user_type_is_kept() {
        let input = temp_path("condense_blank_in.csv");
        let output = temp_path("condense_blank_out.csv");
        fs::write(
            &input,
            "tripduration,starttime,usertype\n\
             839,1/1/2016 00:09:55,Customer\n\
             686,1/1/2016 00:21:17,\n",
        )
        .unwrap();

        assert_eq!(condense_data(&input, &output, City::Nyc).unwrap(), 2);
        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert!(lines[2].ends_with(",1,0,Friday,"));

        fs::remove_file(&input).unwrap();
        fs::remove_file(&output).unwrap();
    }
}
