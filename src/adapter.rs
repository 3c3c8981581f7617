//! Schema adapter: maps one raw city trip record onto the canonical fields.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::city::City;
use crate::errors::SchemaError;

/// A raw CSV row keyed by the city's own column names.
pub type RawTripRecord = BTreeMap<String, String>;

/// Calendar position of a trip's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripTime {
    pub month: u32,
    pub hour: u32,
    pub day_of_week: &'static str,
}

/// A trip reduced to the five fields every city shares.
///
/// Field order is the condensed file's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTripRecord {
    #[serde(rename = "duration")]
    pub duration_minutes: f64,
    pub month: u32,
    pub hour: u32,
    pub day_of_week: String,
    /// `Subscriber` or `Customer` for remapped vocabularies, otherwise the
    /// city's own label.
    pub user_type: String,
}

impl CanonicalTripRecord {
    pub fn from_raw(record: &RawTripRecord, city: City) -> Result<Self, SchemaError> {
        let duration_minutes = duration_minutes(record, city)?;
        let time = time_of_trip(record, city)?;
        let user_type = type_of_user(record, city)?;

        Ok(CanonicalTripRecord {
            duration_minutes,
            month: time.month,
            hour: time.hour,
            day_of_week: time.day_of_week.to_string(),
            user_type,
        })
    }
}

fn column<'a>(record: &'a RawTripRecord, city: City, name: &str) -> Result<&'a str, SchemaError> {
    record
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| SchemaError::SchemaMismatch {
            city,
            column: name.to_string(),
            reason: "column is missing".to_string(),
        })
}

/// Trip duration in minutes, converted from the city's raw unit.
pub fn duration_minutes(record: &RawTripRecord, city: City) -> Result<f64, SchemaError> {
    let profile = city.profile();
    let raw = column(record, city, profile.duration_column)?;

    let units: u64 = raw
        .trim()
        .parse()
        .map_err(|e| SchemaError::SchemaMismatch {
            city,
            column: profile.duration_column.to_string(),
            reason: format!("'{raw}' is not a whole duration: {e}"),
        })?;

    Ok(units as f64 / profile.duration_divisor)
}

/// Month, hour and weekday name of the trip's start timestamp.
pub fn time_of_trip(record: &RawTripRecord, city: City) -> Result<TripTime, SchemaError> {
    let profile = city.profile();
    let raw = column(record, city, profile.start_column)?;

    let started = NaiveDateTime::parse_from_str(raw.trim(), profile.start_format).map_err(|source| {
        SchemaError::TimestampParse {
            city,
            value: raw.to_string(),
            format: profile.start_format,
            source,
        }
    })?;

    Ok(TripTime {
        month: started.month(),
        hour: started.hour(),
        day_of_week: weekday_name(started.weekday()),
    })
}

/// Rider type after applying the city's vocabulary.
///
/// Cities without a vocabulary keep the raw label, blank included.
pub fn type_of_user(record: &RawTripRecord, city: City) -> Result<String, SchemaError> {
    let profile = city.profile();
    let raw = column(record, city, profile.user_type_column)?;

    if profile.user_types.is_none() {
        return Ok(raw.to_string());
    }

    profile
        .canonical_user_type(raw.trim())
        .map(|user_type| user_type.as_str().to_string())
        .ok_or_else(|| SchemaError::SchemaMismatch {
            city,
            column: profile.user_type_column.to_string(),
            reason: format!("unrecognised user type '{raw}'"),
        })
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawTripRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn nyc_sample() -> RawTripRecord {
        record(&[
            ("tripduration", "839"),
            ("starttime", "1/1/2016 00:09:55"),
            ("stoptime", "1/1/2016 00:23:54"),
            ("usertype", "Customer"),
        ])
    }

    fn chicago_sample() -> RawTripRecord {
        record(&[
            ("tripduration", "926"),
            ("starttime", "3/31/2016 23:30"),
            ("stoptime", "3/31/2016 23:46"),
            ("usertype", "Subscriber"),
        ])
    }

    fn washington_sample() -> RawTripRecord {
        record(&[
            ("Duration (ms)", "427387"),
            ("Start date", "3/31/2016 22:57"),
            ("End date", "3/31/2016 23:04"),
            ("Member Type", "Registered"),
        ])
    }

    #[test]
    fn test_duration_minutes_per_city() {
        let cases = [
            (nyc_sample(), City::Nyc, 13.9833),
            (chicago_sample(), City::Chicago, 15.4333),
            (washington_sample(), City::Washington, 7.1231),
        ];

        for (raw, city, expected) in cases {
            let minutes = duration_minutes(&raw, city).unwrap();
            assert!((minutes - expected).abs() < 0.001, "{city}: {minutes}");
        }
    }

    #[test]
    fn test_time_of_trip_per_city() {
        let nyc = time_of_trip(&nyc_sample(), City::Nyc).unwrap();
        assert_eq!((nyc.month, nyc.hour, nyc.day_of_week), (1, 0, "Friday"));

        let chicago = time_of_trip(&chicago_sample(), City::Chicago).unwrap();
        assert_eq!(
            (chicago.month, chicago.hour, chicago.day_of_week),
            (3, 23, "Thursday")
        );

        let washington = time_of_trip(&washington_sample(), City::Washington).unwrap();
        assert_eq!(
            (washington.month, washington.hour, washington.day_of_week),
            (3, 22, "Thursday")
        );
    }

    #[test]
    fn test_type_of_user_per_city() {
        assert_eq!(type_of_user(&nyc_sample(), City::Nyc).unwrap(), "Customer");
        assert_eq!(
            type_of_user(&chicago_sample(), City::Chicago).unwrap(),
            "Subscriber"
        );
        assert_eq!(
            type_of_user(&washington_sample(), City::Washington).unwrap(),
            "Subscriber"
        );

        let mut casual = washington_sample();
        casual.insert("Member Type".to_string(), "Casual".to_string());
        assert_eq!(type_of_user(&casual, City::Washington).unwrap(), "Customer");
    }

    #[test]
    fn test_nyc_and_chicago_labels_pass_through() {
        let mut blank = nyc_sample();
        blank.insert("usertype".to_string(), String::new());
        assert_eq!(type_of_user(&blank, City::Nyc).unwrap(), "");

        let mut dependent = chicago_sample();
        dependent.insert("usertype".to_string(), "Dependent".to_string());
        assert_eq!(type_of_user(&dependent, City::Chicago).unwrap(), "Dependent");
    }

    #[test]
    fn test_unknown_washington_member_type_is_mismatch() {
        let mut raw = washington_sample();
        raw.insert("Member Type".to_string(), "Unknown".to_string());

        let err = type_of_user(&raw, City::Washington).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaMismatch { ref column, .. } if column == "Member Type"));
    }

    #[test]
    fn test_missing_column_is_mismatch() {
        // Washington columns read as NYC
        let err = duration_minutes(&washington_sample(), City::Nyc).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaMismatch { ref column, .. } if column == "tripduration"));
    }

    #[test]
    fn test_wrong_timestamp_format_fails() {
        // Chicago timestamps carry no seconds
        let err = time_of_trip(&chicago_sample(), City::Nyc).unwrap_err();
        assert!(matches!(err, SchemaError::TimestampParse { .. }));
    }

    #[test]
    fn test_non_integer_duration_is_mismatch() {
        let mut raw = nyc_sample();
        raw.insert("tripduration".to_string(), "83.9".to_string());
        assert!(matches!(
            duration_minutes(&raw, City::Nyc),
            Err(SchemaError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_from_raw_populates_every_field() {
        let trip = CanonicalTripRecord::from_raw(&washington_sample(), City::Washington).unwrap();
        assert!((trip.duration_minutes - 7.1231).abs() < 0.001);
        assert_eq!(trip.month, 3);
        assert_eq!(trip.hour, 22);
        assert_eq!(trip.day_of_week, "Thursday");
        assert_eq!(trip.user_type, "Subscriber");
    }
}
