//! City identifiers and the per-city export layouts.
//!
//! Each bike-share system publishes its trips with its own column names,
//! timestamp format, duration unit and rider vocabulary. A [`CityProfile`]
//! captures one layout so the schema adapter can be written once.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Canonical rider category shared by every city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Subscriber,
    Customer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Subscriber => "Subscriber",
            UserType::Customer => "Customer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column layout and units of one city's raw trip export.
#[derive(Debug)]
pub struct CityProfile {
    pub duration_column: &'static str,
    /// Raw duration units per minute.
    pub duration_divisor: f64,
    pub start_column: &'static str,
    pub start_format: &'static str,
    pub user_type_column: &'static str,
    /// Raw rider labels and the canonical type each one maps to. `None`
    /// keeps the raw label as written.
    pub user_types: Option<&'static [(&'static str, UserType)]>,
}

impl CityProfile {
    pub fn canonical_user_type(&self, raw: &str) -> Option<UserType> {
        self.user_types?
            .iter()
            .find(|(label, _)| *label == raw)
            .map(|(_, user_type)| *user_type)
    }
}

static NYC_PROFILE: CityProfile = CityProfile {
    duration_column: "tripduration",
    duration_divisor: 60.0,
    start_column: "starttime",
    start_format: "%m/%d/%Y %H:%M:%S",
    user_type_column: "usertype",
    user_types: None,
};

static CHICAGO_PROFILE: CityProfile = CityProfile {
    duration_column: "tripduration",
    duration_divisor: 60.0,
    start_column: "starttime",
    start_format: "%m/%d/%Y %H:%M",
    user_type_column: "usertype",
    user_types: None,
};

static WASHINGTON_PROFILE: CityProfile = CityProfile {
    duration_column: "Duration (ms)",
    duration_divisor: 60_000.0,
    start_column: "Start date",
    start_format: "%m/%d/%Y %H:%M",
    user_type_column: "Member Type",
    user_types: Some(&[
        ("Registered", UserType::Subscriber),
        ("Casual", UserType::Customer),
    ]),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "NYC")]
    Nyc,
    Chicago,
    Washington,
}

impl City {
    pub const ALL: [City; 3] = [City::Nyc, City::Chicago, City::Washington];

    pub fn profile(&self) -> &'static CityProfile {
        match self {
            City::Nyc => &NYC_PROFILE,
            City::Chicago => &CHICAGO_PROFILE,
            City::Washington => &WASHINGTON_PROFILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Nyc => "NYC",
            City::Chicago => "Chicago",
            City::Washington => "Washington",
        }
    }

    /// Infers the city from a data file name such as `NYC-CitiBike-2016.csv`,
    /// using the text before the first `-`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AnalysisError::UnknownCity(path.display().to_string()))?;
        let prefix = name.split('-').next().unwrap_or(name);
        prefix.parse()
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for City {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .into_iter()
            .find(|city| city.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalysisError::UnknownCity(s.to_string()))
    }
}
