//! Report text and chart specifications for the computed statistics.
//!
//! Nothing here draws; charts are described as numeric series plus labels
//! and serialized to JSON for whatever renderer consumes them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::analyzers::types::{
    CondensedRow, DurationStats, RushHourBreakdown, UserCounts, UserTypeDurations,
};
use crate::city::{City, UserType};
use crate::errors::{AnalysisError, Result};
use crate::input::csv_reader;

/// Durations at or above this many minutes are left out of per-rider histograms.
pub const DEFAULT_HISTOGRAM_CUTOFF: f64 = 75.0;

const DURATION_TITLE: &str = "Distribution of Trip Durations";
const DURATION_LABEL: &str = "Duration (m)";

/// Values to be drawn as a histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub x_label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl Histogram {
    /// Splits the values into `bins` equal-width bins spanning min to max.
    ///
    /// The last bin is closed on the right. When every value is equal the
    /// bins span one unit centred on that value.
    pub fn bin_counts(&self, bins: usize) -> Vec<HistogramBin> {
        if bins == 0 || self.values.is_empty() {
            return Vec::new();
        }

        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (low, high) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let width = (high - low) / bins as f64;

        let mut counts = vec![0usize; bins];
        for value in &self.values {
            let index = ((value - low) / width) as usize;
            counts[index.min(bins - 1)] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: low + width * i as f64,
                upper: low + width * (i + 1) as f64,
                count,
            })
            .collect()
    }
}

/// Categories with one bar per series in each, as drawn by a grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: BTreeMap<String, Vec<f64>>,
}

fn duration_series(path: &Path, keep: impl Fn(&CondensedRow) -> bool) -> Result<Vec<f64>> {
    let mut reader = csv_reader(path)?;
    let mut values = Vec::new();

    for result in reader.deserialize::<CondensedRow>() {
        let row = result?;
        if keep(&row) {
            values.push(row.duration);
        }
    }

    debug!(path = %path.display(), values = values.len(), "Collected duration series");
    Ok(values)
}

/// Histogram over every trip duration in a condensed file.
pub fn duration_histogram(path: impl AsRef<Path>) -> Result<Histogram> {
    Ok(Histogram {
        title: DURATION_TITLE.to_string(),
        x_label: DURATION_LABEL.to_string(),
        values: duration_series(path.as_ref(), |_| true)?,
    })
}

/// Subscriber and customer histograms, keeping durations strictly below `max_minutes`.
pub fn duration_histograms_by_user_type(
    path: impl AsRef<Path>,
    max_minutes: f64,
) -> Result<[Histogram; 2]> {
    let path = path.as_ref();
    let histogram = |user_type: UserType| -> Result<Histogram> {
        Ok(Histogram {
            title: format!("{DURATION_TITLE} for {user_type}s"),
            x_label: DURATION_LABEL.to_string(),
            values: duration_series(path, |row| {
                row.is(user_type) && row.duration < max_minutes
            })?,
        })
    };

    Ok([
        histogram(UserType::Subscriber)?,
        histogram(UserType::Customer)?,
    ])
}

/// Weekday against weekend rush-hour shares, grouped by rider type.
pub fn rush_hour_chart(city: City, breakdown: &RushHourBreakdown) -> GroupedBarChart {
    let mut series = BTreeMap::new();
    series.insert(
        "% of rush hours trips on weekdays".to_string(),
        vec![breakdown.subscriber_weekday, breakdown.customer_weekday],
    );
    series.insert(
        "% of rush hours trips on weekends".to_string(),
        vec![breakdown.subscriber_weekend, breakdown.customer_weekend],
    );

    GroupedBarChart {
        title: format!("{city} Rush Hour Usage Weekday vs Weekends"),
        x_label: "User Type".to_string(),
        y_label: "% of trips in rush hours".to_string(),
        categories: vec!["Subscribers".to_string(), "Customers".to_string()],
        series,
    }
}

pub fn describe_counts(city: City, counts: &UserCounts) -> Result<String> {
    Ok(format!(
        "{city} has {} trips: {} by subscribers ({:.1} %) and {} by customers ({:.1} %)",
        counts.total,
        counts.subscribers,
        counts.subscriber_pct()?,
        counts.customers,
        counts.customer_pct()?,
    ))
}

pub fn describe_durations(city: City, stats: &DurationStats) -> String {
    format!(
        "{city} has an average trip duration of {} minutes with {} % of rides over 30 minutes",
        stats.average_minutes, stats.percent_over_30
    )
}

pub fn describe_user_durations(city: City, durations: &UserTypeDurations) -> String {
    format!(
        "{city} : Subscribers have an average trip duration of {} minutes, \
         Customers have an average trip duration of {} minutes",
        durations.subscriber_minutes, durations.customer_minutes
    )
}

pub fn describe_rush_hours(breakdown: &RushHourBreakdown) -> String {
    format!(
        "For subscribers, {}% of weekday trips and {}% of weekend trips were during rush hours respectively\n\
         For customers, {}% of weekday trips and {}% of weekend trips were during rush hours respectively",
        breakdown.subscriber_weekday,
        breakdown.subscriber_weekend,
        breakdown.customer_weekday,
        breakdown.customer_weekend
    )
}

/// One city's trip total and rider shares, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityShare {
    pub city: City,
    pub total: u64,
    pub subscriber_pct: f64,
    pub customer_pct: f64,
}

/// Which city leads on trip volume and on each rider share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityComparison {
    pub most_trips: City,
    pub highest_subscriber_share: City,
    pub highest_customer_share: City,
    pub cities: Vec<CityShare>,
}

/// Compares per-city trip counts. On ties the earlier city wins.
pub fn compare_cities(counts: &[(City, UserCounts)]) -> Result<CityComparison> {
    let cities = counts
        .iter()
        .map(|(city, c)| -> Result<CityShare> {
            Ok(CityShare {
                city: *city,
                total: c.total,
                subscriber_pct: c.subscriber_pct()?,
                customer_pct: c.customer_pct()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let leader = |key: fn(&CityShare) -> f64| -> Result<City> {
        cities
            .iter()
            .reduce(|best, share| if key(share) > key(best) { share } else { best })
            .map(|share| share.city)
            .ok_or_else(|| AnalysisError::degenerate("compare_cities", "no cities"))
    };

    let most_trips = leader(|s| s.total as f64)?;
    let highest_subscriber_share = leader(|s| s.subscriber_pct)?;
    let highest_customer_share = leader(|s| s.customer_pct)?;

    Ok(CityComparison {
        most_trips,
        highest_subscriber_share,
        highest_customer_share,
        cities,
    })
}

pub fn describe_comparison(comparison: &CityComparison) -> String {
    format!(
        "City with most trips: {}\n\
         City with highest proportion of subscribers: {}\n\
         City with highest proportion of customers: {}",
        comparison.most_trips,
        comparison.highest_subscriber_share,
        comparison.highest_customer_share
    )
}

/// Serializes a chart or statistic as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
