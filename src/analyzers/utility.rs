use chrono::Weekday;

use crate::errors::{AnalysisError, Result};

/// Rush hours are 07:00-09:59 and 17:00-20:59, inclusive hour bounds.
pub fn is_rush_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (17..=20).contains(&hour)
}

/// True for Monday through Friday. Unrecognised names count as weekend.
pub fn is_weekday(day_of_week: &str) -> bool {
    day_of_week
        .trim()
        .parse::<Weekday>()
        .map(|day| day.num_days_from_monday() < 5)
        .unwrap_or(false)
}

/// Rounds to `places` decimal places, ties to even.
///
/// Works on the exact decimal expansion of `value`, so `10.25` (exact in
/// binary) becomes `10.2` while `10.35` (stored just below) becomes `10.3`.
pub fn round_to(value: f64, places: usize) -> f64 {
    // precision formatting rounds the exact value half to even
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Arithmetic mean of a running total. An empty bucket is an error.
pub fn checked_mean(sum: f64, count: u64, statistic: &'static str, bucket: &str) -> Result<f64> {
    if count == 0 {
        return Err(AnalysisError::degenerate(statistic, bucket));
    }
    Ok(sum / count as f64)
}

/// `part` as a percentage of `total`. An empty bucket is an error.
pub fn checked_pct(part: u64, total: u64, statistic: &'static str, bucket: &str) -> Result<f64> {
    if total == 0 {
        return Err(AnalysisError::degenerate(statistic, bucket));
    }
    Ok((part as f64 / total as f64) * 100.0)
}
