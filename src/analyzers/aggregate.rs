use std::path::Path;

use tracing::debug;

use crate::analyzers::types::{
    CondensedRow, DayPeriod, DurationStats, RushHourBreakdown, RushHourCounts, UserCounts,
    UserTypeDurations,
};
use crate::analyzers::utility::{checked_mean, checked_pct, is_rush_hour, is_weekday, round_to};
use crate::city::UserType;
use crate::errors::Result;
use crate::input::csv_reader;

/// Trips longer than this many minutes count as long rides.
const LONG_TRIP_MINUTES: f64 = 30.0;

/// Streams every row of a condensed file through `visit`.
fn scan(path: &Path, mut visit: impl FnMut(CondensedRow)) -> Result<u64> {
    let mut reader = csv_reader(path)?;
    let mut rows = 0;

    for result in reader.deserialize::<CondensedRow>() {
        visit(result?);
        rows += 1;
    }

    debug!(path = %path.display(), rows, "Scanned condensed file");
    Ok(rows)
}

/// Counts subscriber, customer and total trips.
///
/// Any label other than exactly `Subscriber` is counted as a customer.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn count_by_user_type(path: impl AsRef<Path>) -> Result<UserCounts> {
    let mut subscribers = 0;
    let mut customers = 0;

    scan(path.as_ref(), |row| {
        if row.is(UserType::Subscriber) {
            subscribers += 1;
        } else {
            customers += 1;
        }
    })?;

    Ok(UserCounts {
        subscribers,
        customers,
        total: subscribers + customers,
    })
}

/// Average trip duration over all rows and the percentage of trips over 30 minutes.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn duration_stats(path: impl AsRef<Path>) -> Result<DurationStats> {
    let mut total_minutes = 0.0;
    let mut long_trips = 0;

    let trips = scan(path.as_ref(), |row| {
        total_minutes += row.duration;
        if row.duration > LONG_TRIP_MINUTES {
            long_trips += 1;
        }
    })?;

    let average = checked_mean(total_minutes, trips, "duration_stats", "all trips")?;
    let over_30 = checked_pct(long_trips, trips, "duration_stats", "all trips")?;

    Ok(DurationStats {
        average_minutes: round_to(average, 1),
        percent_over_30: round_to(over_30, 1),
    })
}

/// Average duration for subscribers and for customers.
///
/// Only rows labelled exactly `Subscriber` or `Customer` contribute; rows
/// with any other label are left out of both averages.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn duration_by_user_type(path: impl AsRef<Path>) -> Result<UserTypeDurations> {
    let (mut sub_minutes, mut sub_trips) = (0.0, 0);
    let (mut cus_minutes, mut cus_trips) = (0.0, 0);

    scan(path.as_ref(), |row| {
        if row.is(UserType::Subscriber) {
            sub_minutes += row.duration;
            sub_trips += 1;
        } else if row.is(UserType::Customer) {
            cus_minutes += row.duration;
            cus_trips += 1;
        }
    })?;

    let subscriber = checked_mean(sub_minutes, sub_trips, "duration_by_user_type", "Subscriber")?;
    let customer = checked_mean(cus_minutes, cus_trips, "duration_by_user_type", "Customer")?;

    Ok(UserTypeDurations {
        subscriber_minutes: round_to(subscriber, 1),
        customer_minutes: round_to(customer, 1),
    })
}

/// Tallies rush-hour and total trips per rider type and weekday/weekend.
///
/// Rows with labels other than `Subscriber` or `Customer` are skipped.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn rush_hour_counts(path: impl AsRef<Path>) -> Result<RushHourCounts> {
    let mut counts = RushHourCounts::default();

    scan(path.as_ref(), |row| {
        let user_type = if row.is(UserType::Subscriber) {
            UserType::Subscriber
        } else if row.is(UserType::Customer) {
            UserType::Customer
        } else {
            return;
        };
        let period = if is_weekday(&row.day_of_week) {
            DayPeriod::Weekday
        } else {
            DayPeriod::Weekend
        };

        counts
            .bucket_mut(user_type, period)
            .record(is_rush_hour(row.hour));
    })?;

    Ok(counts)
}

/// Rush-hour share of trips for each rider type on weekdays and weekends.
///
/// Fails with a degenerate-aggregate error if any of the four buckets is empty.
pub fn rush_hour_breakdown(path: impl AsRef<Path>) -> Result<RushHourBreakdown> {
    rush_hour_counts(path)?.breakdown()
}
