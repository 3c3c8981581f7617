//! Data types used by the aggregation pipeline.

use serde::{Deserialize, Serialize};

use crate::city::UserType;
use crate::errors::Result;

use super::utility::{checked_pct, round_to};

/// A single row deserialized from a condensed trip file.
///
/// `user_type` stays a plain string so files with labels other than the two
/// canonical ones can still be scanned.
#[derive(Debug, Deserialize)]
pub struct CondensedRow {
    pub(crate) duration: f64,
    pub(crate) hour: u32,
    pub(crate) day_of_week: String,
    pub(crate) user_type: String,
}

impl CondensedRow {
    pub(crate) fn is(&self, user_type: UserType) -> bool {
        self.user_type == user_type.as_str()
    }
}

/// Trip tallies by rider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    pub subscribers: u64,
    pub customers: u64,
    pub total: u64,
}

impl UserCounts {
    pub fn subscriber_pct(&self) -> Result<f64> {
        checked_pct(self.subscribers, self.total, "subscriber proportion", "all trips")
    }

    pub fn customer_pct(&self) -> Result<f64> {
        checked_pct(self.customers, self.total, "customer proportion", "all trips")
    }
}

/// Average duration and share of long rides, both rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationStats {
    pub average_minutes: f64,
    pub percent_over_30: f64,
}

/// Average duration per rider type, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserTypeDurations {
    pub subscriber_minutes: f64,
    pub customer_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    Weekday,
    Weekend,
}

impl DayPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Weekday => "weekday",
            DayPeriod::Weekend => "weekend",
        }
    }
}

/// Rush-hour and total trips falling in one rider/period bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub rush: u64,
    pub total: u64,
}

impl BucketCount {
    pub(crate) fn record(&mut self, rush: bool) {
        self.total += 1;
        if rush {
            self.rush += 1;
        }
    }
}

/// Raw tallies behind [`RushHourBreakdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RushHourCounts {
    pub subscriber_weekday: BucketCount,
    pub subscriber_weekend: BucketCount,
    pub customer_weekday: BucketCount,
    pub customer_weekend: BucketCount,
}

impl RushHourCounts {
    pub fn bucket(&self, user_type: UserType, period: DayPeriod) -> &BucketCount {
        match (user_type, period) {
            (UserType::Subscriber, DayPeriod::Weekday) => &self.subscriber_weekday,
            (UserType::Subscriber, DayPeriod::Weekend) => &self.subscriber_weekend,
            (UserType::Customer, DayPeriod::Weekday) => &self.customer_weekday,
            (UserType::Customer, DayPeriod::Weekend) => &self.customer_weekend,
        }
    }

    pub(crate) fn bucket_mut(&mut self, user_type: UserType, period: DayPeriod) -> &mut BucketCount {
        match (user_type, period) {
            (UserType::Subscriber, DayPeriod::Weekday) => &mut self.subscriber_weekday,
            (UserType::Subscriber, DayPeriod::Weekend) => &mut self.subscriber_weekend,
            (UserType::Customer, DayPeriod::Weekday) => &mut self.customer_weekday,
            (UserType::Customer, DayPeriod::Weekend) => &mut self.customer_weekend,
        }
    }

    /// Percentage of the bucket's trips taken in rush hours, unrounded.
    pub fn percentage(&self, user_type: UserType, period: DayPeriod) -> Result<f64> {
        let bucket = self.bucket(user_type, period);
        checked_pct(
            bucket.rush,
            bucket.total,
            "rush_hour_breakdown",
            &format!("{} {}", user_type, period.as_str()),
        )
    }

    /// All four bucket percentages, rounded to two decimals.
    ///
    /// Fails if any bucket is empty.
    pub fn breakdown(&self) -> Result<RushHourBreakdown> {
        let pct = |user_type, period| -> Result<f64> {
            Ok(round_to(self.percentage(user_type, period)?, 2))
        };

        Ok(RushHourBreakdown {
            subscriber_weekday: pct(UserType::Subscriber, DayPeriod::Weekday)?,
            subscriber_weekend: pct(UserType::Subscriber, DayPeriod::Weekend)?,
            customer_weekday: pct(UserType::Customer, DayPeriod::Weekday)?,
            customer_weekend: pct(UserType::Customer, DayPeriod::Weekend)?,
        })
    }
}

/// Rush-hour share per rider type and period, each rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RushHourBreakdown {
    pub subscriber_weekday: f64,
    pub subscriber_weekend: f64,
    pub customer_weekday: f64,
    pub customer_weekend: f64,
}
