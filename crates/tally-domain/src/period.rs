//! Date buckets used to group spending.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::common::Granularity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Derived day, week or month window. Both bounds are inclusive.
pub struct Period {
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub discretionary_amount: f64,
}

impl Period {
    /// Bucket of the given granularity that contains `date`.
    ///
    /// Weeks run Monday to Sunday.
    pub fn containing(granularity: Granularity, date: NaiveDate) -> Self {
        let (start, end) = match granularity {
            Granularity::Daily => (date, date),
            Granularity::Weekly => {
                let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                (start, start + Duration::days(6))
            }
            Granularity::Monthly => {
                let start = first_of_month(date);
                (start, last_of_month(start))
            }
        };
        Self {
            granularity,
            start,
            end,
            discretionary_amount: 0.0,
        }
    }

    /// The bucket immediately before this one, with no amount attached.
    pub fn previous(&self) -> Self {
        match self.granularity {
            Granularity::Daily => {
                let day = self.start - Duration::days(1);
                Self::containing(Granularity::Daily, day)
            }
            Granularity::Weekly => Self {
                granularity: Granularity::Weekly,
                start: self.start - Duration::days(7),
                end: self.end - Duration::days(7),
                discretionary_amount: 0.0,
            },
            Granularity::Monthly => {
                let anchor = first_of_month(self.start);
                let prior = anchor
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(anchor - Duration::days(1));
                Self::containing(Granularity::Monthly, prior)
            }
        }
    }

    pub fn with_amount(mut self, discretionary_amount: f64) -> Self {
        self.discretionary_amount = discretionary_amount;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns `true` when both periods describe the same bucket.
    pub fn same_bucket(&self, other: &Period) -> bool {
        self.granularity == other.granularity && self.start == other.start && self.end == other.end
    }

    /// The single day of a daily bucket.
    pub fn date(&self) -> NaiveDate {
        self.start
    }

    /// First day of the month of a monthly bucket.
    pub fn month_date(&self) -> NaiveDate {
        first_of_month(self.start)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Daily => write!(f, "{}", self.start.format("%a %-d %b %Y")),
            Granularity::Weekly => write!(
                f,
                "{} - {}",
                self.start.format("%-d %b"),
                self.end.format("%-d %b %Y")
            ),
            Granularity::Monthly => write!(f, "{}", self.start.format("%B %Y")),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(first)
}
