//! Resolves the day, week or month bucket a selection falls in.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use tally_domain::{Granularity, Period, Transaction};

/// Groups discretionary spending into date buckets and picks the bucket to show.
pub struct PeriodService;

impl PeriodService {
    /// Returns the bucket of `granularity` that contains `date`.
    pub fn bucket_for(granularity: Granularity, date: NaiveDate) -> Period {
        Period::containing(granularity, date)
    }

    /// Returns the bucket immediately preceding `period`.
    pub fn previous_bucket(period: &Period) -> Period {
        period.previous()
    }

    /// Non-recurring expenses that the external predicate does not flag as recurring.
    pub fn is_discretionary<F>(transaction: &Transaction, is_recurring: &F) -> bool
    where
        F: Fn(&Transaction) -> bool,
    {
        transaction.is_expense() && !transaction.is_recurring() && !is_recurring(transaction)
    }

    /// Sums discretionary spending per bucket, newest bucket first.
    pub fn build_periods<F>(
        granularity: Granularity,
        transactions: &[Transaction],
        is_recurring: F,
    ) -> Vec<Period>
    where
        F: Fn(&Transaction) -> bool,
    {
        let mut buckets: BTreeMap<NaiveDate, Period> = BTreeMap::new();
        for txn in transactions
            .iter()
            .filter(|txn| Self::is_discretionary(txn, &is_recurring))
        {
            let bucket = Period::containing(granularity, txn.date);
            buckets
                .entry(bucket.start)
                .or_insert(bucket)
                .discretionary_amount += txn.magnitude();
        }
        buckets.into_values().rev().collect()
    }

    /// Picks the known period containing `selected`.
    ///
    /// Falls back to the period with the highest discretionary amount when the
    /// selection lands in an empty bucket. `None` only when `periods` is empty.
    pub fn resolve(
        granularity: Granularity,
        selected: NaiveDate,
        periods: &[Period],
    ) -> Option<Period> {
        let candidates = periods
            .iter()
            .filter(|period| period.granularity == granularity);
        if let Some(found) = candidates.clone().find(|period| period.contains(selected)) {
            return Some(*found);
        }
        let fallback = candidates.fold(None::<&Period>, |best, period| match best {
            Some(current) if current.discretionary_amount >= period.discretionary_amount => {
                Some(current)
            }
            _ => Some(period),
        });
        if let Some(period) = fallback {
            debug!(
                %selected,
                fallback = %period,
                "no bucket for selection, using highest spending period"
            );
        }
        fallback.copied()
    }

    /// Resolves the selection and pairs it with the preceding bucket.
    ///
    /// The preceding bucket carries its known discretionary amount, or zero.
    pub fn resolve_with_previous(
        granularity: Granularity,
        selected: NaiveDate,
        periods: &[Period],
    ) -> Option<(Period, Period)> {
        let current = Self::resolve(granularity, selected, periods)?;
        let previous = current.previous();
        let amount = periods
            .iter()
            .find(|period| period.same_bucket(&previous))
            .map(|period| period.discretionary_amount)
            .unwrap_or(0.0);
        Some((current, previous.with_amount(amount)))
    }

    /// Discretionary transactions dated inside `period`, the set its amount is built from.
    pub fn discretionary_in<'a, F>(
        period: &Period,
        transactions: &'a [Transaction],
        is_recurring: F,
    ) -> Vec<&'a Transaction>
    where
        F: Fn(&Transaction) -> bool,
    {
        transactions
            .iter()
            .filter(|txn| {
                period.contains(txn.date) && Self::is_discretionary(txn, &is_recurring)
            })
            .collect()
    }
}
