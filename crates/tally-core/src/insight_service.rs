//! Takeout trend insight comparing two periods of food spending.

use tracing::debug;

use tally_domain::{
    contains_keyword, format_percentage, normalize_key, percentage_of, Granularity, Insight,
    InsightKind, InsightSettings, Transaction,
};

/// Food and takeout totals for one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TakeoutShare {
    pub food_total: f64,
    pub takeout_total: f64,
    pub food_transactions: usize,
}

impl TakeoutShare {
    pub fn percentage(&self) -> f64 {
        percentage_of(self.takeout_total, self.food_total)
    }
}

pub struct InsightService;

impl InsightService {
    /// Returns `true` for food transactions that look like delivery or takeaway.
    pub fn is_takeout(transaction: &Transaction, settings: &InsightSettings) -> bool {
        if let Some(sub) = transaction.subcategory_id.as_deref() {
            if normalize_key(sub) == normalize_key(&settings.takeout_subcategory) {
                return true;
            }
        }
        settings
            .takeout_keywords
            .iter()
            .any(|keyword| contains_keyword(&transaction.description, keyword))
    }

    /// Sums food and takeout spending. `None` when there is no food spending at all.
    pub fn takeout_share<'a, I>(transactions: I, settings: &InsightSettings) -> Option<TakeoutShare>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let food = normalize_key(&settings.food_category);
        let mut share = TakeoutShare {
            food_total: 0.0,
            takeout_total: 0.0,
            food_transactions: 0,
        };
        for txn in transactions
            .into_iter()
            .filter(|txn| txn.is_expense() && normalize_key(&txn.category) == food)
        {
            share.food_total += txn.magnitude();
            share.food_transactions += 1;
            if Self::is_takeout(txn, settings) {
                share.takeout_total += txn.magnitude();
            }
        }
        (share.food_transactions > 0).then_some(share)
    }

    /// Compares the takeout share of food spending between two periods.
    ///
    /// `None` when the current period has no food spending, or for daily
    /// comparisons when the previous day has none. A weekly or monthly previous
    /// period without food spending counts as 0%.
    pub fn takeout_trend<'a, C, P>(
        granularity: Granularity,
        current: C,
        previous: P,
        settings: &InsightSettings,
    ) -> Option<Insight>
    where
        C: IntoIterator<Item = &'a Transaction>,
        P: IntoIterator<Item = &'a Transaction>,
    {
        let current = Self::takeout_share(current, settings)?;
        let previous_pct = match Self::takeout_share(previous, settings) {
            Some(share) => share.percentage(),
            None if granularity == Granularity::Daily => {
                debug!("no food spending on the previous day, skipping takeout insight");
                return None;
            }
            None => 0.0,
        };
        let current_pct = current.percentage();
        let change = current_pct - previous_pct;
        let thresholds = settings.thresholds(granularity);
        let (this_span, last_span) = span_labels(granularity);
        let now = format_percentage(current_pct);
        let before = format_percentage(previous_pct);

        let (kind, title, message, suggestion) = if change >= thresholds.high {
            (
                InsightKind::Warning,
                "Takeout is climbing",
                format!("Takeout made up {now}% of food spending {this_span}, up from {before}% {last_span}."),
                "Plan a few home-cooked meals and keep delivery for special occasions.",
            )
        } else if change >= thresholds.low {
            (
                InsightKind::Info,
                "Takeout is creeping up",
                format!("Takeout is {now}% of food spending {this_span}, compared with {before}% {last_span}."),
                "A shopping list for the next few days can keep delivery orders in check.",
            )
        } else if change <= -thresholds.low {
            (
                InsightKind::Success,
                "Less takeout",
                format!("Takeout dropped to {now}% of food spending {this_span}, down from {before}% {last_span}."),
                "Nice work. Consider moving the difference into a savings goal.",
            )
        } else {
            (
                InsightKind::Info,
                "Takeout is steady",
                format!("Takeout is {now}% of food spending {this_span}, about the same as {last_span}."),
                "Keep an eye on delivery fees; they add up quickly.",
            )
        };

        Some(Insight {
            kind,
            title: title.to_string(),
            message,
            suggestion: suggestion.to_string(),
            current_percentage: current_pct,
            previous_percentage: previous_pct,
            change,
        })
    }
}

fn span_labels(granularity: Granularity) -> (&'static str, &'static str) {
    match granularity {
        Granularity::Daily => ("today", "yesterday"),
        Granularity::Weekly => ("this week", "last week"),
        Granularity::Monthly => ("this month", "last month"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_domain::InsightThresholds;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn food(day: u32, amount: f64, description: &str) -> Transaction {
        Transaction::expense(date(2024, 3, day), amount, "food", description)
    }

    #[test]
    fn takeout_share_of_weekly_example() {
        let txns = [food(4, 50.0, "Uber Eats"), food(5, 30.0, "Woolworths")];
        let share = InsightService::takeout_share(&txns, &InsightSettings::default()).unwrap();
        assert_eq!(share.food_total, 80.0);
        assert_eq!(share.takeout_total, 50.0);
        assert_eq!(share.percentage(), 62.5);
    }

    #[test]
    fn no_food_means_no_insight() {
        let current = [Transaction::expense(date(2024, 3, 4), 20.0, "transport", "Uber")];
        let previous = [food(1, 10.0, "Coles")];
        let insight = InsightService::takeout_trend(
            Granularity::Weekly,
            &current,
            &previous,
            &InsightSettings::default(),
        );
        assert!(insight.is_none());
    }

    #[test]
    fn daily_requires_previous_day_data() {
        let current = [food(5, 20.0, "Menulog")];
        let insight = InsightService::takeout_trend(
            Granularity::Daily,
            &current,
            &Vec::<Transaction>::new(),
            &InsightSettings::default(),
        );
        assert!(insight.is_none());
    }

    #[test]
    fn weekly_without_previous_counts_as_zero() {
        let current = [food(5, 20.0, "Menulog"), food(6, 80.0, "Aldi")];
        let insight = InsightService::takeout_trend(
            Granularity::Weekly,
            &current,
            &Vec::<Transaction>::new(),
            &InsightSettings::default(),
        )
        .unwrap();
        assert_eq!(insight.previous_percentage, 0.0);
        assert_eq!(insight.change, 20.0);
        assert_eq!(insight.kind, InsightKind::Warning);
    }

    #[test]
    fn bands_follow_granularity_thresholds() {
        let settings = InsightSettings::default();
        // previous: 50%, current: 57%
        let previous = [food(1, 50.0, "Doordash"), food(2, 50.0, "Coles")];
        let current = [food(8, 57.0, "Doordash"), food(9, 43.0, "Coles")];
        let weekly =
            InsightService::takeout_trend(Granularity::Weekly, &current, &previous, &settings)
                .unwrap();
        assert_eq!(weekly.kind, InsightKind::Info);
        assert_eq!(weekly.title, "Takeout is creeping up");
        let daily =
            InsightService::takeout_trend(Granularity::Daily, &current, &previous, &settings)
                .unwrap();
        assert_eq!(daily.title, "Takeout is steady");
    }

    /// Two food expenses out of a 64 total, so shares are exact in binary.
    fn split(first_day: u32, takeout: f64) -> [Transaction; 2] {
        [
            food(first_day, takeout, "Deliveroo"),
            food(first_day + 1, 64.0 - takeout, "Aldi"),
        ]
    }

    fn kind_and_title(
        granularity: Granularity,
        previous_takeout: f64,
        current_takeout: f64,
        settings: &InsightSettings,
    ) -> (InsightKind, String) {
        let insight = InsightService::takeout_trend(
            granularity,
            &split(8, current_takeout),
            &split(1, previous_takeout),
            settings,
        )
        .unwrap();
        (insight.kind, insight.title)
    }

    #[test]
    fn band_edges_are_inclusive() {
        let settings = InsightSettings {
            daily: InsightThresholds::new(12.5, 25.0),
            ..InsightSettings::default()
        };
        // previous 50%: current 75% (+25), 62.5% (+12.5), 37.5% (-12.5), 56.25% (+6.25)
        let at_high = kind_and_title(Granularity::Daily, 32.0, 48.0, &settings);
        assert_eq!(at_high.0, InsightKind::Warning);
        let at_low = kind_and_title(Granularity::Daily, 32.0, 40.0, &settings);
        assert_eq!(at_low, (InsightKind::Info, "Takeout is creeping up".to_string()));
        let at_negative_low = kind_and_title(Granularity::Daily, 32.0, 24.0, &settings);
        assert_eq!(at_negative_low.0, InsightKind::Success);
        let inside = kind_and_title(Granularity::Daily, 32.0, 36.0, &settings);
        assert_eq!(inside, (InsightKind::Info, "Takeout is steady".to_string()));
    }

    #[test]
    fn default_daily_and_monthly_bands() {
        let settings = InsightSettings::default();
        // daily: +21.875 warns, +18.75 only creeps
        assert_eq!(
            kind_and_title(Granularity::Daily, 32.0, 46.0, &settings).0,
            InsightKind::Warning
        );
        assert_eq!(
            kind_and_title(Granularity::Daily, 32.0, 44.0, &settings).1,
            "Takeout is creeping up"
        );
        // monthly: -6.25 succeeds, -3.125 is steady
        assert_eq!(
            kind_and_title(Granularity::Monthly, 32.0, 28.0, &settings).0,
            InsightKind::Success
        );
        assert_eq!(
            kind_and_title(Granularity::Monthly, 32.0, 30.0, &settings).1,
            "Takeout is steady"
        );
    }

    #[test]
    fn falling_share_is_success() {
        let previous = [food(1, 80.0, "Pizza Hut"), food(2, 20.0, "Coles")];
        let current = [food(8, 10.0, "KFC"), food(9, 90.0, "Coles")];
        let insight = InsightService::takeout_trend(
            Granularity::Monthly,
            &current,
            &previous,
            &InsightSettings::default(),
        )
        .unwrap();
        assert_eq!(insight.kind, InsightKind::Success);
        assert!(insight.message.contains("10.0%"));
    }

    #[test]
    fn tagged_takeout_subcategory_counts() {
        let txn = food(3, 12.0, "Local cafe").with_subcategory("Takeout");
        assert!(InsightService::is_takeout(&txn, &InsightSettings::default()));
    }
}
