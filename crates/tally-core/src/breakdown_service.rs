//! Category and subcategory breakdown of discretionary spending.

use std::cmp::Ordering;

use tally_domain::{
    normalize_key, percentage_of, Category, CategoryBreakdown, Period, PeriodBreakdown,
    RuleTable, SubcategoryBreakdown, Transaction, GENERAL_SUBCATEGORY,
};

use crate::period_service::PeriodService;

struct CategoryBucket<'a> {
    key: String,
    label: String,
    metadata: Option<&'a Category>,
    amount: f64,
    transactions: Vec<&'a Transaction>,
}

pub struct BreakdownService;

impl BreakdownService {
    /// Aggregates the discretionary transactions of `period` by category.
    ///
    /// Categories are sorted by amount, descending. Categories whose metadata lists
    /// subcategories carry a subcategory split as well.
    pub fn breakdown<F>(
        period: &Period,
        transactions: &[Transaction],
        categories: &[Category],
        rules: &RuleTable,
        is_recurring: F,
    ) -> PeriodBreakdown
    where
        F: Fn(&Transaction) -> bool,
    {
        let mut buckets: Vec<CategoryBucket<'_>> = Vec::new();
        for txn in transactions.iter().filter(|txn| {
            period.contains(txn.date) && PeriodService::is_discretionary(txn, &is_recurring)
        }) {
            let label = txn.category_label();
            let metadata = categories.iter().find(|category| category.matches(label));
            let key = metadata
                .map(|category| normalize_key(&category.id))
                .unwrap_or_else(|| normalize_key(label));
            let index = match buckets.iter().position(|bucket| bucket.key == key) {
                Some(index) => index,
                None => {
                    buckets.push(CategoryBucket {
                        key,
                        label: metadata
                            .map(|category| category.name.clone())
                            .unwrap_or_else(|| label.to_string()),
                        metadata,
                        amount: 0.0,
                        transactions: Vec::new(),
                    });
                    buckets.len() - 1
                }
            };
            let bucket = &mut buckets[index];
            bucket.amount += txn.magnitude();
            bucket.transactions.push(txn);
        }

        let total: f64 = buckets.iter().map(|bucket| bucket.amount).sum();
        let mut rows: Vec<CategoryBreakdown> = buckets
            .into_iter()
            .map(|bucket| {
                let subcategories = match bucket.metadata {
                    Some(category) if category.has_subcategories() => Self::subcategory_split(
                        category,
                        &bucket.transactions,
                        bucket.amount,
                        rules,
                    ),
                    _ => Vec::new(),
                };
                CategoryBreakdown {
                    category: bucket.label,
                    amount: bucket.amount,
                    percentage: percentage_of(bucket.amount, total),
                    transaction_count: bucket.transactions.len(),
                    subcategories,
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            by_amount_desc(a.amount, b.amount).then_with(|| a.category.cmp(&b.category))
        });

        PeriodBreakdown {
            period: period.with_amount(total),
            total,
            categories: rows,
        }
    }

    /// Names the subcategory `transaction` belongs to inside `category`.
    ///
    /// Order: explicit subcategory id, subcategory name in the description, the first
    /// keyword rule targeting one of the category's subcategories, then `General`.
    pub fn classify_subcategory(
        transaction: &Transaction,
        category: &Category,
        rules: &RuleTable,
    ) -> String {
        if let Some(sub) = transaction
            .subcategory_id
            .as_deref()
            .and_then(|reference| category.subcategory(reference))
        {
            return sub.name.clone();
        }
        let description = transaction.description.to_lowercase();
        if let Some(sub) = category.subcategories.iter().find(|sub| {
            let name = normalize_key(&sub.name);
            !name.is_empty() && description.contains(&name)
        }) {
            return sub.name.clone();
        }
        rules
            .classify_where(&transaction.description, |target| {
                category.subcategory(target).is_some()
            })
            .and_then(|target| category.subcategory(target))
            .map(|sub| sub.name.clone())
            .unwrap_or_else(|| GENERAL_SUBCATEGORY.to_string())
    }

    fn subcategory_split(
        category: &Category,
        transactions: &[&Transaction],
        category_total: f64,
        rules: &RuleTable,
    ) -> Vec<SubcategoryBreakdown> {
        let mut rows: Vec<SubcategoryBreakdown> = Vec::new();
        for txn in transactions {
            let name = Self::classify_subcategory(txn, category, rules);
            match rows.iter_mut().find(|row| row.name == name) {
                Some(row) => {
                    row.amount += txn.magnitude();
                    row.transaction_count += 1;
                }
                None => rows.push(SubcategoryBreakdown {
                    name,
                    amount: txn.magnitude(),
                    percentage: 0.0,
                    transaction_count: 1,
                }),
            }
        }
        for row in rows.iter_mut() {
            row.percentage = percentage_of(row.amount, category_total);
        }
        rows.sort_by(|a, b| by_amount_desc(a.amount, b.amount).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}

fn by_amount_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_domain::{Granularity, Recurrence};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn categories() -> Vec<Category> {
        vec![
            Category::new("food", "Food")
                .with_subcategory("takeout", "Takeout")
                .with_subcategory("groceries", "Groceries"),
            Category::new("transport", "Transport"),
        ]
    }

    fn week() -> Period {
        Period::containing(Granularity::Weekly, date(2024, 3, 6))
    }

    #[test]
    fn groups_and_sorts_by_amount() {
        let txns = vec![
            Transaction::expense(date(2024, 3, 4), 50.0, "food", "Uber Eats"),
            Transaction::expense(date(2024, 3, 5), 30.0, "Food", "Woolworths Metro"),
            Transaction::expense(date(2024, 3, 6), 120.0, "transport", "Opal top up"),
            Transaction::expense(date(2024, 3, 7), 10.0, "", "Coffee"),
            Transaction::expense(date(2024, 3, 20), 500.0, "food", "Out of range"),
        ];
        let report = BreakdownService::breakdown(
            &week(),
            &txns,
            &categories(),
            &RuleTable::default_spending_rules(),
            |_| false,
        );
        assert_eq!(report.total, 210.0);
        let names: Vec<_> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Transport", "Food", "Other"]);
        let food = &report.categories[1];
        assert_eq!(food.amount, 80.0);
        assert_eq!(food.transaction_count, 2);
        assert_eq!(food.subcategories[0].name, "Takeout");
        assert_eq!(food.subcategories[0].percentage, 62.5);
        assert_eq!(food.subcategories[1].name, "Groceries");
        assert!(report.categories[0].subcategories.is_empty());
    }

    #[test]
    fn recurring_and_income_are_excluded() {
        let txns = vec![
            Transaction::expense(date(2024, 3, 4), 40.0, "food", "Pizza"),
            Transaction::expense(date(2024, 3, 4), 15.0, "bills", "Netflix")
                .with_recurrence(Recurrence::Monthly),
            Transaction::income(date(2024, 3, 5), 900.0, "Pay"),
        ];
        let report =
            BreakdownService::breakdown(&week(), &txns, &categories(), &RuleTable::default(), |_| {
                false
            });
        assert_eq!(report.total, 40.0);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].percentage, 100.0);
    }

    #[test]
    fn empty_period_has_zero_percentages() {
        let report =
            BreakdownService::breakdown(&week(), &[], &categories(), &RuleTable::default(), |_| {
                false
            });
        assert_eq!(report.total, 0.0);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn unmatched_description_falls_into_general() {
        let food = &categories()[0];
        let txn = Transaction::expense(date(2024, 3, 4), 9.0, "food", "Corner bakery");
        assert_eq!(
            BreakdownService::classify_subcategory(&txn, food, &RuleTable::default_spending_rules()),
            GENERAL_SUBCATEGORY
        );
    }

    #[test]
    fn explicit_subcategory_wins_over_rules() {
        let food = &categories()[0];
        let txn = Transaction::expense(date(2024, 3, 4), 9.0, "food", "Uber Eats")
            .with_subcategory("groceries");
        assert_eq!(
            BreakdownService::classify_subcategory(&txn, food, &RuleTable::default_spending_rules()),
            "Groceries"
        );
    }

    #[test]
    fn category_totals_match_period_amount() {
        let txns = vec![
            Transaction::expense(date(2024, 3, 4), 12.34, "food", "Menulog"),
            Transaction::expense(date(2024, 3, 5), 0.1, "transport", "Bus"),
            Transaction::expense(date(2024, 3, 6), 0.2, "misc", "Stamp"),
            Transaction::expense(date(2024, 3, 8), 77.7, "food", "Aldi"),
        ];
        let periods = PeriodService::build_periods(Granularity::Weekly, &txns, |_| false);
        let report = BreakdownService::breakdown(
            &periods[0],
            &txns,
            &categories(),
            &RuleTable::default_spending_rules(),
            |_| false,
        );
        let sum: f64 = report.categories.iter().map(|c| c.amount).sum();
        assert!((sum - periods[0].discretionary_amount).abs() < 1e-9);
    }
}
