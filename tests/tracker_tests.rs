mod common;

use std::sync::Arc;

use common::{date, setup_tracker};
use tally::{
    config::Config,
    core::{storage::BlobStore, CategoryProvider},
    domain::{Goal, Granularity, InsightKind, Recurrence, Transaction},
    Tally,
};

#[test]
fn open_creates_data_directory() {
    tally::init();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        data_dir: Some(dir.path().join("nested").join("data")),
        ..Config::default()
    };
    let tracker = Tally::open(config).expect("open tracker");
    assert!(dir.path().join("nested").join("data").is_dir());
    assert!(tracker.transactions().list().is_empty());
}

#[test]
fn weekly_breakdown_matches_takeout_example() {
    let (tracker, _) = setup_tracker(date(2024, 3, 10));
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 4), 50.0, "food", "Uber Eats"))
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 5), 30.0, "food", "Woolworths"))
        .unwrap();

    let breakdown = tracker
        .breakdown(Granularity::Weekly, date(2024, 3, 6))
        .expect("spending exists");
    assert_eq!(breakdown.period.start, date(2024, 3, 4));
    assert_eq!(breakdown.total, 80.0);
    let food = &breakdown.categories[0];
    assert_eq!(food.category, "Food");
    let takeout = food
        .subcategories
        .iter()
        .find(|sub| sub.name == "Takeout")
        .expect("takeout row");
    assert_eq!(takeout.amount, 50.0);
    assert_eq!(takeout.percentage, 62.5);

    let insight = tracker
        .takeout_insight(Granularity::Weekly, date(2024, 3, 6))
        .expect("food spending this week");
    assert_eq!(insight.current_percentage, 62.5);
    assert_eq!(insight.previous_percentage, 0.0);
    assert_eq!(insight.kind, InsightKind::Warning);
}

#[test]
fn empty_selection_falls_back_to_busiest_period() {
    let (tracker, _) = setup_tracker(date(2024, 5, 31));
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 12), 40.0, "shopping", "Shoes"))
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 4, 2), 90.0, "shopping", "Jacket"))
        .unwrap();

    let breakdown = tracker
        .breakdown(Granularity::Monthly, date(2024, 5, 15))
        .expect("fallback period");
    assert_eq!(breakdown.period.start, date(2024, 4, 1));
    assert_eq!(breakdown.total, 90.0);
    assert_eq!(tracker.periods(Granularity::Monthly).len(), 2);
}

#[test]
fn recurring_spending_is_not_discretionary() {
    let (tracker, _) = setup_tracker(date(2024, 3, 31));
    tracker
        .add_transaction(
            Transaction::expense(date(2024, 3, 1), 15.0, "entertainment", "Netflix")
                .with_recurrence(Recurrence::Monthly),
        )
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 15), 15.0, "entertainment", "Netflix"))
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 16), 25.0, "entertainment", "Cinema"))
        .unwrap();

    let breakdown = tracker
        .breakdown(Granularity::Monthly, date(2024, 3, 20))
        .expect("cinema is discretionary");
    assert_eq!(breakdown.total, 25.0);

    let permissive = {
        let (tracker, _) = setup_tracker(date(2024, 3, 31));
        tracker.with_recurring_predicate(Arc::new(|_: &Transaction, _: &[Transaction]| false))
    };
    for txn in tracker.transactions().list() {
        permissive.add_transaction(txn).unwrap();
    }
    let breakdown = permissive
        .breakdown(Granularity::Monthly, date(2024, 3, 20))
        .expect("spending exists");
    assert_eq!(breakdown.total, 40.0);
}

#[test]
fn expenses_feed_spending_goals_and_balance_card() {
    let (tracker, storage) = setup_tracker(date(2024, 4, 1));
    let budget = tracker
        .create_goal(Goal::spending("Eating out", 200.0, "Food"))
        .unwrap();
    let mut fund = Goal::savings("Emergency fund", 900.0).with_deadline(date(2024, 6, 30));
    fund.auto_contribute = true;
    fund.show_on_balance_card = true;
    let fund = tracker.create_goal(fund).unwrap();

    tracker
        .add_transaction(Transaction::income(date(2024, 4, 1), 2_500.0, "Salary"))
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 4, 3), 60.0, "food", "Pizza night"))
        .unwrap();

    assert_eq!(tracker.goal_progress(budget).unwrap(), 30.0);

    let balance = tracker.balance(Granularity::Monthly, date(2024, 4, 10));
    assert_eq!(balance.income, 2_500.0);
    assert_eq!(balance.expenses, 60.0);
    assert_eq!(balance.goal_contributions, 300.0);
    assert_eq!(balance.available, 2_140.0);
    assert_eq!(balance.highlighted_goals[0].goal_id, fund);

    let completed = tracker.contribute(fund, 900.0).unwrap();
    assert!(!completed.is_active);
    assert_eq!(completed.completed_date, Some(date(2024, 4, 1)));

    let keys = storage.keys().unwrap();
    assert!(keys.contains(&"goals".to_string()));
    assert!(keys.contains(&"transactions".to_string()));
    assert!(keys.contains(&"categories".to_string()));
}

#[test]
fn deleting_twice_removes_once() {
    let (tracker, _) = setup_tracker(date(2024, 1, 5));
    let id = tracker
        .add_transaction(Transaction::expense(date(2024, 1, 2), 9.0, "food", "Bagel"))
        .unwrap();
    assert!(tracker.delete_transaction(id).unwrap());
    assert!(!tracker.delete_transaction(id).unwrap());
    assert!(tracker.transactions().list().is_empty());
}

#[test]
fn custom_categories_join_breakdowns() {
    let (tracker, _) = setup_tracker(date(2024, 2, 29));
    tracker
        .categories()
        .add_category(
            tally::domain::Category::new("", "Pets").with_subcategory("vet", "Vet"),
        )
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 2, 20), 120.0, "pets", "Vet visit"))
        .unwrap();

    let breakdown = tracker
        .breakdown(Granularity::Daily, date(2024, 2, 20))
        .expect("spending that day");
    assert_eq!(breakdown.categories[0].category, "Pets");
    assert_eq!(breakdown.categories[0].subcategories[0].name, "Vet");
}

#[test]
fn takeout_insight_ignores_recurring_food() {
    let (tracker, _) = setup_tracker(date(2024, 3, 10));
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 4), 50.0, "food", "Uber Eats"))
        .unwrap();
    tracker
        .add_transaction(Transaction::expense(date(2024, 3, 5), 30.0, "food", "Woolworths"))
        .unwrap();
    tracker
        .add_transaction(
            Transaction::expense(date(2024, 3, 6), 20.0, "food", "Meal kit")
                .with_recurrence(Recurrence::Weekly),
        )
        .unwrap();

    let selected = date(2024, 3, 6);
    let breakdown = tracker
        .breakdown(Granularity::Weekly, selected)
        .expect("spending exists");
    assert_eq!(breakdown.total, 80.0);

    let insight = tracker
        .takeout_insight(Granularity::Weekly, selected)
        .expect("food spending this week");
    assert_eq!(insight.current_percentage, 62.5);
}

#[test]
fn editing_and_deleting_expenses_moves_spending_goals() {
    let (tracker, _) = setup_tracker(date(2024, 4, 1));
    let budget = tracker
        .create_goal(Goal::spending("Food", 200.0, "food"))
        .unwrap();
    let groceries = Transaction::expense(date(2024, 4, 2), 60.0, "food", "Groceries");
    let id = tracker.add_transaction(groceries.clone()).unwrap();
    assert_eq!(tracker.goal_progress(budget).unwrap(), 30.0);

    let mut smaller = groceries;
    smaller.amount = 40.0;
    tracker.edit_transaction(smaller.clone()).unwrap();
    assert_eq!(tracker.goal_progress(budget).unwrap(), 20.0);

    let mut moved = smaller;
    moved.category = "transport".into();
    tracker.edit_transaction(moved).unwrap();
    assert_eq!(tracker.goal_progress(budget).unwrap(), 0.0);

    tracker
        .edit_transaction(Transaction {
            category: "food".into(),
            ..tracker.transactions().get(id).unwrap()
        })
        .unwrap();
    assert_eq!(tracker.goal_progress(budget).unwrap(), 20.0);

    assert!(tracker.delete_transaction(id).unwrap());
    assert_eq!(tracker.goal_progress(budget).unwrap(), 0.0);
    assert!(!tracker.delete_transaction(id).unwrap());
    assert_eq!(tracker.goal_progress(budget).unwrap(), 0.0);
}
