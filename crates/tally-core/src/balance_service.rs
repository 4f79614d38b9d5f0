//! Balance card: what is left of a period's income after spending and goals.

use chrono::NaiveDate;

use tally_domain::{
    BalanceSummary, Goal, GoalSnapshot, Granularity, Period, Transaction, TransactionKind,
};

use crate::progress_service::ProgressService;

const DAYS_PER_MONTH: f64 = 30.0;

pub struct BalanceService;

impl BalanceService {
    /// Summarises `period` from every transaction dated inside it.
    ///
    /// Goal contributions are the monthly amounts needed by active
    /// auto-contributing goals, prorated to daily and weekly periods.
    pub fn summarize(
        period: &Period,
        transactions: &[Transaction],
        goals: &[Goal],
        today: NaiveDate,
    ) -> BalanceSummary {
        let (income, expenses) = transactions
            .iter()
            .filter(|txn| period.contains(txn.date))
            .fold((0.0, 0.0), |(income, expenses), txn| match txn.kind {
                TransactionKind::Income => (income + txn.magnitude(), expenses),
                TransactionKind::Expense => (income, expenses + txn.magnitude()),
            });

        let monthly: f64 = goals
            .iter()
            .filter(|goal| goal.is_active && goal.auto_contribute)
            .map(|goal| ProgressService::monthly_amount_needed(goal, today))
            .sum();
        let goal_contributions = match period.granularity {
            Granularity::Monthly => monthly,
            Granularity::Daily | Granularity::Weekly => {
                monthly * period.days() as f64 / DAYS_PER_MONTH
            }
        };

        let highlighted_goals = goals
            .iter()
            .filter(|goal| goal.is_active && goal.show_on_balance_card)
            .map(|goal| GoalSnapshot {
                goal_id: goal.id,
                title: goal.title.clone(),
                progress: ProgressService::progress(goal),
                overdue: ProgressService::is_overdue(goal, today),
            })
            .collect();

        BalanceSummary {
            period: *period,
            income,
            expenses,
            goal_contributions,
            available: income - expenses - goal_contributions,
            highlighted_goals,
        }
    }
}
