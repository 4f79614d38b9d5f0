//! Goal progress arithmetic.

use chrono::NaiveDate;

use tally_domain::{Goal, GoalKind};

const DAYS_PER_MONTH: f64 = 30.0;

pub struct ProgressService;

impl ProgressService {
    /// Percent complete, clamped to `[0, 100]`.
    ///
    /// Debt progress is the share of the original balance already paid off.
    pub fn progress(goal: &Goal) -> f64 {
        let raw = match goal.kind {
            GoalKind::Savings | GoalKind::Spending => ratio(goal.current, goal.target),
            GoalKind::Debt => match goal.original_amount {
                Some(original) => ratio(original - goal.current, original),
                None => 0.0,
            },
        };
        raw.clamp(0.0, 100.0)
    }

    pub fn is_overdue(goal: &Goal, today: NaiveDate) -> bool {
        match goal.deadline {
            Some(deadline) => today > deadline && Self::progress(goal) < 100.0,
            None => false,
        }
    }

    /// Amount still to save or repay. Spending goals have nothing to contribute.
    pub fn remaining(goal: &Goal) -> f64 {
        let remaining = match goal.kind {
            GoalKind::Debt => goal.current,
            GoalKind::Savings => goal.target - goal.current,
            GoalKind::Spending => 0.0,
        };
        if remaining.is_finite() {
            remaining.max(0.0)
        } else {
            0.0
        }
    }

    /// Even monthly contribution that reaches the goal by its deadline.
    ///
    /// Zero without a deadline or once the deadline has passed. On the deadline
    /// day the whole remainder is due.
    pub fn monthly_amount_needed(goal: &Goal, today: NaiveDate) -> f64 {
        let Some(deadline) = goal.deadline else {
            return 0.0;
        };
        let days_left = (deadline - today).num_days();
        if days_left < 0 {
            return 0.0;
        }
        let months_left = (days_left as f64 / DAYS_PER_MONTH).ceil().max(1.0);
        Self::remaining(goal) / months_left
    }

    /// Applies a contribution in the direction the goal type moves.
    ///
    /// Savings and spending grow, debt shrinks. Non-finite amounts are ignored.
    pub fn apply_contribution(goal: &mut Goal, amount: f64) {
        if !amount.is_finite() {
            return;
        }
        match goal.kind {
            GoalKind::Savings | GoalKind::Spending => goal.current += amount,
            GoalKind::Debt => goal.current -= amount,
        }
        Self::enforce_invariants(goal);
    }

    /// Keeps `current` non-negative and a debt balance within its original amount.
    pub fn enforce_invariants(goal: &mut Goal) {
        if !goal.current.is_finite() || goal.current < 0.0 {
            goal.current = 0.0;
        }
        if goal.kind == GoalKind::Debt {
            if let Some(original) = goal.original_amount.filter(|value| value.is_finite()) {
                goal.current = goal.current.min(original.max(0.0));
            }
        }
    }

    /// Savings and debt goals complete at 100%. Spending budgets never complete.
    pub fn is_complete(goal: &Goal) -> bool {
        goal.kind != GoalKind::Spending && Self::progress(goal) >= 100.0
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 && whole.is_finite() && part.is_finite() {
        (part / whole) * 100.0
    } else {
        0.0
    }
}
