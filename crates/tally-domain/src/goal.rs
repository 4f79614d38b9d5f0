//! Domain types for savings, spending and debt goals.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target: f64,
    pub current: f64,
    /// Starting balance of a debt goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub auto_contribute: bool,
    #[serde(default)]
    pub show_on_balance_card: bool,
    #[serde(default = "Goal::default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
}

impl Goal {
    pub fn new(title: impl Into<String>, kind: GoalKind, target: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            target,
            current: 0.0,
            original_amount: None,
            deadline: None,
            category_id: None,
            priority: GoalPriority::default(),
            auto_contribute: false,
            show_on_balance_card: false,
            is_active: true,
            completed_date: None,
        }
    }

    pub fn savings(title: impl Into<String>, target: f64) -> Self {
        Self::new(title, GoalKind::Savings, target)
    }

    /// Builds a debt goal whose balance starts at `original_amount`.
    pub fn debt(title: impl Into<String>, original_amount: f64) -> Self {
        let mut goal = Self::new(title, GoalKind::Debt, original_amount);
        goal.original_amount = Some(original_amount);
        goal.current = original_amount;
        goal
    }

    pub fn spending(title: impl Into<String>, budget: f64, category_id: impl Into<String>) -> Self {
        let mut goal = Self::new(title, GoalKind::Spending, budget);
        goal.category_id = Some(category_id.into());
        goal
    }

    pub fn with_current(mut self, current: f64) -> Self {
        self.current = current;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_priority(mut self, priority: GoalPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn default_active() -> bool {
        true
    }

    pub fn is_completed(&self) -> bool {
        self.completed_date.is_some()
    }

    pub fn mark_completed(&mut self, on: NaiveDate) {
        self.is_active = false;
        self.completed_date = Some(on);
    }
}

impl Displayable for Goal {
    fn display_label(&self) -> String {
        format!("{} ({})", self.title, self.kind)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Savings,
    Spending,
    Debt,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalKind::Savings => "Savings",
            GoalKind::Spending => "Spending",
            GoalKind::Debt => "Debt",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for GoalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalPriority::High => "High",
            GoalPriority::Medium => "Medium",
            GoalPriority::Low => "Low",
        };
        f.write_str(label)
    }
}
