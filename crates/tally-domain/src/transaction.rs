//! Domain models for recorded income and expense transactions.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Stored as a magnitude. Direction comes from `kind`.
    pub amount: f64,
    /// Category id or display name. Empty means [`OTHER_CATEGORY`].
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount: amount.abs(),
            category: category.into(),
            subcategory_id: None,
            description: description.into(),
            recurrence: Recurrence::None,
            kind,
        }
    }

    pub fn expense(
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(date, amount, category, description, TransactionKind::Expense)
    }

    pub fn income(date: NaiveDate, amount: f64, description: impl Into<String>) -> Self {
        Self::new(date, amount, "Income", description, TransactionKind::Income)
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_subcategory(mut self, subcategory_id: impl Into<String>) -> Self {
        self.subcategory_id = Some(subcategory_id.into());
        self
    }

    /// Unsigned amount used by every aggregation.
    pub fn magnitude(&self) -> f64 {
        if self.amount.is_finite() {
            self.amount.abs()
        } else {
            0.0
        }
    }

    /// Amount signed for display: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.magnitude(),
            TransactionKind::Expense => -self.magnitude(),
        }
    }

    /// Category label with the `Other` fallback applied.
    pub fn category_label(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            OTHER_CATEGORY
        } else {
            trimmed
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence != Recurrence::None
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "{} {} {:.2} ({})",
            self.date,
            self.description,
            self.signed_amount(),
            self.category_label()
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
/// How often a transaction repeats. Anything but `None` is excluded from discretionary spend.
pub enum Recurrence {
    #[default]
    None,
    Weekly,
    Fortnightly,
    Monthly,
    #[serde(rename = "sixmonths")]
    SixMonths,
    Yearly,
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recurrence::None => "One-off",
            Recurrence::Weekly => "Weekly",
            Recurrence::Fortnightly => "Fortnightly",
            Recurrence::Monthly => "Monthly",
            Recurrence::SixMonths => "Every 6 months",
            Recurrence::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}
