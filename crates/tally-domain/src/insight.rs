//! Report types produced by breakdowns, insights and balance summaries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::Granularity, period::Period};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Spend inside one subcategory of a category breakdown.
pub struct SubcategoryBreakdown {
    pub name: String,
    pub amount: f64,
    /// Share of the parent category total.
    pub percentage: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Spend inside one category for a resolved period.
pub struct CategoryBreakdown {
    pub category: String,
    pub amount: f64,
    /// Share of the period total.
    pub percentage: f64,
    pub transaction_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<SubcategoryBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Category breakdown of a period's discretionary spending.
pub struct PeriodBreakdown {
    pub period: Period,
    pub total: f64,
    pub categories: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Info,
    Warning,
    Success,
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InsightKind::Info => "info",
            InsightKind::Warning => "warning",
            InsightKind::Success => "success",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Percentage-point bands separating a steady trend from a notable one.
pub struct InsightThresholds {
    pub low: f64,
    pub high: f64,
}

impl InsightThresholds {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Inputs of the takeout trend insight.
pub struct InsightSettings {
    pub food_category: String,
    pub takeout_subcategory: String,
    pub takeout_keywords: Vec<String>,
    pub daily: InsightThresholds,
    pub weekly: InsightThresholds,
    pub monthly: InsightThresholds,
}

impl InsightSettings {
    pub fn thresholds(&self, granularity: Granularity) -> InsightThresholds {
        match granularity {
            Granularity::Daily => self.daily,
            Granularity::Weekly => self.weekly,
            Granularity::Monthly => self.monthly,
        }
    }
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            food_category: "food".into(),
            takeout_subcategory: "takeout".into(),
            takeout_keywords: [
                "uber", "doordash", "menulog", "deliveroo", "grubhub", "mcdonald", "kfc",
                "domino", "pizza", "takeaway", "takeout",
            ]
            .iter()
            .map(|keyword| keyword.to_string())
            .collect(),
            daily: InsightThresholds::new(10.0, 20.0),
            weekly: InsightThresholds::new(5.0, 15.0),
            monthly: InsightThresholds::new(5.0, 10.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Qualitative comparison of takeout share between two periods.
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub suggestion: String,
    pub current_percentage: f64,
    pub previous_percentage: f64,
    /// Difference in percentage points, current minus previous.
    pub change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalSnapshot {
    pub goal_id: Uuid,
    pub title: String,
    pub progress: f64,
    pub overdue: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Income minus expenses minus goal contributions for a period.
pub struct BalanceSummary {
    pub period: Period,
    pub income: f64,
    pub expenses: f64,
    pub goal_contributions: f64,
    pub available: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlighted_goals: Vec<GoalSnapshot>,
}
