//! Category reference data and keyword classification rules.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Label of the synthetic subcategory for transactions no rule claims.
pub const GENERAL_SUBCATEGORY: &str = "General";

/// Categorises spending for breakdowns and goal matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            subcategories: Vec::new(),
        }
    }

    pub fn with_style(mut self, icon: impl Into<String>, color: impl Into<String>) -> Self {
        self.icon = icon.into();
        self.color = color.into();
        self
    }

    pub fn with_subcategory(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.subcategories.push(Subcategory {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn has_subcategories(&self) -> bool {
        !self.subcategories.is_empty()
    }

    /// Returns `true` when `reference` names this category by id or case-insensitive name.
    pub fn matches(&self, reference: &str) -> bool {
        let key = normalize_key(reference);
        !key.is_empty() && (normalize_key(&self.id) == key || normalize_key(&self.name) == key)
    }

    /// Looks up a subcategory by id or case-insensitive name.
    pub fn subcategory(&self, reference: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|sub| sub.matches(reference))
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        if self.subcategories.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({} subcategories)", self.name, self.subcategories.len())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
}

impl Subcategory {
    pub fn matches(&self, reference: &str) -> bool {
        let key = normalize_key(reference);
        !key.is_empty() && (normalize_key(&self.id) == key || normalize_key(&self.name) == key)
    }
}

/// Maps a description fragment onto a subcategory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordRule {
    pub pattern: String,
    pub target: String,
}

impl KeywordRule {
    pub fn new(pattern: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            target: target.into(),
        }
    }

    /// Case-insensitive match of the pattern at the start of a word in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        contains_keyword(text, &self.pattern)
    }
}

/// Ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<KeywordRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn push(&mut self, rule: KeywordRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Target of the first rule matching `text`.
    pub fn classify(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.target.as_str())
    }

    /// Like [`RuleTable::classify`], but only considers rules whose target passes `accept`.
    pub fn classify_where<F>(&self, text: &str, accept: F) -> Option<&str>
    where
        F: Fn(&str) -> bool,
    {
        self.rules
            .iter()
            .filter(|rule| accept(&rule.target))
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.target.as_str())
    }

    /// Delivery and takeaway merchants mapped to `Takeout`, supermarkets to `Groceries`.
    pub fn default_spending_rules() -> Self {
        let takeout = [
            "uber", "doordash", "menulog", "deliveroo", "grubhub", "mcdonald", "kfc", "domino",
            "pizza", "takeaway", "takeout",
        ];
        let groceries = [
            "woolworths", "coles", "aldi", "iga", "costco", "supermarket", "grocer",
        ];
        let rules = takeout
            .iter()
            .map(|pattern| KeywordRule::new(*pattern, "Takeout"))
            .chain(
                groceries
                    .iter()
                    .map(|pattern| KeywordRule::new(*pattern, "Groceries")),
            )
            .collect();
        Self { rules }
    }
}
