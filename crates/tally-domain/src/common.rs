//! Shared traits and enums for finance primitives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category label applied to transactions that carry no category.
pub const OTHER_CATEGORY: &str = "Other";

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
/// Size of the date bucket used to group spending.
pub enum Granularity {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
    ];
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        };
        f.write_str(label)
    }
}

/// Lower-cases and trims a free-form reference for comparisons.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive search for `pattern` where a word starts in `text`.
///
/// `"iga"` matches "IGA Express" and "Local IGA" but not "Cigarettes".
pub fn contains_keyword(text: &str, pattern: &str) -> bool {
    let pattern = normalize_key(pattern);
    if pattern.is_empty() {
        return false;
    }
    let text = text.to_lowercase();
    text.match_indices(&pattern).any(|(index, _)| {
        text[..index]
            .chars()
            .next_back()
            .map_or(true, |prev| !prev.is_alphanumeric())
    })
}

/// Returns a percentage of `part` in `total`, or `0.0` when `total` is not positive.
pub fn percentage_of(part: f64, total: f64) -> f64 {
    if total > 0.0 && part.is_finite() && total.is_finite() {
        (part / total) * 100.0
    } else {
        0.0
    }
}

/// Formats a percentage with one decimal place, e.g. `62.5`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}", value)
}
