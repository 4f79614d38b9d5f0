//! First-run user setup captured by onboarding.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSetup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub completed: bool,
}

impl Default for UserSetup {
    fn default() -> Self {
        Self {
            display_name: None,
            currency: "AUD".into(),
            monthly_income: None,
            completed: false,
        }
    }
}
