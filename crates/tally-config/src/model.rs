use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use tally_domain::{Granularity, InsightSettings, InsightThresholds, RuleTable};

use crate::ConfigError;

/// User preferences plus the tunables of classification and insights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub default_granularity: Granularity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Where blobs are stored. Defaults to `<data dir>/tally`.
    pub data_dir: Option<PathBuf>,

    #[serde(default = "Config::default_load_timeout_secs")]
    pub load_timeout_secs: u64,

    /// Keyword → subcategory rules, first match wins.
    #[serde(default = "RuleTable::default_spending_rules")]
    pub keyword_rules: RuleTable,

    #[serde(default = "Config::default_takeout_keywords")]
    pub takeout_keywords: Vec<String>,

    #[serde(default)]
    pub insight_thresholds: InsightThresholdSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-AU".into(),
            currency: "AUD".into(),
            default_granularity: Granularity::default(),
            data_dir: None,
            load_timeout_secs: Self::default_load_timeout_secs(),
            keyword_rules: RuleTable::default_spending_rules(),
            takeout_keywords: Self::default_takeout_keywords(),
            insight_thresholds: InsightThresholdSet::default(),
        }
    }
}

impl Config {
    pub fn default_load_timeout_secs() -> u64 {
        10
    }

    pub fn default_takeout_keywords() -> Vec<String> {
        InsightSettings::default().takeout_keywords
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("tally")
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs.max(1))
    }

    pub fn rule_table(&self) -> &RuleTable {
        &self.keyword_rules
    }

    pub fn insight_settings(&self) -> InsightSettings {
        InsightSettings {
            takeout_keywords: self.takeout_keywords.clone(),
            daily: self.insight_thresholds.daily,
            weekly: self.insight_thresholds.weekly,
            monthly: self.insight_thresholds.monthly,
            ..InsightSettings::default()
        }
    }

    /// Rejects thresholds that would make the insight bands overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        for granularity in Granularity::ALL {
            let band = self.insight_thresholds.for_granularity(granularity);
            if !(band.low.is_finite() && band.high.is_finite())
                || band.low < 0.0
                || band.low > band.high
            {
                return Err(ConfigError::Invalid(format!(
                    "{granularity} insight thresholds must satisfy 0 <= low <= high"
                )));
            }
        }
        Ok(())
    }
}

/// Per-granularity insight bands, in percentage points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InsightThresholdSet {
    pub daily: InsightThresholds,
    pub weekly: InsightThresholds,
    pub monthly: InsightThresholds,
}

impl InsightThresholdSet {
    pub fn for_granularity(&self, granularity: Granularity) -> InsightThresholds {
        match granularity {
            Granularity::Daily => self.daily,
            Granularity::Weekly => self.weekly,
            Granularity::Monthly => self.monthly,
        }
    }
}

impl Default for InsightThresholdSet {
    fn default() -> Self {
        let defaults = InsightSettings::default();
        Self {
            daily: defaults.daily,
            weekly: defaults.weekly,
            monthly: defaults.monthly,
        }
    }
}
