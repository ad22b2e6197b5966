use crate::error::{GenError, GenResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response rate assumed for a channel missing from the table.
pub const DEFAULT_RESPONSE_RATE: f64 = 0.10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateWeight {
    pub state: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonalWeights {
    /// Response-rate boost for December appeals (0.3 → ×1.3).
    pub december_weight: f64,
    /// Response-rate boost for Giving Tuesday appeals.
    pub giving_tuesday_weight: f64,
}

impl Default for SeasonalWeights {
    fn default() -> Self {
        Self {
            december_weight: 0.3,
            giving_tuesday_weight: 0.1,
        }
    }
}

/// The full configuration bundle for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Reference "today" for pledge status and retention. Fixed in the
    /// bundle so a seed reproduces the same tables on any day.
    pub as_of: NaiveDate,
    pub constituent_count: usize,
    pub organization_fraction: f64,
    pub pledge_fraction: f64,
    pub volume_multiplier: f64,
    pub geography: Vec<StateWeight>,
    #[serde(default)]
    pub seasonal: SeasonalWeights,
    /// Keyed by appeal channel label.
    pub response_rates: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    generator: GeneratorConfig,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn default_geography() -> Vec<StateWeight> {
    [
        ("CA", 0.25),
        ("NY", 0.20),
        ("IL", 0.15),
        ("TX", 0.08),
        ("FL", 0.08),
        ("MA", 0.08),
        ("WA", 0.08),
        ("OR", 0.08),
    ]
    .into_iter()
    .map(|(state, weight)| StateWeight {
        state: state.into(),
        weight,
    })
    .collect()
}

fn default_response_rates() -> BTreeMap<String, f64> {
    [
        ("Direct Mail", 0.15),
        ("Email", 0.08),
        ("Event", 0.25),
        ("Giving Tuesday", 0.20),
        ("Phone", 0.12),
        ("Social Media", 0.05),
        ("Board Giving", 0.80),
        ("Peer to Peer", 0.15),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_date: ymd(2021, 1, 1),
            end_date: ymd(2025, 6, 30),
            as_of: ymd(2025, 6, 30),
            constituent_count: 5_000,
            organization_fraction: 0.15,
            pledge_fraction: 0.12,
            volume_multiplier: 2.0,
            geography: default_geography(),
            seasonal: SeasonalWeights::default(),
            response_rates: default_response_rates(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file with a top-level `generator` object.
    /// In tests, use GeneratorConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: ConfigFile = serde_json::from_str(&content)?;
        file.generator.validate()?;
        Ok(file.generator)
    }

    /// Small population with the default tables, for fast tests.
    pub fn default_test() -> Self {
        Self {
            start_date: ymd(2021, 1, 1),
            end_date: ymd(2024, 12, 31),
            as_of: ymd(2024, 12, 31),
            constituent_count: 200,
            volume_multiplier: 1.0,
            ..Self::default()
        }
    }

    /// Number of organizations out of `constituent_count`.
    pub fn organization_count(&self) -> usize {
        (self.constituent_count as f64 * self.organization_fraction) as usize
    }

    pub fn response_rate(&self, channel_label: &str) -> f64 {
        self.response_rates
            .get(channel_label)
            .copied()
            .unwrap_or(DEFAULT_RESPONSE_RATE)
    }

    pub fn validate(&self) -> GenResult<()> {
        let invalid = |reason: String| Err(GenError::InvalidConfig { reason });

        if self.end_date <= self.start_date {
            return invalid(format!(
                "end_date {} must be after start_date {}",
                self.end_date, self.start_date
            ));
        }
        for (name, value) in [
            ("organization_fraction", self.organization_fraction),
            ("pledge_fraction", self.pledge_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name}={value} must be within [0, 1]"));
            }
        }
        if !self.volume_multiplier.is_finite() || self.volume_multiplier < 0.0 {
            return invalid(format!(
                "volume_multiplier={} must be a non-negative number",
                self.volume_multiplier
            ));
        }
        if self.geography.is_empty() {
            return invalid("geography must name at least one state".into());
        }
        if let Some(w) = self.geography.iter().find(|w| !(w.weight >= 0.0)) {
            return invalid(format!("state {} has invalid weight {}", w.state, w.weight));
        }
        if self.geography.iter().map(|w| w.weight).sum::<f64>() <= 0.0 {
            return invalid("geography weights sum to zero".into());
        }
        if self.seasonal.december_weight < 0.0 || self.seasonal.giving_tuesday_weight < 0.0 {
            return invalid("seasonal weights must be non-negative".into());
        }
        if let Some((channel, rate)) = self.response_rates.iter().find(|(_, r)| !(**r >= 0.0)) {
            return invalid(format!("response rate for {channel} is invalid: {rate}"));
        }
        Ok(())
    }
}
