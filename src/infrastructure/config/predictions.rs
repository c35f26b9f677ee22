//! Prediction refresh and baseline predictor configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::predictor::PredictorWeights;
use crate::domain::QualifyingEntry;

/// `[predictions]`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionsConfig {
    /// Automatic refresh period in seconds; 0 disables it.
    #[serde(default = "default_auto_refresh_secs")]
    pub auto_refresh_secs: u64,
    /// Upper bound for one generator run.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_grid_weight")]
    pub grid_weight: f64,
    #[serde(default = "default_points_weight")]
    pub points_weight: f64,
    #[serde(default = "default_sharpness")]
    pub sharpness: f64,
}

const fn default_auto_refresh_secs() -> u64 {
    30
}

const fn default_timeout_ms() -> u64 {
    10_000
}

fn default_grid_weight() -> f64 {
    PredictorWeights::default().grid
}

fn default_points_weight() -> f64 {
    PredictorWeights::default().points
}

fn default_sharpness() -> f64 {
    PredictorWeights::default().sharpness
}

impl Default for PredictionsConfig {
    fn default() -> Self {
        Self {
            auto_refresh_secs: default_auto_refresh_secs(),
            timeout_ms: default_timeout_ms(),
            grid_weight: default_grid_weight(),
            points_weight: default_points_weight(),
            sharpness: default_sharpness(),
        }
    }
}

impl PredictionsConfig {
    /// `None` when automatic refresh is off.
    #[must_use]
    pub const fn auto_refresh(&self) -> Option<Duration> {
        if self.auto_refresh_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.auto_refresh_secs))
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn weights(&self) -> PredictorWeights {
        PredictorWeights {
            grid: self.grid_weight,
            points: self.points_weight,
            sharpness: self.sharpness,
        }
    }
}

pub(super) fn default_qualifying() -> Vec<QualifyingEntry> {
    vec![
        QualifyingEntry::new("Max Verstappen", "Red Bull", 1),
        QualifyingEntry::new("Charles Leclerc", "Ferrari", 2),
        QualifyingEntry::new("Lando Norris", "McLaren", 3),
    ]
}

pub(super) fn default_team_points() -> BTreeMap<String, f64> {
    [
        ("McLaren", 362.0),
        ("Ferrari", 165.0),
        ("Mercedes", 159.0),
        ("Red Bull", 144.0),
        ("Williams", 54.0),
        ("Haas", 26.0),
        ("Racing Bulls", 22.0),
        ("Aston Martin", 16.0),
        ("Kick Sauber", 16.0),
        ("Alpine", 1.0),
    ]
    .into_iter()
    .map(|(team, points)| (team.to_string(), points))
    .collect()
}
