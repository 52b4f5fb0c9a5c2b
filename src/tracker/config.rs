use std::{path::Path, time::Duration};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or validating a [`TrackerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse tracker config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("hero_name must not be empty")]
    EmptyHeroName,

    #[error("dedup_lookback must be at least 1")]
    ZeroLookback,

    #[error("poll_interval_ms must be at least 1")]
    ZeroPollInterval,

    #[error("{name} must be a non-negative number, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("pot_reset_low ({low}) must not exceed pot_reset_high ({high})")]
    InvertedPotReset { low: f64, high: f64 },
}

/// Session level settings for the hand tracker.
///
/// The heuristic thresholds were picked by watching real tables; they are
/// tolerances for noisy capture, not exact rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Name the hero is recorded under.
    pub hero_name: String,
    /// Optional site label copied onto every hand record.
    pub site: Option<String>,
    /// Time between observation polls.
    pub poll_interval_ms: u64,
    /// Two identical actions closer than this are one action seen twice.
    pub dedup_window_ms: u64,
    /// How many of the most recent actions are checked for duplicates.
    pub dedup_lookback: usize,
    /// Amounts closer than this are treated as equal when deduplicating.
    pub amount_tolerance: f64,
    /// A pot above this ...
    pub pot_reset_high: f64,
    /// ... that drops below this on the next tick means a new hand.
    pub pot_reset_low: f64,
    /// Turn changes in each player's `last_action` label into actions.
    pub infer_player_actions: bool,
    /// Emit the open hand when the observation source runs dry.
    pub complete_on_shutdown: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hero_name: "Hero".to_string(),
            site: None,
            poll_interval_ms: 1000,
            dedup_window_ms: 2000,
            dedup_lookback: 5,
            amount_tolerance: 0.01,
            pot_reset_high: 10.0,
            pot_reset_low: 5.0,
            infer_player_actions: false,
            complete_on_shutdown: false,
        }
    }
}

impl TrackerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hero_name(mut self, hero_name: impl Into<String>) -> Self {
        self.hero_name = hero_name.into();
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hero_name.trim().is_empty() {
            return Err(ConfigError::EmptyHeroName);
        }
        if self.dedup_lookback == 0 {
            return Err(ConfigError::ZeroLookback);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        for (name, value) in [
            ("amount_tolerance", self.amount_tolerance),
            ("pot_reset_high", self.pot_reset_high),
            ("pot_reset_low", self.pot_reset_low),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.pot_reset_low > self.pot_reset_high {
            return Err(ConfigError::InvertedPotReset {
                low: self.pot_reset_low,
                high: self.pot_reset_high,
            });
        }

        Ok(())
    }

    pub fn dedup_window(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.dedup_window_ms).unwrap_or(i64::MAX))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
