//! Engine configuration.
//!
//! The defaults live in `config/default.toml`, embedded at compile time via
//! [`include_str!`]. An override file only needs the keys it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tourist_safety_anomaly_models::DetectorConfig;
use tourist_safety_score_models::{DeductionPolicy, MAX_SCORE};

/// The embedded default configuration document.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Environment variable naming an override config file.
pub const CONFIG_ENV_VAR: &str = "TOURIST_SAFETY_CONFIG";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`EngineConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Which value and why.
        message: String,
    },
}

/// Tunables for [`crate::SafetyEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples fetched per tourist when recomputing.
    pub history_limit: usize,
    /// Radius for the nearby-zone list in geofence reports.
    pub nearby_radius_meters: f64,
    /// Maximum nearby zones listed.
    pub nearby_limit: usize,
    /// Default dashboard clustering radius.
    pub cluster_radius_meters: f64,
    /// Scores strictly below this are low-safety alerts.
    pub low_score_threshold: u8,
    /// How repeated anomalies of one kind are deducted.
    pub deduction_policy: DeductionPolicy,
    /// Detector thresholds.
    pub detectors: DetectorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            nearby_radius_meters: 10_000.0,
            nearby_limit: 5,
            cluster_radius_meters: 5_000.0,
            low_score_threshold: 50,
            deduction_policy: DeductionPolicy::PerInstance,
            detectors: DetectorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Rejects values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit < 2 {
            return Err(invalid(format!(
                "history_limit must be at least 2, got {}",
                self.history_limit
            )));
        }
        if self.nearby_limit == 0 {
            return Err(invalid("nearby_limit must be positive".to_string()));
        }
        if self.low_score_threshold > MAX_SCORE {
            return Err(invalid(format!(
                "low_score_threshold must be at most {MAX_SCORE}, got {}",
                self.low_score_threshold
            )));
        }

        let d = &self.detectors;
        for (name, value) in [
            ("nearby_radius_meters", self.nearby_radius_meters),
            ("cluster_radius_meters", self.cluster_radius_meters),
            ("detectors.inactivity_minutes", d.inactivity_minutes),
            ("detectors.deviation_km", d.deviation_km),
            ("detectors.altitude_drop_meters", d.altitude_drop_meters),
            ("detectors.altitude_window_minutes", d.altitude_window_minutes),
            ("detectors.speed_kmh", d.speed_kmh),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        Ok(())
    }
}

const fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid { message }
}

/// Parses and validates a TOML config document.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] on malformed input or
/// [`ConfigError::Invalid`] on out-of-range values.
pub fn parse_config(toml_str: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::de::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

/// Loads the config at `path`, or the embedded defaults when `path` is
/// `None`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed, or
/// validated.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let Some(path) = path else {
        return parse_config(DEFAULT_CONFIG_TOML);
    };

    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    log::info!("Loaded engine config from {}", path.display());
    Ok(config)
}
