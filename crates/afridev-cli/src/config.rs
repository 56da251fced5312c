//! YAML configuration.
//!
//! Every section is optional; missing values fall back to the defaults a
//! fresh field tool starts with.
//!
//! ```yaml
//! timezone: { hours: 3, minutes: 0 }
//! gps_criteria: { satellites: 4, hdop: 30, measurement_time: 60 }
//! sensor_limits: { unknown_limit: 90, water_limit: 900 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::CliResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    pub hours: i32,
    pub minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsCriteriaConfig {
    pub satellites: i32,
    pub hdop: i32,
    /// Seconds.
    pub measurement_time: i32,
}

impl Default for GpsCriteriaConfig {
    fn default() -> Self {
        GpsCriteriaConfig {
            satellites: 4,
            hdop: 30,
            measurement_time: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorLimitsConfig {
    pub unknown_limit: u32,
    pub water_limit: u32,
}

impl Default for SensorLimitsConfig {
    fn default() -> Self {
        SensorLimitsConfig {
            unknown_limit: 90,
            water_limit: 900,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timezone: TimezoneConfig,
    pub gps_criteria: GpsCriteriaConfig,
    pub sensor_limits: SensorLimitsConfig,
}

impl Config {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> CliResult<Self> {
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> CliResult<Self> {
        debug!(path = %path.display(), "loading config");
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timezone, TimezoneConfig { hours: 0, minutes: 0 });
        assert_eq!(config.gps_criteria.satellites, 4);
        assert_eq!(config.gps_criteria.hdop, 30);
        assert_eq!(config.gps_criteria.measurement_time, 60);
        assert_eq!(config.sensor_limits.unknown_limit, 90);
        assert_eq!(config.sensor_limits.water_limit, 900);
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml_str(
            "timezone:\n  hours: -5\ngps_criteria:\n  hdop: 50\n",
        )
        .unwrap();
        assert_eq!(config.timezone.hours, -5);
        assert_eq!(config.timezone.minutes, 0);
        assert_eq!(config.gps_criteria.hdop, 50);
        assert_eq!(config.gps_criteria.satellites, 4);
        assert_eq!(config.sensor_limits, SensorLimitsConfig::default());
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml_str("timezone: [1, 2").unwrap_err();
        assert!(err.to_string().starts_with("YAML parsing error"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = Config::default();
        config.sensor_limits.water_limit = 1200;
        let text = serde_yaml::to_string(&config).unwrap();
        assert_eq!(Config::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/afridev.yaml")).unwrap_err();
        assert!(matches!(err, crate::error::CliError::IoError(_)));
    }
}
