use crate::presets;
use crate::series::DEFAULT_CAPACITY;

pub const MIN_CAPACITY: usize = 5;
pub const MAX_CAPACITY: usize = 100;
pub const DEFAULT_INTERVAL_MS: u64 = 5_000;
pub const MIN_INTERVAL_MS: u64 = 250;
pub const MAX_INTERVAL_MS: u64 = 3_600_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub url: String,
    pub path: String,
    pub interval_ms: u64,
    pub capacity: usize,
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let preset = &presets::PRESETS[0];
        Self {
            url: preset.url.to_string(),
            path: preset.path.to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
            capacity: DEFAULT_CAPACITY,
            timeout_secs: 10,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let (url, path) = match get("PULSE_PRESET") {
            Some(name) => {
                let preset = presets::find(&name).ok_or(ConfigError::UnknownPreset(name))?;
                (preset.url.to_string(), preset.path.to_string())
            }
            None => (
                get("PULSE_URL").unwrap_or(defaults.url),
                get("PULSE_PATH").unwrap_or(defaults.path),
            ),
        };
        let url = url.trim().to_string();
        validate_url(&url)?;
        Ok(Self {
            url,
            path,
            interval_ms: clamp_interval_ms(
                get("PULSE_INTERVAL_MS").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_INTERVAL_MS),
            ),
            capacity: clamp_capacity(
                get("PULSE_CAPACITY").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_CAPACITY),
            ),
            timeout_secs: get("PULSE_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(10),
        })
    }
}

pub fn clamp_capacity(n: usize) -> usize {
    n.clamp(MIN_CAPACITY, MAX_CAPACITY)
}

pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Only absolute http(s) URLs are accepted.
pub fn validate_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl { url: raw.to_string(), reason };
    let parsed = url::Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}

/// Settings for the function plotter binary.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub function: String,
    pub start: f64,
    pub end: f64,
    pub points: usize,
    pub amplitude: f64,
    pub frequency: f64,
    pub derivative: bool,
}

impl PlotConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            function: get("PLOT_FN").unwrap_or_else(|| "sin".to_string()),
            start: get("PLOT_START").and_then(|v| v.parse().ok()).unwrap_or(-10.0),
            end: get("PLOT_END").and_then(|v| v.parse().ok()).unwrap_or(10.0),
            points: get("PLOT_POINTS").and_then(|v| v.parse().ok()).unwrap_or(200),
            amplitude: get("PLOT_AMPLITUDE").and_then(|v| v.parse().ok()).unwrap_or(1.0),
            frequency: get("PLOT_FREQUENCY").and_then(|v| v.parse().ok()).unwrap_or(1.0),
            derivative: get("PLOT_DERIVATIVE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.capacity, 20);
        assert_eq!(cfg.path, "bpi.USD.rate_float");
    }

    #[test]
    fn test_values_are_clamped() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            ("PULSE_CAPACITY", "1000"),
            ("PULSE_INTERVAL_MS", "10"),
        ]))
        .unwrap();
        assert_eq!(cfg.capacity, MAX_CAPACITY);
        assert_eq!(cfg.interval_ms, MIN_INTERVAL_MS);
        assert_eq!(clamp_capacity(2), MIN_CAPACITY);
    }

    #[test]
    fn test_preset_overrides_url() {
        let cfg = DashboardConfig::from_lookup(lookup(&[
            ("PULSE_PRESET", "iss"),
            ("PULSE_URL", "https://ignored.example"),
        ]))
        .unwrap();
        assert_eq!(cfg.path, "iss_position.latitude");

        let err = DashboardConfig::from_lookup(lookup(&[("PULSE_PRESET", "zzz")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownPreset("zzz".to_string()));
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_url("https://api.example.com/v1?x=1").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(DashboardConfig::from_lookup(lookup(&[("PULSE_URL", "file:///etc/passwd")])).is_err());
    }

    #[test]
    fn test_url_is_trimmed() {
        let cfg = DashboardConfig::from_lookup(lookup(&[("PULSE_URL", " https://api.example.com/x\t")])).unwrap();
        assert_eq!(cfg.url, "https://api.example.com/x");
    }

    #[test]
    fn test_plot_config() {
        let cfg = PlotConfig::from_lookup(lookup(&[("PLOT_FN", "cubic"), ("PLOT_DERIVATIVE", "yes")]));
        assert_eq!(cfg.function, "cubic");
        assert!(cfg.derivative);
        assert_eq!(cfg.points, 200);
    }
}
