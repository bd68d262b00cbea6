use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    forecast::{DAYTIME_START_HOUR, DEFAULT_MAX_DAYS},
    units::DayWindow,
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Forecast endpoint and normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of 3-hour samples requested per place.
    #[serde(default = "default_sample_count")]
    pub sample_count: u32,

    /// Days shown in the daily view.
    #[serde(default = "default_max_days")]
    pub max_days: usize,

    /// Ignore `max_days` and show every day in the response.
    #[serde(default)]
    pub all_days: bool,

    #[serde(default = "default_daytime_start_hour")]
    pub daytime_start_hour: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Suggestion lookup and search submit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_place = "London"
///
/// [forecast]
/// max_days = 6
/// all_days = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default = "default_place")]
    pub default_place: String,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub icons: DayWindow,

    #[serde(default)]
    pub search: SearchConfig,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

const fn default_sample_count() -> u32 {
    56
}

const fn default_max_days() -> usize {
    DEFAULT_MAX_DAYS
}

const fn default_daytime_start_hour() -> u32 {
    DAYTIME_START_HOUR
}

const fn default_timeout() -> u64 {
    30
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_min_query_len() -> usize {
    3
}

const fn default_submit_delay_ms() -> u64 {
    500
}

fn default_place() -> String {
    "London".to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sample_count: default_sample_count(),
            max_days: default_max_days(),
            all_days: false,
            daytime_start_hour: default_daytime_start_hour(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ForecastConfig {
    /// Day bound handed to the normalizer, `None` when unbounded.
    pub fn day_limit(&self) -> Option<usize> {
        (!self.all_days).then_some(self.max_days)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            submit_delay_ms: default_submit_delay_ms(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_place: default_place(),
            forecast: ForecastConfig::default(),
            icons: DayWindow::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherwise", "weatherwise")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast.max_days == 0 {
            return Err(anyhow!("forecast.max_days must be at least 1"));
        }
        if self.forecast.daytime_start_hour > 23 {
            return Err(anyhow!("forecast.daytime_start_hour must be between 0 and 23"));
        }
        if self.icons.day_start_hour > self.icons.night_start_hour
            || self.icons.night_start_hour > 24
        {
            return Err(anyhow!(
                "icons.day_start_hour must not exceed icons.night_start_hour (max 24)"
            ));
        }
        if self.search.min_query_len == 0 {
            return Err(anyhow!("search.min_query_len must be at least 1"));
        }
        Ok(())
    }

    /// Store a new API key; blank input clears it.
    pub fn set_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    /// API key with the environment override applied.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_override(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_behaviour() {
        let cfg = Config::default();

        assert_eq!(cfg.forecast.sample_count, 56);
        assert_eq!(cfg.forecast.day_limit(), Some(6));
        assert_eq!(cfg.forecast.daytime_start_hour, 6);
        assert_eq!(cfg.icons, DayWindow::default());
        assert_eq!(cfg.search.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.search.min_query_len, 3);
        assert_eq!(cfg.search.submit_delay(), Duration::from_millis(500));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            default_place = "Paris"

            [forecast]
            max_days = 3

            [icons]
            night_start_hour = 20
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.default_place, "Paris");
        assert_eq!(cfg.forecast.day_limit(), Some(3));
        assert_eq!(cfg.forecast.sample_count, 56);
        assert_eq!(cfg.icons.day_start_hour, 6);
        assert_eq!(cfg.icons.night_start_hour, 20);
        assert_eq!(cfg.search, SearchConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg = Config::from_toml("").expect("empty config should parse");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn zero_max_days_is_rejected() {
        let err = Config::from_toml("[forecast]\nmax_days = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_days"));
    }

    #[test]
    fn inverted_icon_window_is_rejected() {
        let err = Config::from_toml("[icons]\nday_start_hour = 19\n").unwrap_err();
        assert!(err.to_string().contains("day_start_hour"));
    }

    #[test]
    fn set_api_key_trims_and_clears() {
        let mut cfg = Config::default();

        cfg.set_api_key("  OPEN_KEY \n".into());
        assert_eq!(cfg.api_key.as_deref(), Some("OPEN_KEY"));

        cfg.set_api_key("   ".into());
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn environment_key_takes_precedence() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        assert_eq!(
            cfg.api_key_with_override(Some("FROM_ENV".into())).as_deref(),
            Some("FROM_ENV")
        );
        assert_eq!(cfg.api_key_with_override(Some(" ".into())).as_deref(), Some("STORED"));
        assert_eq!(cfg.api_key_with_override(None).as_deref(), Some("STORED"));
    }

    #[test]
    fn saved_config_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.forecast.all_days = true;

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = Config::from_toml(&text).expect("parse");
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.forecast.day_limit(), None);
    }
}
