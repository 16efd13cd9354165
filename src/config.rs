use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

/// Top-level `bikeshare.toml`. Every section and field is optional.
///
/// ```toml
/// [data]
/// daily = "data/day.csv"
/// hourly = "data/hour.csv"
///
/// [log]
/// level = "info"
///
/// [report]
/// weather_from = "2011-01-01"
/// weather_until = "2011-01-31"
/// wind_until = "2011-01-07"
/// head_rows = 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: DataConfig,
    pub log: LogConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub daily: PathBuf,
    pub hourly: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            daily: PathBuf::from("data/day.csv"),
            hourly: PathBuf::from("data/hour.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default `env_logger` filter; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
        }
    }
}

/// Fixed windows of the two dashboard panels. Dates are quoted ISO strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Working days in this window feed the weather / registered panel.
    pub weather_from: NaiveDate,
    pub weather_until: NaiveDate,
    /// Weekend hours up to this date feed the wind / count panel.
    pub wind_until: NaiveDate,
    /// Rows of the filtered daily view to print.
    pub head_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            weather_from: ymd(2011, 1, 1),
            weather_until: ymd(2011, 1, 31),
            wind_until: ymd(2011, 1, 7),
            head_rows: 5,
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

impl Config {
    pub fn from_toml_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(path, &text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
