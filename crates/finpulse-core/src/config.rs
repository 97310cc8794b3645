//! Runtime configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/finpulse/config/finpulse.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;
use tracing::debug;

use crate::alerts::{DailyLimitPolicy, DEFAULT_DAILY_LIMIT, DEFAULT_DEDUP_WINDOW_MINUTES};
use crate::error::{Error, Result};
use crate::reminders::DEFAULT_REMINDER_GRACE_MINUTES;

/// Upper bound for every minutes setting (one year)
const MAX_MINUTES: i64 = 525_600;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/finpulse.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    pub daily_limit_policy: DailyLimitPolicy,
    pub dedup_window: Duration,
    pub check_on_insert: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            daily_limit_policy: DailyLimitPolicy::BudgetDerived,
            dedup_window: Duration::minutes(DEFAULT_DEDUP_WINDOW_MINUTES),
            check_on_insert: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    /// Hour of the local day for the daily alert check
    pub daily_check_hour: u32,
    pub reminder_sweep_interval: Duration,
    pub reminder_grace: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_check_hour: 20,
            reminder_sweep_interval: Duration::minutes(DEFAULT_REMINDER_GRACE_MINUTES),
            reminder_grace: Duration::minutes(DEFAULT_REMINDER_GRACE_MINUTES),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinpulseConfig {
    pub alerts: AlertConfig,
    pub schedule: ScheduleConfig,
}

impl FinpulseConfig {
    /// Load config (explicit path, then data-dir override, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::InvalidData(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                ))
            })?,
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "Using config override");
                    fs::read_to_string(&path)
                        .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// The config compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(alerts) = raw.alerts {
            let amount = alerts.daily_limit.unwrap_or(DEFAULT_DAILY_LIMIT);
            if let Some(strategy) = alerts.daily_limit_strategy {
                config.alerts.daily_limit_policy = match strategy.as_str() {
                    "fixed" => DailyLimitPolicy::Fixed { amount },
                    "budget_derived" => DailyLimitPolicy::BudgetDerived,
                    other => {
                        return Err(Error::InvalidData(format!(
                            "Unknown daily_limit_strategy '{}' (expected 'fixed' or 'budget_derived')",
                            other
                        )))
                    }
                };
            } else if alerts.daily_limit.is_some() {
                config.alerts.daily_limit_policy = DailyLimitPolicy::Fixed { amount };
            }
            if let Some(minutes) = alerts.dedup_window_minutes {
                config.alerts.dedup_window = minutes_setting("dedup_window_minutes", minutes)?;
            }
            if let Some(check) = alerts.check_on_insert {
                config.alerts.check_on_insert = check;
            }
        }

        if let Some(schedule) = raw.schedule {
            if let Some(hour) = schedule.daily_check_hour {
                if hour > 23 {
                    return Err(Error::InvalidData(format!(
                        "daily_check_hour must be 0-23, got {}",
                        hour
                    )));
                }
                config.schedule.daily_check_hour = hour;
            }
            if let Some(minutes) = schedule.reminder_sweep_minutes {
                config.schedule.reminder_sweep_interval =
                    minutes_setting("reminder_sweep_minutes", minutes)?;
            }
            if let Some(minutes) = schedule.reminder_grace_minutes {
                config.schedule.reminder_grace =
                    minutes_setting("reminder_grace_minutes", minutes)?;
            }
        }

        Ok(config)
    }
}

/// A positive minutes value, at most one year
fn minutes_setting(name: &str, minutes: i64) -> Result<Duration> {
    if !(1..=MAX_MINUTES).contains(&minutes) {
        return Err(Error::InvalidData(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_MINUTES, minutes
        )));
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| Error::InvalidData(format!("{} out of range: {}", name, minutes)))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finpulse").join("config").join("finpulse.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    alerts: Option<RawAlerts>,
    schedule: Option<RawSchedule>,
}

#[derive(Debug, Deserialize)]
struct RawAlerts {
    daily_limit_strategy: Option<String>,
    daily_limit: Option<f64>,
    dedup_window_minutes: Option<i64>,
    check_on_insert: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
    daily_check_hour: Option<u32>,
    reminder_sweep_minutes: Option<i64>,
    reminder_grace_minutes: Option<i64>,
}
