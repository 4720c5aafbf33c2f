//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone};
use serde::Deserialize;
use thiserror::Error;

use crate::sim::generator::InitialState;

/// Top-level scenario configuration parsed from TOML.
///
/// Every table is optional and defaults to the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or pick a built-in with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Identity, live timer, and seeding.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Seed state of the reading generator.
    #[serde(default)]
    pub initial: InitialConfig,
    /// Logical clock settings for batch runs.
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Identifier stamped on every reading and alert.
    pub microgrid_id: String,
    /// Live timer period (ms, must be > 0).
    pub interval_ms: u64,
    /// Live prediction refresh period (ms); 0 turns the refresh off.
    pub prediction_interval_ms: u64,
    /// Master random seed; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            microgrid_id: "microgrid-001".to_string(),
            interval_ms: 2_000,
            prediction_interval_ms: 30_000,
            seed: None,
        }
    }
}

/// Generator seed state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialConfig {
    /// Smoothed solar output before the first reading (W).
    pub solar_power_w: f64,
    pub wind_power_w: f64,
    pub load_power_w: f64,
    /// State of charge (%, 10–100).
    pub battery_soc: f64,
    /// State of health (%, 80–100).
    pub battery_soh: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        let s = InitialState::default();
        Self {
            solar_power_w: s.solar_power_w,
            wind_power_w: s.wind_power_w,
            load_power_w: s.load_power_w,
            battery_soc: s.battery_soc,
            battery_soh: s.battery_soh,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Number of readings to generate (must be > 0).
    pub steps: usize,
    /// Simulated minutes between readings (must be > 0).
    pub step_minutes: u32,
    /// Local time of the first reading; today's midnight when absent.
    pub start: Option<NaiveDateTime>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            steps: 720,
            step_minutes: 2,
            start: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"initial.battery_soc"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Nearly empty battery facing a heavy load with little generation.
    pub fn depleted() -> Self {
        Self {
            initial: InitialConfig {
                solar_power_w: 500.0,
                wind_power_w: 500.0,
                load_power_w: 7_000.0,
                battery_soc: 15.0,
                ..InitialConfig::default()
            },
            ..Self::default()
        }
    }

    /// Battery already below the healthy SoH threshold.
    pub fn aged() -> Self {
        Self {
            initial: InitialConfig {
                battery_soh: 84.5,
                ..InitialConfig::default()
            },
            ..Self::default()
        }
    }

    /// Batch run starting at 18:00 so it opens with the evening peak.
    pub fn night_shift() -> Self {
        Self {
            batch: BatchConfig {
                start: Local::now().date_naive().and_hms_opt(18, 0, 0),
                ..BatchConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "depleted", "aged", "night_shift"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "depleted" => Ok(Self::depleted()),
            "aged" => Ok(Self::aged()),
            "night_shift" => Ok(Self::night_shift()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.interval_ms == 0 {
            errors.push(ConfigError::new("simulation.interval_ms", "must be > 0"));
        }

        let i = &self.initial;
        for (field, value) in [
            ("initial.solar_power_w", i.solar_power_w),
            ("initial.wind_power_w", i.wind_power_w),
            ("initial.load_power_w", i.load_power_w),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, "must be a finite value >= 0"));
            }
        }
        if !(10.0..=100.0).contains(&i.battery_soc) {
            errors.push(ConfigError::new("initial.battery_soc", "must be in [10, 100]"));
        }
        if !(80.0..=100.0).contains(&i.battery_soh) {
            errors.push(ConfigError::new("initial.battery_soh", "must be in [80, 100]"));
        }

        let b = &self.batch;
        if b.steps == 0 {
            errors.push(ConfigError::new("batch.steps", "must be > 0"));
        }
        if b.step_minutes == 0 {
            errors.push(ConfigError::new("batch.step_minutes", "must be > 0"));
        }
        match self.batch_start() {
            None if b.start.is_some() => errors.push(ConfigError::new(
                "batch.start",
                "does not exist in the local time zone",
            )),
            Some(start) if b.steps > 0 && b.step_minutes > 0 => {
                if batch_end(start, b.steps, b.step_minutes).is_none() {
                    errors.push(ConfigError::new(
                        "batch.step_minutes",
                        "steps * step_minutes runs past the supported date range",
                    ));
                }
            }
            _ => {}
        }

        errors
    }

    /// Generator seed state described by the `[initial]` table.
    pub fn initial_state(&self) -> InitialState {
        let i = &self.initial;
        InitialState {
            solar_power_w: i.solar_power_w,
            wind_power_w: i.wind_power_w,
            load_power_w: i.load_power_w,
            battery_soc: i.battery_soc,
            battery_soh: i.battery_soh,
        }
    }

    /// Live prediction refresh period, `None` when turned off.
    pub fn prediction_interval(&self) -> Option<std::time::Duration> {
        match self.simulation.prediction_interval_ms {
            0 => None,
            ms => Some(std::time::Duration::from_millis(ms)),
        }
    }

    /// Local time of the first batch reading.
    ///
    /// Falls back to today's local midnight. Returns `None` when the
    /// configured start falls in a daylight-saving gap.
    pub fn batch_start(&self) -> Option<DateTime<Local>> {
        let naive = self
            .batch
            .start
            .unwrap_or_else(|| Local::now().date_naive().and_time(NaiveTime::MIN));
        Local.from_local_datetime(&naive).earliest()
    }
}

/// Time of the reading one step past the last, or `None` on overflow.
fn batch_end(start: DateTime<Local>, steps: usize, step_minutes: u32) -> Option<DateTime<Local>> {
    let span = Duration::minutes(i64::from(step_minutes)).checked_mul(i32::try_from(steps).ok()?)?;
    start.checked_add_signed(span)
}
