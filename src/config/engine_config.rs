//! Engine Configuration - timeline labels, flow conversion and channel names
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so a missing file or an empty section behaves exactly like the built-in
//! constants.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the reconciliation engine.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$RFTPLT_CONFIG` env var
/// 2. `./rft_plt.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time-step label formatting
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Accumulated flow tuning
    #[serde(default)]
    pub flow: FlowConfig,

    /// Well-log channel name lists
    #[serde(default)]
    pub channels: ChannelNamesConfig,
}

impl EngineConfig {
    /// Environment variable naming an explicit config file.
    pub const ENV_VAR: &'static str = "RFTPLT_CONFIG";

    /// Config file looked up in the working directory.
    pub const LOCAL_FILE: &'static str = "rft_plt.toml";

    /// Load configuration using the standard search order:
    /// 1. `$RFTPLT_CONFIG` environment variable
    /// 2. `./rft_plt.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(Self::ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from RFTPLT_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from RFTPLT_CONFIG, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "RFTPLT_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(Self::LOCAL_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./rft_plt.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./rft_plt.toml, using defaults");
                }
            }
        }

        info!("No rft_plt.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Engine config saved");
        Ok(())
    }

    /// Validate all values.
    ///
    /// Rules:
    /// - Gas conversion factors must be finite and positive
    /// - Date and time formats must be non-empty, valid strftime patterns
    /// - Every channel name list must be non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.flow;
        Self::check_factor(
            f.field_gas_to_oil_equivalent,
            "flow.field_gas_to_oil_equivalent",
            &mut errors,
        );
        Self::check_factor(
            f.metric_gas_to_oil_equivalent,
            "flow.metric_gas_to_oil_equivalent",
            &mut errors,
        );

        let t = &self.timeline;
        if t.date_format.trim().is_empty() {
            errors.push("timeline.date_format must not be empty".to_string());
        } else if !is_valid_strftime(&t.date_format) {
            errors.push(format!(
                "timeline.date_format '{}' is not a valid strftime pattern",
                t.date_format
            ));
        }
        if t.time_format.trim().is_empty() {
            errors.push("timeline.time_format must not be empty".to_string());
        } else if !is_valid_strftime(&t.time_format) {
            errors.push(format!(
                "timeline.time_format '{}' is not a valid strftime pattern",
                t.time_format
            ));
        }

        let c = &self.channels;
        for (name, list) in [
            ("channels.pressure", &c.pressure),
            ("channels.oil", &c.oil),
            ("channels.gas", &c.gas),
            ("channels.water", &c.water),
            ("channels.total", &c.total),
        ] {
            if list.is_empty() {
                errors.push(format!("{name} must list at least one channel name"));
            }
        }

        let (range_errors, range_warnings) = super::validation::validate_value_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_factor(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass
        if !value.is_finite() {
            errors.push(format!("{name}: value must be finite (got {value})"));
            return;
        }
        if value <= 0.0 {
            errors.push(format!("{name}: value must be > 0 (got {value})"));
        }
    }
}

/// True when chrono can parse every item of the pattern.
pub fn is_valid_strftime(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Timeline
// ============================================================================

/// Formatting of time-step labels in the selection list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Appended to the date only when two time steps share a day
    #[serde(default = "default_time_format")]
    pub time_format: String,

    #[serde(default = "default_tag_separator")]
    pub tag_separator: String,
}

fn default_date_format() -> String {
    defaults::DEFAULT_DATE_FORMAT.to_string()
}
fn default_time_format() -> String {
    defaults::DEFAULT_TIME_FORMAT.to_string()
}
fn default_tag_separator() -> String {
    defaults::DEFAULT_TAG_SEPARATOR.to_string()
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            time_format: default_time_format(),
            tag_separator: default_tag_separator(),
        }
    }
}

// ============================================================================
// Flow
// ============================================================================

/// Accumulated flow tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Field units: multiplier from Mscf/day gas to BOE/day
    #[serde(default = "default_field_gas_to_oil_equivalent")]
    pub field_gas_to_oil_equivalent: f64,

    /// Metric units: multiplier from Sm3/day gas to kSm3/day
    #[serde(default = "default_metric_gas_to_oil_equivalent")]
    pub metric_gas_to_oil_equivalent: f64,

    /// Downstream branches with at most this many result points are
    /// folded into the connecting cell's own flow
    #[serde(default = "default_short_branch_point_limit")]
    pub short_branch_point_limit: usize,
}

fn default_field_gas_to_oil_equivalent() -> f64 {
    defaults::FIELD_GAS_TO_OIL_EQUIVALENT
}
fn default_metric_gas_to_oil_equivalent() -> f64 {
    defaults::METRIC_GAS_TO_OIL_EQUIVALENT
}
fn default_short_branch_point_limit() -> usize {
    defaults::SHORT_BRANCH_POINT_LIMIT
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            field_gas_to_oil_equivalent: default_field_gas_to_oil_equivalent(),
            metric_gas_to_oil_equivalent: default_metric_gas_to_oil_equivalent(),
            short_branch_point_limit: default_short_branch_point_limit(),
        }
    }
}

// ============================================================================
// Channel Names
// ============================================================================

/// Well-log channel names per quantity.
///
/// A name starting with `^` is a regex matched against the whole channel
/// name; other names match case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelNamesConfig {
    #[serde(default = "default_pressure_channels")]
    pub pressure: Vec<String>,

    #[serde(default = "default_oil_channels")]
    pub oil: Vec<String>,

    #[serde(default = "default_gas_channels")]
    pub gas: Vec<String>,

    #[serde(default = "default_water_channels")]
    pub water: Vec<String>,

    #[serde(default = "default_total_channels")]
    pub total: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn default_pressure_channels() -> Vec<String> {
    owned(defaults::PRESSURE_CHANNEL_NAMES)
}
fn default_oil_channels() -> Vec<String> {
    owned(defaults::OIL_CHANNEL_NAMES)
}
fn default_gas_channels() -> Vec<String> {
    owned(defaults::GAS_CHANNEL_NAMES)
}
fn default_water_channels() -> Vec<String> {
    owned(defaults::WATER_CHANNEL_NAMES)
}
fn default_total_channels() -> Vec<String> {
    owned(defaults::TOTAL_CHANNEL_NAMES)
}

impl Default for ChannelNamesConfig {
    fn default() -> Self {
        Self {
            pressure: default_pressure_channels(),
            oil: default_oil_channels(),
            gas: default_gas_channels(),
            water: default_water_channels(),
            total: default_total_channels(),
        }
    }
}
