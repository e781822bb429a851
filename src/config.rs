use serde::Deserialize;
use std::path::Path;

use crate::logging::{LogRotation, LoggingConfig};
use crate::ticks::precision::DEFAULT_GRID_TOLERANCE;
use crate::ticks::{OrderflowError, OrderingPolicy, PriceQuantizer};

fn default_increment() -> f64 {
    0.25
}

fn default_tolerance() -> f64 {
    DEFAULT_GRID_TOLERANCE
}

fn default_true() -> bool {
    true
}

/// Price grid configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Instrument tick size
    #[serde(default = "default_increment")]
    pub increment: f64,
    /// Allowed distance from the grid, in increments
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Reject off-grid prices instead of snapping them
    #[serde(default = "default_true")]
    pub strict: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            increment: default_increment(),
            tolerance: default_tolerance(),
            strict: true,
        }
    }
}

/// Analytics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub ordering: OrderingPolicy,
    #[serde(default = "default_true")]
    pub poc_enabled: bool,
    /// Minimum print size for the volume profile (0 disables the filter)
    #[serde(default)]
    pub min_print_volume: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::Reject,
            poc_enabled: true,
            min_print_volume: 0,
        }
    }
}

/// Logging configuration from config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingTomlConfig {
    pub log_dir: Option<String>,
    pub level_filter: Option<String>,
    pub rotation: Option<String>, // "daily" or "hourly"
    pub console_timestamps: Option<bool>,
    pub json: Option<bool>,
}

/// Full TOML configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderflowConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub logging: LoggingTomlConfig,
}

impl OrderflowConfig {
    /// Load configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, OrderflowError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OrderflowError> {
        let config: OrderflowConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OrderflowError> {
        self.quantizer()
            .map_err(|e| OrderflowError::Config(format!("[pricing] {}", e)))?;
        self.logging_config()?;
        Ok(())
    }

    /// Build the price quantizer described by `[pricing]`
    pub fn quantizer(&self) -> Result<PriceQuantizer, OrderflowError> {
        PriceQuantizer::with_tolerance(self.pricing.increment, self.pricing.tolerance, self.pricing.strict)
    }

    /// Convert the `[logging]` table, filling unset fields from the defaults
    pub fn logging_config(&self) -> Result<LoggingConfig, OrderflowError> {
        let defaults = LoggingConfig::default();
        let rotation = match self.logging.rotation.as_deref() {
            None | Some("daily") => LogRotation::Daily,
            Some("hourly") => LogRotation::Hourly,
            Some(other) => {
                return Err(OrderflowError::Config(format!(
                    "[logging] unknown rotation '{}', expected 'daily' or 'hourly'",
                    other
                )))
            }
        };

        Ok(LoggingConfig {
            log_dir: self.logging.log_dir.clone().unwrap_or(defaults.log_dir),
            level_filter: self.logging.level_filter.clone().unwrap_or(defaults.level_filter),
            rotation,
            console_timestamps: self.logging.console_timestamps.unwrap_or(defaults.console_timestamps),
            file_json_format: self.logging.json.unwrap_or(defaults.file_json_format),
        })
    }
}
