#![forbid(unsafe_code)]

//! Window configuration.
//!
//! Two options shape windowing:
//!
//! - `buffer_margin`: extent scanned beyond each viewport edge. Items inside
//!   the margin stay materialized, so small scroll deltas cause no churn.
//! - `item_spacing`: gap added between consecutive items when estimating
//!   offsets.
//!
//! Both can be overridden from the environment via [`WindowConfig::from_env`]
//! (`VWIN_BUFFER_MARGIN`, `VWIN_ITEM_SPACING`).

use std::env;
use std::fmt;

/// Environment variable overriding [`WindowConfig::buffer_margin`].
pub const ENV_BUFFER_MARGIN: &str = "VWIN_BUFFER_MARGIN";
/// Environment variable overriding [`WindowConfig::item_spacing`].
pub const ENV_ITEM_SPACING: &str = "VWIN_ITEM_SPACING";

/// Default extent kept materialized beyond each viewport edge.
pub const DEFAULT_BUFFER_MARGIN: f64 = 200.0;

/// Windowing options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// Extent beyond the viewport edges that still counts as in range.
    pub buffer_margin: f64,
    /// Gap between consecutive items for offset computation.
    pub item_spacing: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            buffer_margin: DEFAULT_BUFFER_MARGIN,
            item_spacing: 0.0,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct WindowConfigParse {
    /// Config with every valid override applied.
    pub config: WindowConfig,
    /// Overrides that were rejected.
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Field name.
    pub field: &'static str,
    /// Offending raw value.
    pub value: String,
    /// What was expected.
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl WindowConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer margin.
    #[must_use]
    pub fn with_buffer_margin(mut self, margin: f64) -> Self {
        self.buffer_margin = margin;
        self
    }

    /// Set the spacing between items.
    #[must_use]
    pub fn with_item_spacing(mut self, spacing: f64) -> Self {
        self.item_spacing = spacing;
        self
    }

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> WindowConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_extent("buffer_margin", self.buffer_margin, &mut errors);
        validate_extent("item_spacing", self.item_spacing, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Parse config overrides through `get`. Invalid values keep the default and
/// are reported in [`WindowConfigParse::errors`].
pub fn from_env_with<F>(mut get: F) -> WindowConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = WindowConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_BUFFER_MARGIN) {
        match parse_extent(&value) {
            Some(parsed) => config.buffer_margin = parsed,
            None => errors.push(ConfigError::new(
                "buffer_margin",
                value,
                "expected finite non-negative number",
            )),
        }
    }

    if let Some(value) = get(ENV_ITEM_SPACING) {
        match parse_extent(&value) {
            Some(parsed) => config.item_spacing = parsed,
            None => errors.push(ConfigError::new(
                "item_spacing",
                value,
                "expected finite non-negative number",
            )),
        }
    }

    WindowConfigParse { config, errors }
}

fn parse_extent(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn validate_extent(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ConfigError::new(
            field,
            value.to_string(),
            "must be finite and non-negative",
        ));
    }
}
