//! Configuration for FilterForge.
//!
//! Builder-level defaults (string operator, case handling, auto-register and lazy
//! compilation) loaded from TOML or YAML, so a deployment can change them without
//! code changes. Every setting can still be overridden per registration.
//!
//! # Examples
//!
//! ```
//! use filterforge_config::FilterSettings;
//! use filterforge_core::{StringComparison, StringOp};
//!
//! let settings = FilterSettings::from_toml_str(r#"
//!     default_string_op = "contains"
//!     string_comparison = "case_insensitive"
//!     auto_register = true
//! "#).unwrap();
//!
//! assert_eq!(settings.default_string_op, StringOp::Contains);
//! assert_eq!(settings.string_comparison, StringComparison::CaseInsensitive);
//! assert!(settings.auto_register);
//! assert!(!settings.lazy);
//! ```
//!
//! Fall back to defaults when the file is missing:
//!
//! ```
//! use filterforge_config::FilterSettings;
//!
//! let settings = FilterSettings::load("filters.toml").unwrap_or_default();
//! assert!(!settings.auto_register);
//! ```


use std::path::Path;

use filterforge_core::{StringComparison, StringOp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Defaults applied to every registration of a builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterSettings {
    /// Operator of auto-discovered string bindings and of string declarations
    /// that name none.
    #[serde(default)]
    pub default_string_op: StringOp,

    /// Case handling of string bindings.
    #[serde(default)]
    pub string_comparison: StringComparison,

    /// Compile unregistered pairs on first request instead of failing.
    #[serde(default)]
    pub auto_register: bool,

    /// Compile registrations on first request instead of at build time.
    #[serde(default)]
    pub lazy: bool,
}

impl FilterSettings {
    /// Creates the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// fails [`FilterSettings::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses settings from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_yaml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings no registration could honor.
    ///
    /// The default string operator applies to scalar string pairs, so the
    /// membership operators are not accepted there.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_string_op.is_membership() {
            return Err(ConfigError::Invalid(format!(
                "default_string_op cannot be {}: it applies to scalar string pairs",
                self.default_string_op
            )));
        }
        Ok(())
    }

    /// Sets the default string operator.
    pub fn with_default_string_op(mut self, op: StringOp) -> Self {
        self.default_string_op = op;
        self
    }

    /// Sets the string comparison mode.
    pub fn with_string_comparison(mut self, comparison: StringComparison) -> Self {
        self.string_comparison = comparison;
        self
    }

    /// Enables or disables auto-register mode.
    pub fn with_auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }

    /// Enables or disables lazy compilation.
    pub fn with_lazy(mut self, enabled: bool) -> Self {
        self.lazy = enabled;
        self
    }
}
