//! Composition settings.
//!
//! Loaded from TOML (`cooper.toml` by convention); every key is optional.
use std::path::Path;

use miette::Report;
use serde::{Deserialize, Serialize};

pub type ConfigLoadError = Report;

fn config_msg(message: impl Into<String>) -> ConfigLoadError {
    Report::msg(message.into())
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CooperConfig {
    /// Name of the constructor-like lifecycle method.
    pub constructor: String,

    /// Name of the finalizer lifecycle method.
    pub finalizer: String,

    /// Enforce that inner-cooperating bodies call onward exactly once
    pub check_inner_calls: bool,
}

impl Default for CooperConfig {
    fn default() -> Self {
        CooperConfig {
            constructor: "init".to_string(),
            finalizer: "finalize".to_string(),
            check_inner_calls: true,
        }
    }
}

impl CooperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        let config: CooperConfig = toml::from_str(content)
            .map_err(|e| config_msg(format!("Invalid config format: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_msg(format!("Failed to read config {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigLoadError> {
        toml::to_string_pretty(self)
            .map_err(|e| config_msg(format!("Failed to serialize config: {}", e)))
    }

    /// Lifecycle methods are provided by the universal base.
    pub fn is_lifecycle(&self, name: &str) -> bool {
        name == self.constructor || name == self.finalizer
    }

    fn check(&self) -> Result<(), ConfigLoadError> {
        if self.constructor.is_empty() || self.finalizer.is_empty() {
            return Err(config_msg("lifecycle method names must not be empty"));
        }
        if self.constructor == self.finalizer {
            return Err(config_msg(format!(
                "constructor and finalizer must differ (both are `{}`)",
                self.constructor
            )));
        }
        Ok(())
    }
}
