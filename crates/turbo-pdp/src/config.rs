//! Controller configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use turbo_observability::{LogFormat, LogLevel};

use crate::error::PdpError;

/// Tunables for a product options controller.
///
/// Every key is optional; a missing key keeps its default.
///
/// ```toml
/// button_disabled_class = "disabled"
/// checkout_path = "/checkout"
/// spinner_delay_ms = 800
/// message_clear_ms = 30000
/// log_level = "debug"
/// log_format = "human"
/// api_base_url = ""
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdpConfig {
    /// Class added to purchase buttons while they are unavailable.
    pub button_disabled_class: String,

    /// Path the browser is sent to after a successful cart add.
    pub checkout_path: String,

    /// Delay before the add-to-cart spinner is removed after success.
    pub spinner_delay_ms: u64,

    /// Delay before the product message is cleared after a cart add.
    pub message_clear_ms: u64,

    /// Minimum level for controller logs.
    pub log_level: LogLevel,

    /// Output format for controller logs.
    pub log_format: LogFormat,

    /// Storefront origin for remote calls. Empty means same origin.
    pub api_base_url: String,
}

impl Default for PdpConfig {
    fn default() -> Self {
        Self {
            button_disabled_class: "disabled".to_string(),
            checkout_path: "/checkout".to_string(),
            spinner_delay_ms: 800,
            message_clear_ms: 30_000,
            log_level: LogLevel::Info,
            log_format: LogFormat::Json,
            api_base_url: String::new(),
        }
    }
}

impl PdpConfig {
    /// Load config from a file (`.json` or TOML).
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = if path.ends_with(".json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .with_context(|| format!("Failed to parse config: {}", path))?;

        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, PdpError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, PdpError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| PdpError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the controller cannot work with.
    pub fn validate(&self) -> Result<(), PdpError> {
        if self.button_disabled_class.is_empty()
            || self.button_disabled_class.chars().any(char::is_whitespace)
        {
            return Err(PdpError::InvalidConfig(format!(
                "button_disabled_class must be a single class name, got {:?}",
                self.button_disabled_class
            )));
        }
        if !self.checkout_path.starts_with('/') {
            return Err(PdpError::InvalidConfig(format!(
                "checkout_path must start with '/', got {:?}",
                self.checkout_path
            )));
        }
        Ok(())
    }

    /// Spinner removal delay after a successful cart add.
    pub fn spinner_delay(&self) -> Duration {
        Duration::from_millis(self.spinner_delay_ms)
    }

    /// Message auto-clear delay.
    pub fn message_clear_delay(&self) -> Duration {
        Duration::from_millis(self.message_clear_ms)
    }
}
