use crate::error::RegistryError;
use crate::log_debug;
use crate::modal::SizeHint;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Delay between hiding a modal and removing it, matching a typical exit transition
pub const DEFAULT_GRACE_DELAY_MS: u64 = 200;

/// Upper bound for `grace_delay_ms`
pub const MAX_GRACE_DELAY_MS: u64 = 60_000;

/// Configuration for a [`crate::ModalRegistry`]
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Milliseconds between a close request and settlement/removal
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,
    /// Size hint used by `open_default`
    #[serde(default)]
    pub default_size: SizeHint,
    /// Buffer size of the change event broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_grace_delay_ms() -> u64 {
    DEFAULT_GRACE_DELAY_MS
}

fn default_event_capacity() -> usize {
    64
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            grace_delay_ms: default_grace_delay_ms(),
            default_size: SizeHint::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl RegistryConfig {
    /// Parse a TOML document; missing keys fall back to their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Invalid modal registry configuration format")?;
        config.validate()?;
        log_debug!("Registry configuration parsed: {:?}", config);
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load registry config: {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.grace_delay_ms > MAX_GRACE_DELAY_MS {
            return Err(RegistryError::InvalidConfig(format!(
                "grace_delay_ms must be at most {MAX_GRACE_DELAY_MS}, got {}",
                self.grace_delay_ms
            )));
        }
        if self.event_capacity == 0 {
            return Err(RegistryError::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    pub fn with_grace_delay(mut self, delay: Duration) -> Self {
        self.grace_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_default_size(mut self, size: SizeHint) -> Self {
        self.default_size = size;
        self
    }
}
