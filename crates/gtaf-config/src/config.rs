//! Gate configuration schema and loading.
//!
//! A `GateConfig` is deserialized from TOML. Both tables are optional; an
//! empty document yields the defaults (protocol version `0.1`, no log
//! filter override). Unknown keys are rejected so a typo never silently
//! widens or narrows what the gate accepts.
//!
//! Example:
//! ```toml
//! [gate]
//! supported_versions = ["0.1"]
//!
//! [logging]
//! filter = "info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gtaf_contracts::{
    drc::PROJECTION_CONTRACT_VERSION,
    error::{GtafError, GtafResult},
};
use gtaf_core::Enforcer;

/// The top-level structure deserialized from a gate configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    #[serde(default)]
    pub gate: GateSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[gate]`: what the enforcer accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSection {
    /// Protocol versions a DRC may declare in `gtaf_ref.version`.
    #[serde(default = "default_supported_versions")]
    pub supported_versions: Vec<String>,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            supported_versions: default_supported_versions(),
        }
    }
}

fn default_supported_versions() -> Vec<String> {
    vec![PROJECTION_CONTRACT_VERSION.to_string()]
}

/// `[logging]`: defaults for the tracing subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// An `EnvFilter` directive, used when `RUST_LOG` is not set.
    pub filter: Option<String>,
}

impl GateConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `GtafError::ConfigError` if the TOML is malformed, does not
    /// match `GateConfig`, or lists no supported versions.
    pub fn from_toml_str(s: &str) -> GtafResult<Self> {
        let config: GateConfig = toml::from_str(s).map_err(|e| GtafError::ConfigError {
            reason: format!("failed to parse gate config TOML: {}", e),
        })?;
        config.validate()?;
        debug!(
            supported_versions = ?config.gate.supported_versions,
            "gate config loaded"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as gate configuration.
    pub fn from_file(path: &Path) -> GtafResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GtafError::ConfigError {
            reason: format!("failed to read gate config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> GtafResult<()> {
        if self.gate.supported_versions.is_empty() {
            return Err(GtafError::ConfigError {
                reason: "gate.supported_versions is empty; every DRC would be denied".to_string(),
            });
        }
        if self.gate.supported_versions.iter().any(|v| v.trim().is_empty()) {
            return Err(GtafError::ConfigError {
                reason: "gate.supported_versions contains a blank version".to_string(),
            });
        }
        Ok(())
    }

    /// Build the enforcer this configuration describes.
    pub fn enforcer(&self) -> Enforcer {
        Enforcer::new(self.gate.supported_versions.iter().cloned())
    }
}

impl From<&GateConfig> for Enforcer {
    fn from(config: &GateConfig) -> Self {
        config.enforcer()
    }
}
