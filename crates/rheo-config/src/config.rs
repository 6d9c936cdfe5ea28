//! Configuration file format and startup wiring.

use serde::{Deserialize, Serialize};
use std::path::Path;

use rheo_core::backend::{self, BackendKind};
use rheo_core::Container;
use rheo_modules::{LengthConflictStrategy, Merge, MergeStrategy};

use crate::error::{ConfigError, FileAction};

/// Environment variable overriding [`RheoConfig::backend`].
pub const BACKEND_ENV: &str = "RHEO_BACKEND";

/// Process-wide settings.
///
/// Every key is optional; missing keys take their defaults.
///
/// # TOML Format
///
/// ```toml
/// backend = "block"
///
/// [merge]
/// strategy = "first_signal_first"
/// length_conflict = "raise_error"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RheoConfig {
    /// Numeric backend for container arithmetic.
    pub backend: BackendKind,

    /// Defaults for newly built mergers.
    pub merge: MergeConfig,
}

/// Strategies a merger starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Output channel order.
    pub strategy: MergeStrategy,

    /// Handling of inputs with different lengths.
    pub length_conflict: LengthConflictStrategy,
}

impl MergeConfig {
    /// A merger with these strategies and no inputs.
    pub fn build<C: Container>(&self) -> Merge<C> {
        Merge::with_strategies(self.strategy, self.length_conflict)
    }
}

impl RheoConfig {
    /// Parse a configuration from a TOML string. Environment overrides are
    /// not consulted.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a configuration file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::file(FileAction::Read, path, e))?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        tracing::debug!(path = %path.display(), backend = %config.backend, "config loaded");
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::file(FileAction::CreateParent, parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::file(FileAction::Write, path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    ///
    /// [`load`](RheoConfig::load) passes the process environment. Only
    /// [`BACKEND_ENV`] is consulted.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(BACKEND_ENV) {
            self.backend = value
                .parse()
                .map_err(|source| ConfigError::InvalidOverride {
                    variable: BACKEND_ENV,
                    value: value.clone(),
                    source,
                })?;
            tracing::debug!(backend = %self.backend, "{BACKEND_ENV} override");
        }
        Ok(())
    }

    /// Installs the configured backend for the whole process.
    ///
    /// The backend can only be chosen once. If another one is already in use
    /// it stays, a warning is logged, and the backend in use is returned.
    pub fn apply(&self) -> BackendKind {
        match backend::install(self.backend) {
            Ok(()) => {
                tracing::info!(backend = %self.backend, "numeric backend installed");
                self.backend
            }
            Err(current) => {
                tracing::warn!(
                    requested = %self.backend,
                    active = %current,
                    "numeric backend already installed, keeping it"
                );
                current
            }
        }
    }
}
