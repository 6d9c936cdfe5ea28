//! Configuration errors.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The file operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Reading the configuration file.
    Read,
    /// Writing the configuration file.
    Write,
    /// Creating the directory the file is saved into.
    CreateParent,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read configuration file",
            Self::Write => "write configuration file",
            Self::CreateParent => "create configuration directory",
        })
    }
}

/// Errors from loading, saving or overriding a [`RheoConfig`](crate::RheoConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file or its directory is inaccessible.
    #[error("cannot {action} '{path}': {source}")]
    File {
        /// Operation that failed.
        action: FileAction,
        /// File or directory involved.
        path: PathBuf,
        /// I/O error reported by the OS.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or names an unknown backend or strategy.
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The in-memory configuration has no TOML form.
    #[error("cannot encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    /// An environment override holds an unusable value.
    #[error("invalid value '{value}' in {variable}: {source}")]
    InvalidOverride {
        /// Name of the environment variable.
        variable: &'static str,
        /// Its raw value.
        value: String,
        /// Why the value was rejected.
        #[source]
        source: rheo_core::Error,
    },
}

impl ConfigError {
    pub(crate) fn file(action: FileAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            action,
            path: path.into(),
            source,
        }
    }
}
