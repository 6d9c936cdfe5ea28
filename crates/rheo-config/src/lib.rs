//! Configuration for rheo hosts.
//!
//! A host reads one TOML file at startup, installs the numeric backend it
//! names, and builds its mergers from the merge defaults.
//!
//! # Example
//!
//! ```rust,no_run
//! use rheo_config::RheoConfig;
//! use rheo_core::Signal;
//!
//! let config = RheoConfig::load("rheo.toml").unwrap();
//! config.apply();
//!
//! let mut merger = config.merge.build::<Signal>();
//! merger.add_input(Signal::empty()).unwrap();
//! ```
//!
//! The `RHEO_BACKEND` environment variable (`"block"` or `"scalar"`) takes
//! precedence over the file's `backend` key when loading with
//! [`RheoConfig::load`].

mod config;
mod error;

pub use config::{BACKEND_ENV, MergeConfig, RheoConfig};
pub use error::{ConfigError, FileAction};
