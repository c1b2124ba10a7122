//! Error types for loading and resolution.
//!
//! Wraps the engine's [`ConfigError`] and adds the failure modes that only
//! exist once files are involved: I/O and syntax errors.

use std::path::PathBuf;

use optstack_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while loading sources or resolving options.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Registry, merge or argv failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A config file exists but is not valid JSON.
    #[error("invalid json config `{}`: {source}", path.display())]
    UnparsableConfigFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A file could not be read for a reason other than not existing.
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A definitions file is not valid YAML or JSON.
    #[error("invalid definitions file: {0}")]
    Definitions(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
