//! Error taxonomy for option registration and configuration merging.
//!
//! Every variant is fatal to the resolution call that raised it. The
//! `origin` carried by most variants is a label for the input that caused
//! the failure: a flag as typed (`-v`, `--server-port`), an environment
//! variable name, a quoted JSON key (`` `server.port` ``) or
//! `OPTIONS:<name>` for a declared default.

use thiserror::Error;

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A caller-supplied input has the wrong shape (pre-seeded tree,
    /// definitions document, non-UTF-8 path).
    #[error("invalid argument: {0}")]
    InvalidArgumentType(String),

    /// An option definition is malformed or collides with another one.
    #[error("OPTIONS:{option} {reason}")]
    InvalidOptionDefinition {
        /// Option name (or flag/env name for duplicates).
        option: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A value is a mapping, or an array holding a mapping or array.
    #[error("{origin}: invalid value")]
    InvalidValue {
        /// Where the value came from.
        origin: String,
    },

    /// The target option was never declared.
    #[error("{origin}: invalid option `{option}`")]
    UnknownOption {
        /// Where the option reference came from.
        origin: String,
        /// The undeclared option name.
        option: String,
    },

    /// A mandatory option appeared without a value.
    #[error("{origin}: must have value")]
    MissingValue {
        /// Where the option reference came from.
        origin: String,
    },

    /// A flag-only option was given a value by a structured source.
    #[error("{origin}: can't have value")]
    CannotHaveValue {
        /// Where the value came from.
        origin: String,
    },

    /// A scalar was written over a path that already holds a branch.
    #[error("{origin}: child conflict at `{path}`")]
    ChildConflict {
        /// Where the value came from.
        origin: String,
        /// Dotted path of the conflicting node.
        path: String,
    },

    /// A path was extended through a node that holds a value.
    #[error("{origin}: parent conflict at `{path}`")]
    ParentConflict {
        /// Where the value came from.
        origin: String,
        /// Dotted path of the conflicting node.
        path: String,
    },

    /// A dash-prefixed command-line token fits neither flag grammar.
    #[error("{0}: invalid option")]
    UnrecognizedCliToken(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn definition(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptionDefinition {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
