//! Layered option resolution: defaults, config files, environment, argv.
//!
//! This crate holds the pure engine. It never touches the filesystem or the
//! process environment; every input is a parameter.
//!
//! - [`OptionDefinitions`] / [`OptionSpec`]: what options exist, their short
//!   flags, environment names, required markers and defaults.
//! - [`OptionRegistry`]: the validated lookup tables built from the
//!   definitions.
//! - [`Merger`]: applies one value at a time to a [`ConfigTree`] and the
//!   [`Positionals`] list, enforcing required markers and structural
//!   invariants.
//! - [`read_environment`] and [`parse_args`]: the environment and
//!   command-line sources.
//! - [`coerce`]: turns raw text into a typed [`Scalar`].
//! - [`PathContext`]: tilde expansion for config-file paths.
//!
//! Config-file loading and the full resolution pipeline live in the
//! `optstack-loader` crate.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use optstack_core::*;
//! use serde_json::json;
//!
//! let defs = OptionDefinitions::new()
//!     .option("verbose", OptionSpec::flag("v"))
//!     .option("server.port", OptionSpec::flag("p").with_env("PORT").with_required("=").with_default(json!(80)))
//!     .option("include", OptionSpec::flag("I").with_required("=").with_default(json!([])));
//! let registry = OptionRegistry::build(&defs).unwrap();
//!
//! let mut tree = ConfigTree::new();
//! let mut positionals = Positionals::new();
//! let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
//!
//! merger.apply_defaults().unwrap();
//! let env = HashMap::from([("PORT".to_string(), "8080".to_string())]);
//! read_environment(&mut merger, &env).unwrap();
//! parse_args(&mut merger, &["-v", "-I", "src", "-I", "lib", "main.rs"]).unwrap();
//!
//! assert_eq!(
//!     tree.to_json(),
//!     json!({"verbose": true, "server": {"port": 8080}, "include": ["src", "lib"]})
//! );
//! assert_eq!(positionals.as_slice(), &[Scalar::from("main.rs")]);
//! ```

mod args;
mod classify;
mod coerce;
mod env;
mod error;
mod merge;
mod path;
mod registry;
mod tree;
mod types;

pub use args::parse_args;
pub use classify::{
    END_OF_OPTIONS, Token, classify_token, is_flag_token, is_option_name, is_short_flag_char,
};
pub use coerce::{coerce, parse_number};
pub use env::read_environment;
pub use error::{ConfigError, Result};
pub use merge::Merger;
pub use path::PathContext;
pub use registry::OptionRegistry;
pub use tree::{ConfigNode, ConfigTree, Positionals};
pub use types::{OptionDefinitions, OptionSpec, RequiredMarker, Scalar, Value};
