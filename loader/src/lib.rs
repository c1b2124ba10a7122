//! Loading and the full resolution pipeline for `optstack`.
//!
//! The core crate merges values it is handed; this crate supplies them from
//! disk and drives the sources in order.
//!
//! - [`resolve`] / [`Resolver`]: defaults, config files, environment and
//!   command line, applied in that order.
//! - [`load_config_file`]: flattens one JSON config file into a merger.
//! - [`DefinitionsFile`]: option definitions kept in a YAML or JSON file.
//!
//! # Quick start
//!
//! ```no_run
//! use optstack_loader::{DefinitionsFile, Resolver};
//!
//! let file = DefinitionsFile::load("options.yaml").unwrap();
//! let resolution = Resolver::new(file.definitions())
//!     .env(std::env::vars().collect())
//!     .args(std::env::args().skip(1))
//!     .config_file("~/.apprc.json")
//!     .config_file("app.json")
//!     .resolve()
//!     .unwrap();
//!
//! println!("{}", resolution.tree.to_json());
//! ```

mod config_file;
mod definitions;
mod error;
mod resolve;

pub use config_file::{apply_config_json, load_config_file};
pub use definitions::DefinitionsFile;
pub use error::{LoadError, Result};
pub use resolve::{Resolution, Resolver, resolve};
