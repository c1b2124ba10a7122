//! Merging single values into the configuration tree.
//!
//! Every source (defaults, config files, environment, command line) funnels
//! through [`Merger::apply`]. The option's required marker decides what a
//! value means:
//!
//! | Marker | Value present | Value absent |
//! |--------|---------------|--------------|
//! | mandatory (`=…`) | stored | `MissingValue` |
//! | optional | stored | `true` |
//! | none, raw text | diverted to positionals | `true` |
//! | none, structured | `CannotHaveValue` | `true` |
//!
//! # Examples
//!
//! ```
//! use optstack_core::*;
//!
//! let defs = OptionDefinitions::new()
//!     .option("verbose", OptionSpec::flag("v"))
//!     .option("port", OptionSpec::flag("p").with_required("="));
//! let registry = OptionRegistry::build(&defs).unwrap();
//! let mut tree = ConfigTree::new();
//! let mut positionals = Positionals::new();
//!
//! let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
//! merger.apply_text("-p", Some("port"), Some("8080")).unwrap();
//! merger.apply_text("-v", Some("verbose"), Some("extra")).unwrap();
//! merger.apply_text("", None, Some("file.txt")).unwrap();
//!
//! assert_eq!(tree.get("port").unwrap().as_scalar(), Some(&Scalar::Number(8080.0)));
//! assert!(tree.get("verbose").is_none());
//! assert_eq!(positionals.as_slice(), &[Scalar::from("extra"), Scalar::from("file.txt")]);
//! ```

use crate::coerce::coerce;
use crate::error::{ConfigError, Result};
use crate::registry::OptionRegistry;
use crate::tree::{ConfigTree, Positionals};
use crate::types::{RequiredMarker, Scalar, Value};

/// Applies values to a tree and positional list according to a registry.
pub struct Merger<'a> {
    registry: &'a OptionRegistry,
    tree: &'a mut ConfigTree,
    positionals: &'a mut Positionals,
}

impl<'a> Merger<'a> {
    pub fn new(
        registry: &'a OptionRegistry,
        tree: &'a mut ConfigTree,
        positionals: &'a mut Positionals,
    ) -> Self {
        Self {
            registry,
            tree,
            positionals,
        }
    }

    pub fn registry(&self) -> &'a OptionRegistry {
        self.registry
    }

    /// Applies one value.
    ///
    /// `origin` labels the input in errors. With `option` absent the value
    /// becomes positional. When `coerce_text` is set, string values are run
    /// through [`coerce`] first and a value handed to a flag-only option is
    /// diverted to the positionals instead of being rejected.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownOption`], [`ConfigError::MissingValue`],
    /// [`ConfigError::CannotHaveValue`], or a structural conflict from
    /// [`ConfigTree::insert`].
    pub fn apply(
        &mut self,
        origin: &str,
        option: Option<&str>,
        value: Option<Value>,
        coerce_text: bool,
    ) -> Result<()> {
        let value = match value {
            Some(Value::Scalar(Scalar::String(text))) if coerce_text => {
                Some(Value::Scalar(coerce(&text)))
            }
            other => other,
        };

        let Some(option) = option else {
            self.push_positional(value);
            return Ok(());
        };

        let registry = self.registry;
        if !registry.contains(option) {
            return Err(ConfigError::UnknownOption {
                origin: origin.to_string(),
                option: option.to_string(),
            });
        }

        match (registry.marker(option), value.is_some()) {
            (Some(RequiredMarker::Mandatory(_)), false) => {
                return Err(ConfigError::MissingValue {
                    origin: origin.to_string(),
                });
            }
            (Some(_), _) => {}
            (None, true) if coerce_text => {
                tracing::debug!(
                    origin,
                    option,
                    "flag-only option given a value, diverting to positionals"
                );
                self.push_positional(value);
                return Ok(());
            }
            (None, true) => {
                return Err(ConfigError::CannotHaveValue {
                    origin: origin.to_string(),
                });
            }
            (None, false) => {}
        }

        let value = value.unwrap_or(Value::Scalar(Scalar::Bool(true)));
        tracing::trace!(origin, option, ?value, "merging value");
        self.tree.insert(origin, option, value)
    }

    /// Applies raw text from the environment or the command line
    /// (coercion enabled).
    pub fn apply_text(
        &mut self,
        origin: &str,
        option: Option<&str>,
        text: Option<&str>,
    ) -> Result<()> {
        let value = text.map(|t| Value::Scalar(Scalar::String(t.to_string())));
        self.apply(origin, option, value, true)
    }

    /// Applies a structured value from a config file or default
    /// (coercion disabled).
    ///
    /// # Errors
    ///
    /// Additionally returns [`ConfigError::InvalidValue`] for objects and for
    /// arrays holding composites.
    pub fn apply_json(
        &mut self,
        origin: &str,
        option: Option<&str>,
        json: &serde_json::Value,
    ) -> Result<()> {
        let value = Value::from_json(origin, json)?;
        self.apply(origin, option, Some(value), false)
    }

    /// Writes the registry's declared defaults, in declaration order.
    pub fn apply_defaults(&mut self) -> Result<()> {
        let registry = self.registry;
        for (name, value) in registry.defaults() {
            let origin = format!("OPTIONS:{name}");
            self.apply(&origin, Some(name), Some(value.clone()), false)?;
        }
        Ok(())
    }

    fn push_positional(&mut self, value: Option<Value>) {
        match value {
            Some(Value::Scalar(scalar)) => self.positionals.push(scalar),
            Some(Value::List(items)) => {
                for scalar in items {
                    self.positionals.push(scalar);
                }
            }
            None => {}
        }
    }
}
