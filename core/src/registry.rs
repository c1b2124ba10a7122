//! Option registry: the lookup tables compiled from option definitions.
//!
//! Built once from [`OptionDefinitions`] and immutable afterwards. Building
//! validates every declaration:
//!
//! - option names must be dotted identifiers (see
//!   [`is_option_name`](crate::is_option_name));
//! - short-flag characters must be in the short-flag class and may be
//!   claimed by only one option;
//! - environment variable names may be claimed by only one option;
//! - defaults must be scalars or flat arrays of scalars.
//!
//! # Examples
//!
//! ```
//! use optstack_core::*;
//!
//! let defs = OptionDefinitions::new()
//!     .option("verbose", OptionSpec::flag("v"))
//!     .option("name", OptionSpec::flag("n").with_env("NAME").with_required("="));
//! let registry = OptionRegistry::build(&defs).unwrap();
//!
//! assert_eq!(registry.short_option('n'), Some("name"));
//! assert_eq!(registry.env_option("NAME"), Some("name"));
//! assert!(registry.is_mandatory("name"));
//! assert!(registry.marker("verbose").is_none());
//!
//! // A second option claiming `-v` is rejected.
//! let dup = defs.clone().option("version", OptionSpec::flag("v"));
//! assert!(OptionRegistry::build(&dup).is_err());
//! ```

use std::collections::{HashMap, HashSet};

use crate::classify::{is_option_name, is_short_flag_char};
use crate::error::{ConfigError, Result};
use crate::types::{OptionDefinitions, RequiredMarker, Value};

/// Compiled lookup tables for declared options.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    names: HashSet<String>,
    short_to_name: HashMap<char, String>,
    env_bindings: Vec<(String, String)>,
    required_by_name: HashMap<String, RequiredMarker>,
    defaults: Vec<(String, Value)>,
}

impl OptionRegistry {
    /// Validates `definitions` and compiles the lookup tables.
    ///
    /// Defaults are validated and kept in declaration order; they are
    /// written into a tree by [`Merger::apply_defaults`](crate::Merger::apply_defaults).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOptionDefinition`] for a bad name, a bad
    /// or duplicate short flag, or a duplicate environment name, and
    /// [`ConfigError::InvalidValue`] for a composite default.
    pub fn build(definitions: &OptionDefinitions) -> Result<Self> {
        let mut registry = Self::default();
        let mut claimed_env: HashSet<&str> = HashSet::new();

        for (name, spec) in definitions.iter() {
            if !is_option_name(name) {
                return Err(ConfigError::definition(name, "invalid name"));
            }
            if !registry.names.insert(name.to_string()) {
                return Err(ConfigError::definition(name, "duplicate option"));
            }

            if let Some(short) = spec.short.as_deref().filter(|s| !s.is_empty()) {
                for c in short.chars() {
                    if !is_short_flag_char(c) {
                        return Err(ConfigError::definition(name, "invalid short"));
                    }
                    if registry.short_to_name.contains_key(&c) {
                        return Err(ConfigError::definition(format!("-{c}"), "duplicate short"));
                    }
                    registry.short_to_name.insert(c, name.to_string());
                }
            }

            if let Some(env) = spec.env.as_deref().filter(|s| !s.is_empty()) {
                if !claimed_env.insert(env) {
                    return Err(ConfigError::definition(env, "duplicate env"));
                }
                registry
                    .env_bindings
                    .push((env.to_string(), name.to_string()));
            }

            if let Some(marker) = spec.required.as_deref().and_then(RequiredMarker::parse) {
                registry.required_by_name.insert(name.to_string(), marker);
            }

            if let Some(default) = &spec.default {
                let value = Value::from_json(&format!("OPTIONS:{name}"), default)?;
                registry.defaults.push((name.to_string(), value));
            }
        }

        tracing::debug!(
            options = registry.names.len(),
            short_flags = registry.short_to_name.len(),
            env_bindings = registry.env_bindings.len(),
            "built option registry"
        );
        Ok(registry)
    }

    /// Returns `true` if `name` was declared.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Option bound to a short-flag character.
    pub fn short_option(&self, flag: char) -> Option<&str> {
        self.short_to_name.get(&flag).map(String::as_str)
    }

    /// Option bound to an environment variable name.
    pub fn env_option(&self, env: &str) -> Option<&str> {
        self.env_bindings
            .iter()
            .find(|(name, _)| name == env)
            .map(|(_, option)| option.as_str())
    }

    /// `(env name, option name)` pairs in declaration order.
    pub fn env_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env_bindings
            .iter()
            .map(|(env, option)| (env.as_str(), option.as_str()))
    }

    /// `(short flag, option name)` pairs, sorted by flag.
    pub fn short_flags(&self) -> Vec<(char, &str)> {
        let mut flags: Vec<_> = self
            .short_to_name
            .iter()
            .map(|(c, name)| (*c, name.as_str()))
            .collect();
        flags.sort_unstable();
        flags
    }

    /// Required marker registered for `name`; `None` means flag-only.
    pub fn marker(&self, name: &str) -> Option<&RequiredMarker> {
        self.required_by_name.get(name)
    }

    /// Returns `true` if `name` demands a value.
    pub fn is_mandatory(&self, name: &str) -> bool {
        self.marker(name).is_some_and(RequiredMarker::is_mandatory)
    }

    /// Declared defaults in declaration order.
    pub fn defaults(&self) -> &[(String, Value)] {
        &self.defaults
    }

    /// Number of declared options.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{OptionSpec, Scalar};

    fn invalid_definition(result: Result<OptionRegistry>) -> (String, String) {
        match result {
            Err(ConfigError::InvalidOptionDefinition { option, reason }) => (option, reason),
            other => panic!("expected InvalidOptionDefinition, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_bad_names() {
        for name in ["v", "server.p", "1abc", "server-port", "", "a..bb"] {
            let defs = OptionDefinitions::new().option(name, OptionSpec::new());
            let (option, reason) = invalid_definition(OptionRegistry::build(&defs));
            assert_eq!(option, name);
            assert_eq!(reason, "invalid name");
        }
    }

    #[test]
    fn test_build_rejects_bad_short_characters() {
        for short in ["-", "=", " ", "v-", "é"] {
            let defs = OptionDefinitions::new().option("verbose", OptionSpec::flag(short));
            let (_, reason) = invalid_definition(OptionRegistry::build(&defs));
            assert_eq!(reason, "invalid short", "{short:?}");
        }
    }

    #[test]
    fn test_build_rejects_duplicate_short() {
        let defs = OptionDefinitions::new()
            .option("verbose", OptionSpec::flag("vV"))
            .option("version", OptionSpec::flag("V"));
        let (option, reason) = invalid_definition(OptionRegistry::build(&defs));
        assert_eq!(option, "-V");
        assert_eq!(reason, "duplicate short");
    }

    #[test]
    fn test_build_rejects_repeated_short_within_option() {
        let defs = OptionDefinitions::new().option("verbose", OptionSpec::flag("vv"));
        let (option, _) = invalid_definition(OptionRegistry::build(&defs));
        assert_eq!(option, "-v");
    }

    #[test]
    fn test_build_rejects_duplicate_env() {
        let defs = OptionDefinitions::new()
            .option("name", OptionSpec::new().with_env("APP_NAME"))
            .option("title", OptionSpec::new().with_env("APP_NAME"));
        let (option, reason) = invalid_definition(OptionRegistry::build(&defs));
        assert_eq!(option, "APP_NAME");
        assert_eq!(reason, "duplicate env");
    }

    #[test]
    fn test_build_rejects_duplicate_option_name() {
        let defs = OptionDefinitions::new()
            .option("name", OptionSpec::new())
            .option("name", OptionSpec::new());
        let (_, reason) = invalid_definition(OptionRegistry::build(&defs));
        assert_eq!(reason, "duplicate option");
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let defs = OptionDefinitions::new()
            .option("alpha", OptionSpec::new().with_short("").with_env("").with_required(""))
            .option("beta", OptionSpec::new().with_env(""));
        let registry = OptionRegistry::build(&defs).unwrap();
        assert!(registry.short_flags().is_empty());
        assert_eq!(registry.env_bindings().count(), 0);
        assert!(registry.marker("alpha").is_none());
    }

    #[test]
    fn test_markers_and_lookups() {
        let defs = OptionDefinitions::new()
            .option("level", OptionSpec::flag("l").with_required("[LEVEL]"))
            .option("server.port", OptionSpec::flag("p").with_env("PORT").with_required("=PORT"));
        let registry = OptionRegistry::build(&defs).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("server.port"));
        assert!(!registry.contains("server"));
        assert!(!registry.is_mandatory("level"));
        assert_eq!(registry.marker("level").unwrap().as_str(), "[LEVEL]");
        assert!(registry.is_mandatory("server.port"));
        assert_eq!(registry.short_flags(), vec![('l', "level"), ('p', "server.port")]);
        assert_eq!(registry.env_option("PORT"), Some("server.port"));
        assert_eq!(registry.env_option("HOME"), None);
    }

    #[test]
    fn test_env_bindings_keep_declaration_order() {
        let defs = OptionDefinitions::new()
            .option("zeta", OptionSpec::new().with_env("Z"))
            .option("alpha", OptionSpec::new().with_env("A"));
        let registry = OptionRegistry::build(&defs).unwrap();
        let bindings: Vec<_> = registry.env_bindings().collect();
        assert_eq!(bindings, vec![("Z", "zeta"), ("A", "alpha")]);
    }

    #[test]
    fn test_defaults_are_validated_and_kept() {
        let defs = OptionDefinitions::new()
            .option("tags", OptionSpec::flag("t").with_required("=").with_default(json!([])))
            .option("port", OptionSpec::new().with_required("=").with_default(json!(80)));
        let registry = OptionRegistry::build(&defs).unwrap();
        assert_eq!(
            registry.defaults(),
            &[
                ("tags".to_string(), Value::List(Vec::new())),
                ("port".to_string(), Value::Scalar(Scalar::Number(80.0))),
            ]
        );

        let bad = OptionDefinitions::new()
            .option("tags", OptionSpec::new().with_default(json!({"a": 1})));
        assert_eq!(
            OptionRegistry::build(&bad).unwrap_err(),
            ConfigError::InvalidValue {
                origin: "OPTIONS:tags".to_string()
            }
        );
    }
}
