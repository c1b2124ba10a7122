//! Option definitions read from a YAML or JSON file.
//!
//! The document maps option names to declarations. Besides the full mapping
//! form, two compact forms are accepted:
//!
//! ```yaml
//! verbose: v                      # short flags only
//! quiet: null                     # no short, env, marker or default
//! name: [n, NAME, "="]            # [short, env, required, default]
//! include: [I, null, "=", []]
//! server.port:
//!   short: p
//!   env: PORT
//!   required: "=PORT"
//!   default: 8080
//! ```

use std::path::{Path, PathBuf};

use optstack_core::{ConfigError, OptionDefinitions, OptionSpec};
use serde_yaml::Value as Yaml;

use crate::error::{LoadError, Result};

/// A parsed definitions document.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionsFile {
    path: Option<PathBuf>,
    definitions: OptionDefinitions,
}

impl DefinitionsFile {
    /// Reads and parses a definitions file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if the file cannot be read, [`LoadError::Definitions`]
    /// for YAML syntax errors, and [`LoadError::Config`] for declarations of
    /// the wrong shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file = Self::parse(&text)?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Parses definitions from text.
    ///
    /// # Examples
    ///
    /// ```
    /// use optstack_loader::DefinitionsFile;
    ///
    /// let file = DefinitionsFile::parse("verbose: v\nname: [n, NAME, '=']\n").unwrap();
    /// let defs = file.definitions();
    /// assert_eq!(defs.len(), 2);
    ///
    /// let (name, spec) = defs.iter().nth(1).unwrap();
    /// assert_eq!(name, "name");
    /// assert_eq!(spec.env.as_deref(), Some("NAME"));
    /// assert_eq!(spec.required.as_deref(), Some("="));
    /// ```
    ///
    /// # Errors
    ///
    /// [`LoadError::Definitions`] for syntax errors;
    /// [`ConfigError::InvalidArgumentType`] when the document is not a
    /// mapping; [`ConfigError::InvalidOptionDefinition`] for a declaration of
    /// the wrong shape.
    pub fn parse(text: &str) -> Result<Self> {
        let document: Yaml = if text.trim().is_empty() {
            Yaml::Null
        } else {
            serde_yaml::from_str(text)?
        };
        let mapping = match document {
            Yaml::Mapping(mapping) => mapping,
            Yaml::Null => serde_yaml::Mapping::new(),
            _ => {
                return Err(ConfigError::InvalidArgumentType(
                    "option definitions must be a mapping".to_string(),
                )
                .into());
            }
        };

        let mut definitions = OptionDefinitions::new();
        for (key, value) in &mapping {
            let Some(name) = key.as_str() else {
                return Err(ConfigError::InvalidArgumentType(format!(
                    "option name must be a string, got {}",
                    describe(key)
                ))
                .into());
            };
            definitions.push(name, parse_spec(name, value)?);
        }
        tracing::debug!(options = definitions.len(), "parsed option definitions");

        Ok(Self {
            path: None,
            definitions,
        })
    }

    /// The file this was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn definitions(&self) -> &OptionDefinitions {
        &self.definitions
    }

    pub fn into_definitions(self) -> OptionDefinitions {
        self.definitions
    }
}

fn parse_spec(name: &str, value: &Yaml) -> Result<OptionSpec> {
    let invalid = |reason: String| {
        LoadError::from(ConfigError::InvalidOptionDefinition {
            option: name.to_string(),
            reason,
        })
    };

    match value {
        Yaml::Null => Ok(OptionSpec::new()),
        Yaml::String(short) => Ok(non_empty(short)
            .map(OptionSpec::flag)
            .unwrap_or_default()),
        Yaml::Sequence(items) => {
            if items.len() > 4 {
                return Err(invalid(format!(
                    "expected at most 4 entries, got {}",
                    items.len()
                )));
            }
            let field = |index: usize, label: &str| -> Result<Option<String>> {
                match items.get(index) {
                    None => Ok(None),
                    Some(item) => text_field(item, label).map_err(invalid),
                }
            };
            let mut spec = OptionSpec::new();
            spec.short = field(0, "short")?;
            spec.env = field(1, "env")?;
            spec.required = field(2, "required")?;
            if let Some(default) = items.get(3) {
                spec.default = Some(to_json(default).map_err(invalid)?);
            }
            Ok(spec)
        }
        Yaml::Mapping(fields) => {
            let mut spec = OptionSpec::new();
            for (key, item) in fields {
                match key.as_str() {
                    Some("short") => spec.short = text_field(item, "short").map_err(invalid)?,
                    Some("env") => spec.env = text_field(item, "env").map_err(invalid)?,
                    Some("required") => {
                        spec.required = text_field(item, "required").map_err(invalid)?
                    }
                    Some("default") => spec.default = Some(to_json(item).map_err(invalid)?),
                    _ => return Err(invalid(format!("unknown field {}", describe(key)))),
                }
            }
            Ok(spec)
        }
        other => Err(invalid(format!(
            "expected null, a string, a sequence or a mapping, got {}",
            describe(other)
        ))),
    }
}

/// Reads a `short`/`env`/`required` entry. Null, `false` and the empty string
/// mean "absent".
fn text_field(value: &Yaml, label: &str) -> std::result::Result<Option<String>, String> {
    match value {
        Yaml::Null | Yaml::Bool(false) => Ok(None),
        Yaml::String(text) => Ok(non_empty(text).map(str::to_string)),
        other => Err(format!("{label} must be a string, got {}", describe(other))),
    }
}

fn to_json(value: &Yaml) -> std::result::Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| format!("default is not representable: {err}"))
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

fn describe(value: &Yaml) -> String {
    match value {
        Yaml::Null => "null".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::String(s) => format!("`{s}`"),
        Yaml::Sequence(_) => "a sequence".to_string(),
        Yaml::Mapping(_) => "a mapping".to_string(),
        Yaml::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
    }
}
