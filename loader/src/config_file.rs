//! JSON configuration files.
//!
//! A file is flattened depth-first into dotted option paths:
//!
//! ```json
//! {"server": {"port": 8080}, "tags": ["a", "b"]}
//! ```
//!
//! applies `server.port = 8080`, then `tags = "a"` and `tags = "b"`. Values
//! are taken as typed by JSON and never coerced.

use std::io::ErrorKind;
use std::path::Path;

use optstack_core::{ConfigError, Merger, PathContext};

use crate::error::{LoadError, Result};

/// Loads one config file into `merger`.
///
/// The path is tilde-expanded with `context` first. A missing file and a
/// file holding only whitespace are skipped. The whole file is parsed before
/// anything is applied, so a syntax error leaves the tree untouched.
///
/// # Errors
///
/// [`LoadError::Io`] when the file exists but cannot be read,
/// [`LoadError::UnparsableConfigFile`] for invalid JSON, and
/// [`LoadError::Config`] for values the merger rejects.
pub fn load_config_file(merger: &mut Merger<'_>, context: &PathContext, path: &Path) -> Result<()> {
    let path = context.normalize(path)?;

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, skipping");
            return Ok(());
        }
        Err(source) => return Err(LoadError::Io { path, source }),
    };

    if content.trim().is_empty() {
        tracing::debug!(path = %path.display(), "config file is empty, skipping");
        return Ok(());
    }

    let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|source| LoadError::UnparsableConfigFile {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "applying config file");
    apply_config_json(merger, &json)
}

/// Flattens an already-parsed JSON document into `merger`.
///
/// Keys are applied in document order. Scalars at the document root,
/// including those inside a root array, become positional values. Array
/// elements must be scalars; an object or array inside an array is
/// rejected with [`ConfigError::InvalidValue`].
pub fn apply_config_json(merger: &mut Merger<'_>, json: &serde_json::Value) -> Result<()> {
    walk(merger, None, json)
}

fn walk(merger: &mut Merger<'_>, path: Option<&str>, json: &serde_json::Value) -> Result<()> {
    match json {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let child_path = match path {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key.clone(),
                };
                walk(merger, Some(&child_path), child)?;
            }
        }
        serde_json::Value::Array(items) => {
            let origin = origin_label(path);
            for item in items {
                if item.is_array() || item.is_object() {
                    return Err(ConfigError::InvalidValue { origin }.into());
                }
                merger.apply_json(&origin, path, item)?;
            }
        }
        scalar => merger.apply_json(&origin_label(path), path, scalar)?,
    }
    Ok(())
}

fn origin_label(path: Option<&str>) -> String {
    format!("`{}`", path.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use optstack_core::{
        ConfigTree, OptionDefinitions, OptionRegistry, OptionSpec, Positionals, Scalar,
    };

    fn registry() -> OptionRegistry {
        let defs = OptionDefinitions::new()
            .option("verbose", OptionSpec::flag("v"))
            .option("server.port", OptionSpec::new().with_required("="))
            .option("server.host", OptionSpec::new().with_required("[HOST]"))
            .option("tags", OptionSpec::new().with_required("=").with_default(json!([])));
        OptionRegistry::build(&defs).unwrap()
    }

    fn apply(json: serde_json::Value) -> Result<(ConfigTree, Positionals)> {
        let registry = registry();
        let mut tree = ConfigTree::new();
        let mut positionals = Positionals::new();
        let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
        merger.apply_defaults()?;
        apply_config_json(&mut merger, &json)?;
        Ok((tree, positionals))
    }

    #[test]
    fn test_nested_objects_flatten_to_dotted_paths() {
        let (tree, _) = apply(json!({"server": {"port": 8080, "host": "example.org"}})).unwrap();
        assert_eq!(tree.to_json()["server"], json!({"port": 8080, "host": "example.org"}));
    }

    #[test]
    fn test_values_are_not_coerced() {
        let (tree, _) = apply(json!({"server": {"port": "8080"}})).unwrap();
        assert_eq!(
            tree.get("server.port").unwrap().as_scalar(),
            Some(&Scalar::from("8080"))
        );
    }

    #[test]
    fn test_arrays_apply_each_element() {
        let (tree, _) = apply(json!({"tags": ["a", "b", "-", "c"]})).unwrap();
        assert_eq!(tree.to_json()["tags"], json!(["c"]));
    }

    #[test]
    fn test_root_scalars_become_positionals() {
        let (tree, positionals) = apply(json!(["x", 1, null])).unwrap();
        assert!(tree.get("verbose").is_none());
        assert_eq!(
            positionals.as_slice(),
            &[Scalar::from("x"), Scalar::Number(1.0), Scalar::Null]
        );

        let (_, positionals) = apply(json!("only")).unwrap();
        assert_eq!(positionals.as_slice(), &[Scalar::from("only")]);
    }

    #[test]
    fn test_composite_array_elements_are_invalid() {
        for (document, origin) in [
            (json!({"server": [{"port": 1}]}), "`server`"),
            (json!({"tags": [[1]]}), "`tags`"),
            (json!({"tags": ["a", {"b": 1}]}), "`tags`"),
            (json!([{"server": {"port": 1}}]), "``"),
        ] {
            let err = apply(document.clone()).unwrap_err();
            assert!(
                matches!(
                    err,
                    LoadError::Config(ConfigError::InvalidValue { origin: ref o }) if o == origin
                ),
                "{document}: {err}"
            );
        }
    }

    #[test]
    fn test_keys_apply_in_document_order() {
        let (tree, _) = apply(json!({"server.port": 1, "server": {"port": 2}})).unwrap();
        assert_eq!(tree.to_json()["server"]["port"], json!(2));

        let (tree, _) = apply(json!({"server": {"port": 2}, "server.port": 1})).unwrap();
        assert_eq!(tree.to_json()["server"]["port"], json!(1));
    }

    #[test]
    fn test_file_keys_apply_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ordered.json");
        std::fs::write(&path, r#"{"tags": ["z"], "server.port": 1, "server": {"port": 2}}"#)
            .unwrap();

        let registry = registry();
        let mut tree = ConfigTree::new();
        let mut positionals = Positionals::new();
        let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
        load_config_file(&mut merger, &PathContext::default(), &path).unwrap();
        assert_eq!(tree.to_json(), json!({"tags": "z", "server": {"port": 2}}));
    }

    #[test]
    fn test_flag_only_option_rejects_file_value() {
        let err = apply(json!({"verbose": true})).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Config(ConfigError::CannotHaveValue { origin }) if origin == "`verbose`"
        ));
    }

    #[test]
    fn test_unknown_key_is_reported_with_path() {
        let err = apply(json!({"server": {"name": "x"}})).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Config(ConfigError::UnknownOption { option, .. }) if option == "server.name"
        ));
    }

    #[test]
    fn test_missing_and_blank_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let blank = dir.path().join("blank.json");
        std::fs::write(&blank, "  \n\t").unwrap();

        let registry = registry();
        let mut tree = ConfigTree::new();
        let mut positionals = Positionals::new();
        let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
        let context = PathContext::default();
        load_config_file(&mut merger, &context, &dir.path().join("missing.json")).unwrap();
        load_config_file(&mut merger, &context, &blank).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_syntax_error_applies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"server": {"port": 1}, "tags": ["#).unwrap();

        let registry = registry();
        let mut tree = ConfigTree::new();
        let mut positionals = Positionals::new();
        let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
        let err = load_config_file(&mut merger, &PathContext::default(), &path).unwrap_err();
        assert!(matches!(err, LoadError::UnparsableConfigFile { .. }));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let registry = registry();
        let mut tree = ConfigTree::new();
        let mut positionals = Positionals::new();
        let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
        let err = load_config_file(&mut merger, &PathContext::default(), dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_tilde_path_is_expanded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.json"), r#"{"server": {"port": 9}}"#).unwrap();
        let context = PathContext {
            home: Some(dir.path().to_str().unwrap().to_string()),
            cwd: None,
            previous_cwd: None,
        };

        let registry = registry();
        let mut tree = ConfigTree::new();
        let mut positionals = Positionals::new();
        let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
        load_config_file(&mut merger, &context, Path::new("~/app.json")).unwrap();
        assert_eq!(tree.to_json(), json!({"server": {"port": 9}}));
    }
}
