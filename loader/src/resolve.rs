//! The resolution pipeline.
//!
//! Sources are applied in a fixed order, each overwriting the leaves written
//! before it and appending to arrays:
//!
//! 1. declared defaults
//! 2. config files, in the order given
//! 3. environment variables, in declaration order
//! 4. command-line tokens

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use optstack_core::{
    ConfigTree, Merger, OptionDefinitions, OptionRegistry, PathContext, Positionals, parse_args,
    read_environment,
};
use serde::Serialize;

use crate::config_file::load_config_file;
use crate::error::Result;

/// Resolves options from every source into `tree` and `positionals`.
///
/// `tree` may be pre-seeded (for example to declare array paths). Nothing is
/// printed and the process is never exited; every failure is returned.
///
/// # Errors
///
/// Any [`LoadError`](crate::LoadError). The first failure aborts the whole
/// resolution; `tree` may then hold values applied before it.
pub fn resolve<S, P>(
    definitions: &OptionDefinitions,
    tree: &mut ConfigTree,
    positionals: &mut Positionals,
    env: &HashMap<String, String>,
    args: &[S],
    config_paths: &[P],
) -> Result<()>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let registry = OptionRegistry::build(definitions)?;
    let context = PathContext::from_env(env);
    let mut merger = Merger::new(&registry, tree, positionals);

    merger.apply_defaults()?;
    for path in config_paths {
        load_config_file(&mut merger, &context, path.as_ref())?;
    }
    read_environment(&mut merger, env)?;
    parse_args(&mut merger, args)?;

    tracing::debug!(
        options = registry.len(),
        files = config_paths.len(),
        args = args.len(),
        "resolved options"
    );
    Ok(())
}

/// The outcome of [`Resolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    #[serde(rename = "config")]
    pub tree: ConfigTree,
    pub positionals: Positionals,
}

/// Builder over [`resolve`].
///
/// Starts with an empty environment, no arguments and no config files.
///
/// # Examples
///
/// ```
/// use optstack_core::{OptionDefinitions, OptionSpec, Scalar};
/// use optstack_loader::Resolver;
///
/// let defs = OptionDefinitions::new()
///     .option("verbose", OptionSpec::flag("v"))
///     .option("name", OptionSpec::flag("n").with_env("NAME").with_required("="));
///
/// let resolution = Resolver::new(&defs)
///     .env_var("NAME", "Alice")
///     .args(["-v", "input.txt"])
///     .resolve()
///     .unwrap();
///
/// assert_eq!(
///     resolution.tree.to_json(),
///     serde_json::json!({"verbose": true, "name": "Alice"})
/// );
/// assert_eq!(resolution.positionals.as_slice(), &[Scalar::from("input.txt")]);
/// ```
#[derive(Debug, Clone)]
pub struct Resolver<'d> {
    definitions: &'d OptionDefinitions,
    env: HashMap<String, String>,
    args: Vec<String>,
    config_paths: Vec<PathBuf>,
}

impl<'d> Resolver<'d> {
    pub fn new(definitions: &'d OptionDefinitions) -> Self {
        Self {
            definitions,
            env: HashMap::new(),
            args: Vec::new(),
            config_paths: Vec::new(),
        }
    }

    /// Replaces the environment snapshot.
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Adds one variable to the environment snapshot.
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Appends command-line tokens, excluding the program name.
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a config file. Files are applied in the order added.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_paths.push(path.into());
        self
    }

    /// Resolves into caller-provided storage.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve_into(&self, tree: &mut ConfigTree, positionals: &mut Positionals) -> Result<()> {
        resolve(
            self.definitions,
            tree,
            positionals,
            &self.env,
            &self.args,
            &self.config_paths,
        )
    }

    /// Resolves into a fresh tree and positional list.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve(&self) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        self.resolve_into(&mut resolution.tree, &mut resolution.positionals)?;
        Ok(resolution)
    }
}
