//! Environment-variable source.

use std::collections::HashMap;

use crate::error::Result;
use crate::merge::Merger;

/// Applies every declared environment variable present in `env`.
///
/// Variables are visited in option declaration order. Each value is raw
/// text and is coerced, exactly like a command-line value, then bound to the
/// option that declared the variable.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use optstack_core::*;
///
/// let defs = OptionDefinitions::new()
///     .option("name", OptionSpec::new().with_env("APP_NAME").with_required("="));
/// let registry = OptionRegistry::build(&defs).unwrap();
/// let env = HashMap::from([("APP_NAME".to_string(), "Alice".to_string())]);
///
/// let mut tree = ConfigTree::new();
/// let mut positionals = Positionals::new();
/// let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
/// read_environment(&mut merger, &env).unwrap();
///
/// assert_eq!(tree.get("name").unwrap().as_scalar(), Some(&Scalar::from("Alice")));
/// ```
pub fn read_environment(merger: &mut Merger<'_>, env: &HashMap<String, String>) -> Result<()> {
    let registry = merger.registry();
    for (var, option) in registry.env_bindings() {
        if let Some(text) = env.get(var) {
            tracing::debug!(var, option, "applying environment variable");
            merger.apply_text(var, Some(option), Some(text))?;
        }
    }
    Ok(())
}
