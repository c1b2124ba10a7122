//! Tilde expansion for config-file paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Directories used to expand `~` shorthand.
///
/// Normally taken from the `HOME`, `PWD` and `OLDPWD` variables of an
/// environment snapshot. When a directory is unknown, paths needing it are
/// left unexpanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathContext {
    pub home: Option<String>,
    pub cwd: Option<String>,
    pub previous_cwd: Option<String>,
}

impl PathContext {
    /// Reads `HOME`, `PWD` and `OLDPWD` from an environment snapshot.
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        Self {
            home: env.get("HOME").cloned(),
            cwd: env.get("PWD").cloned(),
            previous_cwd: env.get("OLDPWD").cloned(),
        }
    }

    /// Expands tilde shorthand.
    ///
    /// | Input | Result |
    /// |-------|--------|
    /// | `~` | home |
    /// | `~/rest` | home + `/rest` |
    /// | `~+rest` | cwd + `/rest` |
    /// | `~-rest` | previous cwd + `/rest` |
    /// | `~name…` | `/home/name…` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArgumentType`] if `path` is not valid
    /// UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use optstack_core::PathContext;
    ///
    /// let ctx = PathContext {
    ///     home: Some("/home/alice".into()),
    ///     cwd: Some("/srv/app".into()),
    ///     previous_cwd: None,
    /// };
    /// assert_eq!(ctx.normalize(Path::new("~/.apprc")).unwrap(), PathBuf::from("/home/alice/.apprc"));
    /// assert_eq!(ctx.normalize(Path::new("~+conf.json")).unwrap(), PathBuf::from("/srv/app/conf.json"));
    /// assert_eq!(ctx.normalize(Path::new("~bob/x")).unwrap(), PathBuf::from("/home/bob/x"));
    /// ```
    pub fn normalize(&self, path: &Path) -> Result<PathBuf> {
        let text = path.to_str().ok_or_else(|| {
            ConfigError::InvalidArgumentType(format!(
                "path must be valid UTF-8: {}",
                path.display()
            ))
        })?;
        Ok(PathBuf::from(self.expand(text)))
    }

    fn expand(&self, text: &str) -> String {
        let Some(rest) = text.strip_prefix('~') else {
            return text.to_string();
        };

        let (base, suffix) = match rest.chars().next() {
            None => (&self.home, String::new()),
            Some('/') => (&self.home, rest.to_string()),
            Some('+') => (&self.cwd, format!("/{}", &rest[1..])),
            Some('-') => (&self.previous_cwd, format!("/{}", &rest[1..])),
            Some(_) => return format!("/home/{rest}"),
        };

        match base {
            Some(dir) => format!("{dir}{suffix}"),
            None => {
                tracing::debug!(path = text, "no directory known for tilde expansion");
                text.to_string()
            }
        }
    }
}
