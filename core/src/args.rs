//! Command-line source: tokenizing and applying an argument vector.
//!
//! Tokens are read left to right with at most one token of lookahead. The
//! literal `--` switches permanently to positional-only mode, after which
//! every token is a positional value.

use crate::classify::{END_OF_OPTIONS, Token, classify_token, is_flag_token};
use crate::error::{ConfigError, Result};
use crate::merge::Merger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    PositionalOnly,
}

/// Applies command-line tokens.
///
/// `tokens` excludes the program name. Short clusters apply every flag but
/// the last without a value; the last flag, like a long flag, takes an
/// attached `=value`, or the following token when the option is mandatory
/// and that token is neither a flag nor `--`.
///
/// # Errors
///
/// [`ConfigError::UnrecognizedCliToken`] for dash-prefixed tokens outside
/// the flag grammar, [`ConfigError::UnknownOption`] for unbound short flags,
/// and anything [`Merger::apply`] reports.
///
/// # Examples
///
/// ```
/// use optstack_core::*;
///
/// let defs = OptionDefinitions::new()
///     .option("verbose", OptionSpec::flag("v"))
///     .option("name", OptionSpec::flag("n").with_env("NAME").with_required("="));
/// let registry = OptionRegistry::build(&defs).unwrap();
/// let mut tree = ConfigTree::new();
/// let mut positionals = Positionals::new();
///
/// let mut merger = Merger::new(&registry, &mut tree, &mut positionals);
/// parse_args(&mut merger, &["-v", "-n", "Alice", "--", "-v"]).unwrap();
///
/// assert_eq!(tree.to_json(), serde_json::json!({"verbose": true, "name": "Alice"}));
/// assert_eq!(positionals.as_slice(), &[Scalar::from("-v")]);
/// ```
pub fn parse_args<S: AsRef<str>>(merger: &mut Merger<'_>, tokens: &[S]) -> Result<()> {
    let mut mode = Mode::Normal;
    let mut cursor = 0;

    while cursor < tokens.len() {
        let token = tokens[cursor].as_ref();
        cursor += 1;

        if mode == Mode::PositionalOnly {
            merger.apply_text("", None, Some(token))?;
            continue;
        }

        match classify_token(token) {
            Token::EndOfOptions => {
                tracing::trace!("end of options");
                mode = Mode::PositionalOnly;
            }
            Token::Plain(text) => merger.apply_text("", None, Some(text))?,
            Token::Malformed => return Err(ConfigError::UnrecognizedCliToken(token.to_string())),
            Token::Short { flags, value } => {
                let (origin, option) = apply_cluster(merger, flags)?;
                let value = flag_value(merger, &option, value, tokens, &mut cursor);
                merger.apply_text(&origin, Some(&option), value)?;
            }
            Token::Long { name, value } => {
                let option = name.replace('-', ".");
                let origin = format!("--{name}");
                let value = flag_value(merger, &option, value, tokens, &mut cursor);
                merger.apply_text(&origin, Some(&option), value)?;
            }
        }
    }

    Ok(())
}

/// Applies every flag of a short cluster except the last, which is returned
/// as `(origin, option)`.
fn apply_cluster(merger: &mut Merger<'_>, flags: &str) -> Result<(String, String)> {
    let registry = merger.registry();
    let mut resolved = Vec::with_capacity(flags.len());
    for flag in flags.chars() {
        let origin = format!("-{flag}");
        let Some(option) = registry.short_option(flag) else {
            return Err(ConfigError::UnknownOption {
                origin,
                option: flag.to_string(),
            });
        };
        resolved.push((origin, option.replace('-', ".")));
    }

    let last = resolved
        .pop()
        .ok_or_else(|| ConfigError::UnrecognizedCliToken(format!("-{flags}")))?;
    for (origin, option) in &resolved {
        merger.apply_text(origin, Some(option), None)?;
    }
    Ok(last)
}

/// Picks the value for the active flag: the attached `=value`, else the
/// next token when the option is mandatory and the token is not a flag.
fn flag_value<'t, S: AsRef<str>>(
    merger: &Merger<'_>,
    option: &str,
    attached: Option<&'t str>,
    tokens: &'t [S],
    cursor: &mut usize,
) -> Option<&'t str> {
    if attached.is_some() {
        return attached;
    }
    let next = tokens.get(*cursor)?.as_ref();
    if next == END_OF_OPTIONS || is_flag_token(next) || !merger.registry().is_mandatory(option) {
        return None;
    }
    *cursor += 1;
    Some(next)
}
