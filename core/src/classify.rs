//! Character classes and command-line token classification.
//!
//! The grammar recognised here:
//!
//! - a *short cluster* is `-` followed by one or more short-flag characters,
//!   e.g. `-v`, `-vn`, `-x=5`;
//! - a *long flag* is `--` followed by one or more words joined by single
//!   dashes, e.g. `--verbose`, `--server-port=80`;
//! - either form may carry an attached value after the first `=`.
//!
//! Words in long flags share their grammar with the dot-separated segments
//! of option names, so `--server-port` addresses `server.port`.

/// Literal token that ends option parsing.
pub const END_OF_OPTIONS: &str = "--";

/// Returns `true` for characters usable as short flags.
///
/// Printable ASCII excluding space, `-` and `=`; control characters and
/// anything outside ASCII are rejected.
pub fn is_short_flag_char(c: char) -> bool {
    c.is_ascii_graphic() && c != '-' && c != '='
}

/// Returns `true` for the first character of a name word.
pub fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns `true` for characters after the first in a name word.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns `true` if `word` is a name word: a letter or `_` followed by at
/// least one letter, digit or `_`.
pub fn is_word(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    is_word_start(first) && !rest.is_empty() && rest.chars().all(is_word_char)
}

/// Returns `true` if `name` is a valid dotted option name such as
/// `server.port`.
///
/// ```
/// use optstack_core::is_option_name;
///
/// assert!(is_option_name("server.port"));
/// assert!(is_option_name("_private"));
/// assert!(!is_option_name("a.b"));
/// assert!(!is_option_name("9lives"));
/// ```
pub fn is_option_name(name: &str) -> bool {
    name.split('.').all(is_word)
}

/// Returns `true` if every character of `flags` is a short-flag character
/// and there is at least one.
pub fn is_short_cluster(flags: &str) -> bool {
    !flags.is_empty() && flags.chars().all(is_short_flag_char)
}

/// Returns `true` if `body` (a long flag without its leading `--`) is a
/// dash-joined sequence of words.
pub fn is_long_body(body: &str) -> bool {
    body.split('-').all(is_word)
}

/// Classification of one command-line token in normal parsing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// The literal `--`.
    EndOfOptions,
    /// `-abc[=value]`: the short-flag characters and the attached value.
    Short {
        flags: &'a str,
        value: Option<&'a str>,
    },
    /// `--word-word[=value]`: the dash-joined name and the attached value.
    Long {
        name: &'a str,
        value: Option<&'a str>,
    },
    /// Starts with `-` but matches neither flag grammar.
    Malformed,
    /// A plain value.
    Plain(&'a str),
}

/// Classifies a single token.
///
/// ```
/// use optstack_core::{Token, classify_token};
///
/// assert_eq!(
///     classify_token("-vn=Alice"),
///     Token::Short { flags: "vn", value: Some("Alice") }
/// );
/// assert_eq!(
///     classify_token("--server-port"),
///     Token::Long { name: "server-port", value: None }
/// );
/// assert_eq!(classify_token("-"), Token::Malformed);
/// assert_eq!(classify_token("Alice"), Token::Plain("Alice"));
/// ```
pub fn classify_token(token: &str) -> Token<'_> {
    if token == END_OF_OPTIONS {
        return Token::EndOfOptions;
    }
    if !token.starts_with('-') {
        return Token::Plain(token);
    }

    let (head, value) = match token.split_once('=') {
        Some((head, value)) => (head, Some(value)),
        None => (token, None),
    };

    if let Some(body) = head.strip_prefix("--") {
        if is_long_body(body) {
            return Token::Long { name: body, value };
        }
        return Token::Malformed;
    }

    let flags = &head[1..];
    if is_short_cluster(flags) {
        Token::Short { flags, value }
    } else {
        Token::Malformed
    }
}

/// Returns `true` if `token` matches the short or long flag grammar.
///
/// Used for lookahead: a following token that is itself a flag is never
/// consumed as a value.
pub fn is_flag_token(token: &str) -> bool {
    matches!(
        classify_token(token),
        Token::Short { .. } | Token::Long { .. }
    )
}
