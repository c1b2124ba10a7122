//! Value and option-definition types.
//!
//! [`Scalar`] is the unit stored in the configuration tree. [`Value`] is what
//! the merger accepts: a single scalar, or a list of scalars coming from a
//! declared default. [`OptionSpec`] and [`OptionDefinitions`] describe the
//! options a program understands.

use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};

/// Largest integer magnitude that an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A typed configuration value.
///
/// Numbers are `f64` so that `Infinity` and `-Infinity` can be represented.
///
/// # Examples
///
/// ```
/// use optstack_core::Scalar;
///
/// let port = Scalar::from(8080);
/// assert_eq!(port, Scalar::Number(8080.0));
/// assert_eq!(serde_json::to_string(&port).unwrap(), "8080");
///
/// let inf = Scalar::Number(f64::INFINITY);
/// assert_eq!(serde_json::to_string(&inf).unwrap(), "\"Infinity\"");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Null,
    String(String),
}

impl Scalar {
    /// Returns `true` for the array-reset sentinel `"-"`.
    pub fn is_reset_sentinel(&self) -> bool {
        matches!(self, Scalar::String(s) if s == "-")
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to a JSON value.
    ///
    /// Integral numbers become JSON integers; infinities become the strings
    /// `"Infinity"` and `"-Infinity"` since JSON has no representation for
    /// them.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Null => serde_json::Value::Null,
            Scalar::String(s) => serde_json::Value::String(s.clone()),
            Scalar::Number(n) => match integral(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|| serde_json::Value::String(infinity_label(*n).into())),
            },
        }
    }

    /// Converts a JSON scalar. Returns `None` for arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number),
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

fn infinity_label(n: f64) -> &'static str {
    if n.is_sign_negative() {
        "-Infinity"
    } else {
        "Infinity"
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Null => serializer.serialize_unit(),
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None if n.is_finite() => serializer.serialize_f64(*n),
                None => serializer.serialize_str(infinity_label(*n)),
            },
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(f64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

/// A value handed to the merger.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// A list of scalars; only declared defaults produce these.
    List(Vec<Scalar>),
}

impl Value {
    /// Converts structured JSON into a mergeable value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for objects and for arrays that
    /// contain an object or another array.
    pub fn from_json(origin: &str, json: &serde_json::Value) -> Result<Self> {
        if let Some(scalar) = Scalar::from_json(json) {
            return Ok(Value::Scalar(scalar));
        }
        let invalid = || ConfigError::InvalidValue {
            origin: origin.to_string(),
        };
        match json {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| Scalar::from_json(item).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            _ => Err(invalid()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

/// How an option treats a trailing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredMarker {
    /// A value is accepted; without one the option becomes `true`.
    Optional(String),
    /// A value must be supplied.
    Mandatory(String),
}

impl RequiredMarker {
    /// Interprets marker text. Empty text means "no marker".
    ///
    /// ```
    /// use optstack_core::RequiredMarker;
    ///
    /// assert!(RequiredMarker::parse("=NAME").unwrap().is_mandatory());
    /// assert!(!RequiredMarker::parse("[NAME]").unwrap().is_mandatory());
    /// assert!(RequiredMarker::parse("").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            None
        } else if text.starts_with('=') {
            Some(RequiredMarker::Mandatory(text.to_string()))
        } else {
            Some(RequiredMarker::Optional(text.to_string()))
        }
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(self, RequiredMarker::Mandatory(_))
    }

    /// The marker text as declared.
    pub fn as_str(&self) -> &str {
        match self {
            RequiredMarker::Optional(text) | RequiredMarker::Mandatory(text) => text,
        }
    }
}

/// Declaration of a single option.
///
/// Empty strings are treated as absent for `short`, `env` and `required`.
///
/// # Examples
///
/// ```
/// use optstack_core::OptionSpec;
///
/// let spec = OptionSpec::new()
///     .with_short("n")
///     .with_env("NAME")
///     .with_required("=")
///     .with_default(serde_json::json!("anonymous"));
/// assert_eq!(spec.short.as_deref(), Some("n"));
/// assert!(spec.default.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSpec {
    /// Short-flag characters, each one an alias for the option.
    pub short: Option<String>,
    /// Environment variable read for this option.
    pub env: Option<String>,
    /// Required-marker text; `=`-prefixed means mandatory.
    pub required: Option<String>,
    /// Default value, applied before any other source.
    pub default: Option<serde_json::Value>,
}

impl OptionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a flag with the given short characters.
    pub fn flag(short: &str) -> Self {
        Self::new().with_short(short)
    }

    pub fn with_short(mut self, short: &str) -> Self {
        self.short = Some(short.to_string());
        self
    }

    pub fn with_env(mut self, env: &str) -> Self {
        self.env = Some(env.to_string());
        self
    }

    pub fn with_required(mut self, marker: &str) -> Self {
        self.required = Some(marker.to_string());
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Ordered set of option declarations.
///
/// Declaration order is significant: it is the order in which defaults are
/// applied and environment variables are read.
///
/// # Examples
///
/// ```
/// use optstack_core::{OptionDefinitions, OptionSpec};
///
/// let defs = OptionDefinitions::new()
///     .option("verbose", OptionSpec::flag("v"))
///     .option("name", OptionSpec::flag("n").with_env("NAME").with_required("="));
/// assert_eq!(defs.len(), 2);
/// assert_eq!(defs.iter().next().unwrap().0, "verbose");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionDefinitions {
    entries: Vec<(String, OptionSpec)>,
}

impl OptionDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a declaration.
    pub fn option(mut self, name: &str, spec: OptionSpec) -> Self {
        self.push(name, spec);
        self
    }

    pub fn push(&mut self, name: &str, spec: OptionSpec) {
        self.entries.push((name.to_string(), spec));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_value_from_json_accepts_scalars_and_flat_arrays() {
        assert_eq!(
            Value::from_json("x", &json!(3)).unwrap(),
            Value::Scalar(Scalar::Number(3.0))
        );
        assert_eq!(
            Value::from_json("x", &json!(["a", null, true])).unwrap(),
            Value::List(vec![Scalar::from("a"), Scalar::Null, Scalar::Bool(true)])
        );
        assert_eq!(
            Value::from_json("x", &json!([])).unwrap(),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn test_value_from_json_rejects_nested_composites() {
        let expected = ConfigError::InvalidValue {
            origin: "OPTIONS:tags".to_string(),
        };
        assert_eq!(
            Value::from_json("OPTIONS:tags", &json!({"a": 1})).unwrap_err(),
            expected
        );
        assert_eq!(
            Value::from_json("OPTIONS:tags", &json!([{"a": 1}])).unwrap_err(),
            expected
        );
        assert_eq!(
            Value::from_json("OPTIONS:tags", &json!([[1]])).unwrap_err(),
            expected
        );
    }

    #[test]
    fn test_scalar_serialization() {
        let values = vec![
            Scalar::Bool(true),
            Scalar::Number(42.0),
            Scalar::Number(1.5),
            Scalar::Number(f64::NEG_INFINITY),
            Scalar::Null,
            Scalar::from("hi"),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[true,42,1.5,"-Infinity",null,"hi"]"#
        );
    }

    #[test]
    fn test_scalar_to_json_matches_serialization() {
        for scalar in [
            Scalar::Number(-7.0),
            Scalar::Number(0.25),
            Scalar::Number(f64::INFINITY),
            Scalar::from("x"),
        ] {
            assert_eq!(scalar.to_json(), serde_json::to_value(&scalar).unwrap());
        }
    }

    #[test]
    fn test_reset_sentinel() {
        assert!(Scalar::from("-").is_reset_sentinel());
        assert!(!Scalar::from("--").is_reset_sentinel());
        assert!(!Scalar::Null.is_reset_sentinel());
    }

    #[test]
    fn test_required_marker_parse() {
        assert_eq!(
            RequiredMarker::parse("=VALUE"),
            Some(RequiredMarker::Mandatory("=VALUE".to_string()))
        );
        assert_eq!(
            RequiredMarker::parse("VALUE"),
            Some(RequiredMarker::Optional("VALUE".to_string()))
        );
        assert_eq!(RequiredMarker::parse(""), None);
    }
}
