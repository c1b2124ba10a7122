//! The configuration tree and the positional-value list.
//!
//! A [`ConfigTree`] maps dotted paths to [`ConfigNode`]s. A path is either a
//! branch or holds a value, never both; [`ConfigTree::insert`] rejects any
//! write that would make it both.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::types::{Scalar, Value};

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigNode {
    /// Nested mapping.
    Branch(BTreeMap<String, ConfigNode>),
    /// A single value.
    Leaf(Scalar),
    /// An accumulating list of values.
    LeafArray(Vec<Scalar>),
}

impl ConfigNode {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Leaf(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Scalar]> {
        match self {
            ConfigNode::LeafArray(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, ConfigNode::Branch(_))
    }

    /// Converts to a JSON value (see [`Scalar::to_json`] for numbers).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigNode::Branch(children) => serde_json::Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect(),
            ),
            ConfigNode::Leaf(scalar) => scalar.to_json(),
            ConfigNode::LeafArray(items) => {
                serde_json::Value::Array(items.iter().map(Scalar::to_json).collect())
            }
        }
    }

    fn from_json(path: &str, json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    Scalar::from_json(item).ok_or_else(|| {
                        ConfigError::InvalidArgumentType(format!(
                            "array at `{path}` may only hold scalars"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(ConfigNode::LeafArray),
            serde_json::Value::Object(map) => branch_from_json(path, map).map(ConfigNode::Branch),
            scalar => Scalar::from_json(scalar).map(ConfigNode::Leaf).ok_or_else(|| {
                ConfigError::InvalidArgumentType(format!("unsupported value at `{path}`"))
            }),
        }
    }
}

fn branch_from_json(
    path: &str,
    map: &serde_json::Map<String, serde_json::Value>,
) -> Result<BTreeMap<String, ConfigNode>> {
    map.iter()
        .map(|(key, child)| {
            let child_path = join_path(path, key);
            ConfigNode::from_json(&child_path, child).map(|node| (key.clone(), node))
        })
        .collect()
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// The resolved configuration: a rooted tree addressed by dotted paths.
///
/// # Examples
///
/// ```
/// use optstack_core::{ConfigTree, Scalar, Value};
///
/// let mut tree = ConfigTree::new();
/// tree.insert("--server-port", "server.port", Value::Scalar(Scalar::from(80))).unwrap();
/// assert_eq!(tree.get("server.port").unwrap().as_scalar(), Some(&Scalar::Number(80.0)));
///
/// // `server` is now a branch and cannot take a value.
/// assert!(tree.insert("--server", "server", Value::Scalar(Scalar::Bool(true))).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: BTreeMap<String, ConfigNode>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pre-seeded tree from a JSON object.
    ///
    /// Arrays become [`ConfigNode::LeafArray`]s, which lets callers declare
    /// accumulating paths up front.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArgumentType`] if `json` is not an
    /// object or contains an array holding a composite value.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(Self {
                root: branch_from_json("", map)?,
            }),
            _ => Err(ConfigError::InvalidArgumentType(
                "configuration tree must be an object".to_string(),
            )),
        }
    }

    /// Looks up the node at a dotted path.
    pub fn get(&self, path: &str) -> Option<&ConfigNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            match node {
                ConfigNode::Branch(children) => node = children.get(segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Top-level entries.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.root.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Converts the whole tree to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.root
                .iter()
                .map(|(key, node)| (key.clone(), node.to_json()))
                .collect(),
        )
    }

    /// Writes `value` at `path`, creating intermediate branches.
    ///
    /// An existing [`ConfigNode::LeafArray`] accumulates instead of being
    /// replaced: the scalar `"-"` empties it, list elements are appended one
    /// by one (each `"-"` element emptying it first), and any other scalar
    /// is appended. Anything else at the final segment is overwritten; a
    /// list creates a new array.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ParentConflict`] if an intermediate segment holds a
    ///   value.
    /// - [`ConfigError::ChildConflict`] if the final segment is a branch.
    pub fn insert(&mut self, origin: &str, path: &str, value: Value) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut node = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let child = node
                .entry((*segment).to_string())
                .or_insert_with(|| ConfigNode::Branch(BTreeMap::new()));
            node = match child {
                ConfigNode::Branch(children) => children,
                ConfigNode::Leaf(_) | ConfigNode::LeafArray(_) => {
                    return Err(ConfigError::ParentConflict {
                        origin: origin.to_string(),
                        path: segments[..=depth].join("."),
                    });
                }
            };
        }

        match node.get_mut(*last) {
            Some(ConfigNode::LeafArray(items)) => {
                accumulate(items, value);
                Ok(())
            }
            Some(ConfigNode::Branch(_)) => Err(ConfigError::ChildConflict {
                origin: origin.to_string(),
                path: path.to_string(),
            }),
            Some(_) | None => {
                let fresh = match value {
                    Value::Scalar(scalar) => ConfigNode::Leaf(scalar),
                    Value::List(items) => ConfigNode::LeafArray(items),
                };
                node.insert((*last).to_string(), fresh);
                Ok(())
            }
        }
    }
}

fn accumulate(items: &mut Vec<Scalar>, value: Value) {
    match value {
        Value::Scalar(scalar) if scalar.is_reset_sentinel() => items.clear(),
        Value::Scalar(scalar) => items.push(scalar),
        Value::List(incoming) => {
            for scalar in incoming {
                if scalar.is_reset_sentinel() {
                    items.clear();
                } else {
                    items.push(scalar);
                }
            }
        }
    }
}

/// Values not bound to any option, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Positionals(Vec<Scalar>);

impl Positionals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Scalar) {
        self.0.push(value);
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Scalar> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn scalar(s: impl Into<Scalar>) -> Value {
        Value::Scalar(s.into())
    }

    #[test]
    fn test_insert_creates_branches() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "server.http.port", scalar(8080)).unwrap();
        tree.insert("t", "server.http.host", scalar("localhost")).unwrap();

        assert_eq!(
            tree.to_json(),
            json!({"server": {"http": {"port": 8080, "host": "localhost"}}})
        );
        assert!(tree.get("server.http").unwrap().is_branch());
    }

    #[test]
    fn test_insert_overwrites_leaf() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "name", scalar("a")).unwrap();
        tree.insert("t", "name", scalar("b")).unwrap();
        assert_eq!(tree.get("name").unwrap().as_scalar(), Some(&Scalar::from("b")));
    }

    #[test]
    fn test_scalar_onto_branch_is_child_conflict() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "server.port", scalar(1)).unwrap();
        let err = tree.insert("--server", "server", scalar(true)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ChildConflict {
                origin: "--server".to_string(),
                path: "server".to_string(),
            }
        );
    }

    #[test]
    fn test_path_through_leaf_is_parent_conflict() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "server", scalar(true)).unwrap();
        let err = tree.insert("x", "server.http.port", scalar(1)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ParentConflict {
                origin: "x".to_string(),
                path: "server".to_string(),
            }
        );
    }

    #[test]
    fn test_path_through_array_is_parent_conflict() {
        let mut tree = ConfigTree::from_json(&json!({"tags": []})).unwrap();
        let err = tree.insert("x", "tags.first", scalar(1)).unwrap_err();
        assert!(matches!(err, ConfigError::ParentConflict { path, .. } if path == "tags"));
    }

    #[test]
    fn test_array_accumulates_and_resets() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "tags", Value::List(vec![])).unwrap();
        tree.insert("t", "tags", scalar("a")).unwrap();
        tree.insert("t", "tags", scalar("b")).unwrap();
        assert_eq!(tree.to_json(), json!({"tags": ["a", "b"]}));

        tree.insert("t", "tags", scalar("-")).unwrap();
        assert_eq!(tree.to_json(), json!({"tags": []}));

        tree.insert("t", "tags", scalar("c")).unwrap();
        assert_eq!(tree.to_json(), json!({"tags": ["c"]}));
    }

    #[test]
    fn test_list_into_array_resets_on_each_sentinel() {
        let mut tree = ConfigTree::from_json(&json!({"tags": ["old"]})).unwrap();
        let list = Value::List(vec![
            Scalar::from("a"),
            Scalar::from("-"),
            Scalar::from("b"),
            Scalar::from("c"),
        ]);
        tree.insert("t", "tags", list).unwrap();
        assert_eq!(tree.to_json(), json!({"tags": ["b", "c"]}));
    }

    #[test]
    fn test_sentinel_on_non_array_is_plain_value() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "mode", scalar("-")).unwrap();
        assert_eq!(tree.get("mode").unwrap().as_scalar(), Some(&Scalar::from("-")));
    }

    #[test]
    fn test_list_replaces_leaf() {
        let mut tree = ConfigTree::new();
        tree.insert("t", "tags", scalar("x")).unwrap();
        tree.insert("t", "tags", Value::List(vec![Scalar::from("y")])).unwrap();
        assert_eq!(tree.get("tags").unwrap().as_array(), Some(&[Scalar::from("y")][..]));
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert!(matches!(
            ConfigTree::from_json(&json!([1, 2])),
            Err(ConfigError::InvalidArgumentType(_))
        ));
        assert!(matches!(
            ConfigTree::from_json(&json!({"a": {"b": [{"c": 1}]}})),
            Err(ConfigError::InvalidArgumentType(msg)) if msg.contains("a.b")
        ));
    }

    #[test]
    fn test_get_missing_and_through_leaf() {
        let tree = ConfigTree::from_json(&json!({"a": {"bb": 1}, "cc": 2})).unwrap();
        assert!(tree.get("zz").is_none());
        assert!(tree.get("cc.dd").is_none());
        assert!(tree.get("a.bb").is_some());
    }

    #[test]
    fn test_positionals_serialize_as_array() {
        let mut positionals = Positionals::new();
        positionals.push(Scalar::from("file.txt"));
        positionals.push(Scalar::Number(5.0));
        assert_eq!(
            serde_json::to_value(&positionals).unwrap(),
            json!(["file.txt", 5])
        );
    }
}
