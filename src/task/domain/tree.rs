//! Structured, ordered view of a step's properties.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// A node in a [`PropertyTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNode {
    /// A scalar or array value.
    Leaf(Value),
    /// A nested object.
    Branch(PropertyTree),
}

impl Serialize for PropertyNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(value) => value.serialize(serializer),
            Self::Branch(tree) => tree.serialize(serializer),
        }
    }
}

/// Ordered, nested key/value pairs.
///
/// Objects become branches and everything else becomes a leaf. Entry order is
/// the order of the source document.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use workbasket::task::domain::PropertyTree;
///
/// let tree = PropertyTree::from_json(&json!({
///     "systemProperties": {"comment": "checked"}
/// }));
/// assert_eq!(
///     tree.lookup("systemProperties.comment"),
///     Some(&json!("checked"))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTree {
    entries: Vec<(String, PropertyNode)>,
}

impl PropertyTree {
    /// Builds a tree from a JSON document.
    ///
    /// A non-object document yields a single leaf under the empty key.
    #[must_use]
    pub fn from_json(document: &Value) -> Self {
        match document {
            Value::Object(members) => Self {
                entries: members
                    .iter()
                    .map(|(key, value)| (key.clone(), node_from(value)))
                    .collect(),
            },
            other => Self {
                entries: vec![(String::new(), PropertyNode::Leaf(other.clone()))],
            },
        }
    }

    /// Returns the direct child named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyNode> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    /// Follows a dot-separated path to a leaf value.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.get(first)?;
        for segment in segments {
            match node {
                PropertyNode::Branch(tree) => node = tree.get(segment)?,
                PropertyNode::Leaf(_) => return None,
            }
        }
        match node {
            PropertyNode::Leaf(value) => Some(value),
            PropertyNode::Branch(_) => None,
        }
    }

    /// Returns every leaf with its dot-separated path, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        self.collect_leaves("", &mut out);
        out
    }

    /// Returns the top-level entries in order.
    #[must_use]
    pub fn entries(&self) -> &[(String, PropertyNode)] {
        &self.entries
    }

    /// Returns `true` when the tree has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
        for (key, node) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                PropertyNode::Leaf(value) => out.push((path, value)),
                PropertyNode::Branch(tree) => tree.collect_leaves(&path, out),
            }
        }
    }
}

fn node_from(value: &Value) -> PropertyNode {
    match value {
        Value::Object(_) => PropertyNode::Branch(PropertyTree::from_json(value)),
        other => PropertyNode::Leaf(other.clone()),
    }
}

impl Serialize for PropertyTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}
