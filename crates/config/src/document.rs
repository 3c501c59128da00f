//! The raw configuration document.
//!
//! A configuration file is parsed once into an ordered tree of [`Node`]s.
//! There is no typed struct for the whole file: callers extract the pieces
//! they need with key lookups on [`Mapping`]. Keys keep their on-disk order,
//! and every mapping stores its entries as explicit key/value pairs so no
//! lookup can run past the end of a mapping.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};

use crate::error::{ConfigError, Result};

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An explicit or implied YAML null (`key:` with nothing after it).
    Null,
    /// A string, number, or boolean, kept in its textual form.
    Scalar(String),
    /// An ordered list of nodes.
    Sequence(Vec<Node>),
    /// An ordered key/value mapping.
    Mapping(Mapping),
}

impl Node {
    /// Returns the scalar text of this node, if it is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the mapping held by this node, if it is a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns whether this node is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short name for the kind of node, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

/// Builds [`Node`]s straight from the YAML event stream. Mapping entries are
/// pushed as they come, so repeated keys are all kept.
struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Node, D::Error> {
        Node::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Node, E> {
        Ok(Node::Scalar(serde_yaml::Number::from(v).to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Node, E> {
        Ok(Node::Scalar(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Node, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<Node>()? {
            let key = match key {
                Node::Null => String::new(),
                Node::Scalar(text) => text,
                Node::Sequence(_) | Node::Mapping(_) => {
                    return Err(de::Error::custom("mapping keys must be plain values"));
                }
            };
            entries.push((key, map.next_value()?));
        }
        Ok(Node::Mapping(Mapping { entries }))
    }

    // Tagged values (`!tag value`) arrive as enums; the tag is dropped.
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> std::result::Result<Node, A::Error> {
        let (_tag, variant) = data.variant::<de::IgnoredAny>()?;
        variant.newtype_variant()
    }
}

/// An ordered list of key/value entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key` by scanning the entries.
    ///
    /// When the key appears more than once, the last occurrence wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    /// Returns whether any entry has the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Replaces the value of `key`, or appends it when absent.
    pub fn set(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.entries.iter_mut().rev().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((key, node)),
        }
    }

    /// Iterates over the entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A parsed configuration file whose top level is a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Mapping,
}

impl Document {
    /// Parses raw YAML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] if the bytes are not valid YAML,
    /// the document is empty, or its top level is not a mapping. Repeated
    /// keys are not an error; every occurrence is kept in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use gh_config::document::Document;
    ///
    /// let doc = Document::parse(b"editor: /usr/bin/vim\n").unwrap();
    /// assert_eq!(doc.root().get("editor").and_then(|n| n.as_scalar()), Some("/usr/bin/vim"));
    ///
    /// assert!(Document::parse(b"- just\n- a list\n").is_err());
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self> {
        match serde_yaml::from_slice::<Node>(data)? {
            Node::Mapping(root) => Ok(Self { root }),
            Node::Null => Err(ConfigError::malformed("empty document")),
            other => Err(ConfigError::malformed(format!(
                "expected a top level map, found a {}",
                other.kind_name()
            ))),
        }
    }

    /// Wraps an already built top-level mapping.
    #[must_use]
    pub fn from_root(root: Mapping) -> Self {
        Self { root }
    }

    /// The top-level mapping.
    #[must_use]
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Mutable access to the top-level mapping.
    pub fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }
}
