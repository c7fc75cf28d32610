//! Field tree used by the redirect protocol.
//!
//! Requests are flattened into `(path, value)` pairs before signing, and
//! query strings returned by the gateway are unflattened back into a tree.
//! Paths nest with `.` for map keys and `[n]` for sequence indices:
//!
//! ```text
//! credit_card.number
//! credit_card.billing_address.postal_code
//! customer.credit_cards[0].token
//! ```
//!
//! Decoding also accepts `[name]` as a map key, so `credit_card[number]` and
//! `credit_card.number` address the same field.

use std::collections::{BTreeMap, btree_map::Entry};

use serde_json::Value;

use crate::error::{GatewayError, Result};

/// A node in a field tree.
///
/// Maps keep insertion order. Scalars are always strings: the gateway treats
/// every submitted value as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf value.
    Scalar(String),
    /// Ordered key/value entries.
    Map(Vec<(String, Node)>),
    /// Positional entries.
    Seq(Vec<Node>),
}

impl Node {
    /// Creates an empty map node.
    #[must_use]
    pub const fn map() -> Self {
        Self::Map(Vec::new())
    }

    /// Builder form of [`Node::insert`].
    ///
    /// # Examples
    ///
    /// ```
    /// use braintree_tr::tr::Node;
    ///
    /// let node = Node::map()
    ///     .with("credit_card", Node::map().with("cardholder_name", "John Doe"));
    /// assert_eq!(node.lookup("credit_card.cardholder_name").and_then(Node::as_str), Some("John Doe"));
    /// ```
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Self>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts `value` under `key`, replacing and returning a previous entry.
    ///
    /// A non-map node is first replaced by an empty map.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Self>) -> Option<Self> {
        let key = key.into();
        let value = value.into();
        if !matches!(self, Self::Map(_)) {
            *self = Self::map();
        }
        let Self::Map(entries) = self else {
            return None;
        };
        if let Some((_, existing)) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, value));
        }
        entries.push((key, value));
        None
    }

    /// Returns the child stored under `key` if this is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Resolves a dotted/bracket path such as `credit_card.billing_address.postal_code`.
    ///
    /// Returns `None` for a malformed path or a path that leads nowhere.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        let segments = parse_path(path).ok()?;
        segments.iter().try_fold(self, |node, segment| match (node, segment) {
            (Self::Map(_), Segment::Key(key)) => node.get(key),
            (Self::Seq(items), Segment::Index(index)) => items.get(*index),
            _ => None,
        })
    }

    /// Returns the value of a scalar node.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true for a map or sequence with no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(_) => false,
            Self::Map(entries) => entries.is_empty(),
            Self::Seq(items) => items.is_empty(),
        }
    }

    /// Flattens the tree into `(path, value)` pairs in depth-first insertion order.
    ///
    /// Empty maps and sequences contribute no pairs. A scalar root yields a
    /// single pair with an empty path.
    ///
    /// # Examples
    ///
    /// ```
    /// use braintree_tr::tr::Node;
    ///
    /// let node = Node::map().with(
    ///     "credit_card",
    ///     Node::map()
    ///         .with("number", "5105105105105100")
    ///         .with("billing_address", Node::map().with("postal_code", "44444")),
    /// );
    ///
    /// assert_eq!(
    ///     node.flatten(),
    ///     vec![
    ///         ("credit_card.number".to_owned(), "5105105105105100".to_owned()),
    ///         ("credit_card.billing_address.postal_code".to_owned(), "44444".to_owned()),
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        flatten_into(self, String::new(), &mut pairs);
        pairs
    }

    /// Rebuilds a map tree from `(path, value)` pairs.
    ///
    /// Sequence indices must be contiguous from zero.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedQuery`] if a path is malformed, a path is
    /// assigned twice, a path treats a scalar as a container, or a sequence
    /// has gaps.
    pub fn unflatten<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Builder::Map(Vec::new());
        for (path, value) in pairs {
            let path = path.as_ref();
            let segments = parse_path(path)?;
            let Some((head, rest)) = segments.split_first() else {
                return Err(malformed(path, "empty field path"));
            };
            root.insert(head, rest, value.into(), path)?;
        }
        root.finish()
    }

    /// Converts a JSON value into a field tree.
    ///
    /// Nulls are dropped, booleans and numbers are rendered as text. Returns
    /// `None` when the value itself is null.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(flag) => Some(Self::Scalar(flag.to_string())),
            Value::Number(number) => Some(Self::Scalar(number.to_string())),
            Value::String(text) => Some(Self::Scalar(text.clone())),
            Value::Array(items) => Some(Self::Seq(items.iter().filter_map(Self::from_json).collect())),
            Value::Object(object) => Some(Self::Map(
                object
                    .iter()
                    .filter_map(|(key, value)| Self::from_json(value).map(|node| (key.clone(), node)))
                    .collect(),
            )),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

fn flatten_into(node: &Node, prefix: String, pairs: &mut Vec<(String, String)>) {
    match node {
        Node::Scalar(value) => pairs.push((prefix, value.clone())),
        Node::Map(entries) => {
            for (key, child) in entries {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                flatten_into(child, path, pairs);
            }
        }
        Node::Seq(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{prefix}[{index}]"), pairs);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn malformed(path: &str, reason: &str) -> GatewayError {
    GatewayError::MalformedQuery(format!("{reason} in field path '{path}'"))
}

/// Splits `a.b[0][name]` into `[Key(a), Key(b), Index(0), Key(name)]`.
fn parse_path(path: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = path;

    let end = rest.find(['.', '[']).unwrap_or(rest.len());
    if end == 0 {
        return Err(malformed(path, "empty segment"));
    }
    segments.push(Segment::Key(rest[..end].to_owned()));
    rest = &rest[end..];

    while let Some(first) = rest.chars().next() {
        if first == '.' {
            let tail = &rest[1..];
            let end = tail.find(['.', '[']).unwrap_or(tail.len());
            if end == 0 {
                return Err(malformed(path, "empty segment"));
            }
            segments.push(Segment::Key(tail[..end].to_owned()));
            rest = &tail[end..];
        } else if first == '[' {
            let Some(close) = rest.find(']') else {
                return Err(malformed(path, "unclosed bracket"));
            };
            let inner = &rest[1..close];
            if inner.is_empty() || inner.contains('[') {
                return Err(malformed(path, "empty or nested bracket"));
            }
            if inner.bytes().all(|b| b.is_ascii_digit()) {
                let index = inner.parse().map_err(|_| malformed(path, "index out of range"))?;
                segments.push(Segment::Index(index));
            } else {
                segments.push(Segment::Key(inner.to_owned()));
            }
            rest = &rest[close + 1..];
            if !(rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')) {
                return Err(malformed(path, "unexpected text after bracket"));
            }
        } else {
            return Err(malformed(path, "unexpected character"));
        }
    }

    Ok(segments)
}

/// Intermediate tree: sequences are keyed by index until every pair is placed.
enum Builder {
    Leaf(String),
    Map(Vec<(String, Builder)>),
    Seq(BTreeMap<usize, Builder>),
}

impl Builder {
    fn container_for(segment: &Segment) -> Self {
        match segment {
            Segment::Key(_) => Self::Map(Vec::new()),
            Segment::Index(_) => Self::Seq(BTreeMap::new()),
        }
    }

    fn insert(&mut self, head: &Segment, rest: &[Segment], value: String, path: &str) -> Result<()> {
        match (self, head) {
            (Self::Map(entries), Segment::Key(key)) => {
                let position = entries.iter().position(|(k, _)| k == key);
                match (rest.split_first(), position) {
                    (None, Some(_)) => Err(malformed(path, "duplicate field")),
                    (None, None) => {
                        entries.push((key.clone(), Self::Leaf(value)));
                        Ok(())
                    }
                    (Some((next, tail)), Some(index)) => entries[index].1.insert(next, tail, value, path),
                    (Some((next, tail)), None) => {
                        entries.push((key.clone(), Self::container_for(next)));
                        let last = entries.len() - 1;
                        entries[last].1.insert(next, tail, value, path)
                    }
                }
            }
            (Self::Seq(items), Segment::Index(index)) => match rest.split_first() {
                None => match items.entry(*index) {
                    Entry::Occupied(_) => Err(malformed(path, "duplicate field")),
                    Entry::Vacant(slot) => {
                        slot.insert(Self::Leaf(value));
                        Ok(())
                    }
                },
                Some((next, tail)) => items
                    .entry(*index)
                    .or_insert_with(|| Self::container_for(next))
                    .insert(next, tail, value, path),
            },
            _ => Err(malformed(path, "conflicting field")),
        }
    }

    fn finish(self) -> Result<Node> {
        match self {
            Self::Leaf(value) => Ok(Node::Scalar(value)),
            Self::Map(entries) => entries
                .into_iter()
                .map(|(key, child)| child.finish().map(|node| (key, node)))
                .collect::<Result<Vec<_>>>()
                .map(Node::Map),
            Self::Seq(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for (expected, (index, child)) in items.into_iter().enumerate() {
                    if index != expected {
                        return Err(GatewayError::MalformedQuery(format!(
                            "sequence index {index} found where {expected} was expected"
                        )));
                    }
                    nodes.push(child.finish()?);
                }
                Ok(Node::Seq(nodes))
            }
        }
    }
}
