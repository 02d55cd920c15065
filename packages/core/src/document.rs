//! The in-memory document model shared by every resolution stage.
//!
//! A [`Document`] is a tagged union over the shapes a decoded JSON-LD block
//! can take. Links to other blocks are first-class ([`Document::Link`]), so
//! the resolver can stop at them instead of treating them as ordinary maps.
//!
//! Objects are stored in a [`BTreeMap`]: key order carries no meaning in
//! JSON-LD, and a sorted map keeps rendering and encoding deterministic.

use std::collections::BTreeMap;
use std::fmt;

use cid::Cid;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

/// Keyword carrying the JSON-LD context.
pub const CONTEXT: &str = "@context";
/// Keyword carrying the top-level node array of a graph.
pub const GRAPH: &str = "@graph";
/// Ordered container wrapper.
pub const LIST: &str = "@list";
/// Unordered container wrapper.
pub const SET: &str = "@set";
/// Scalar value wrapper.
pub const VALUE: &str = "@value";
/// Index annotation on a value wrapper.
pub const INDEX: &str = "@index";
/// Sole key of a DAG-JSON link placeholder: `{"/": "<cid>"}`.
pub const LINK_KEY: &str = "/";

/// A decoded JSON-LD document, or any value reachable inside one.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Document>),
    Object(BTreeMap<String, Document>),
    /// A reference to another block by content identifier.
    Link(Cid),
}

impl Document {
    /// Short lowercase name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "sequence",
            Document::Object(_) => "object",
            Document::Link(_) => "link",
        }
    }

    /// `true` for every variant that cannot be indexed by a path segment.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Document::Sequence(_) | Document::Object(_))
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up `key` when this is an object.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Classify this value as a link to external content.
    ///
    /// Both a decoded [`Document::Link`] and the single-key placeholder
    /// `{"/": "<string>"}` count. The placeholder's string is not parsed here;
    /// see [`LinkRef::to_cid`].
    pub fn link(&self) -> Option<LinkRef<'_>> {
        match self {
            Document::Link(cid) => Some(LinkRef::Cid(cid)),
            Document::Object(map) if map.len() == 1 => match map.get(LINK_KEY) {
                Some(Document::String(s)) => Some(LinkRef::Placeholder(s)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`, spelling links as `{"/": "<cid>"}`.
    pub fn to_json(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(*b),
            Document::Number(n) => Value::Number(n.clone()),
            Document::String(s) => Value::String(s.clone()),
            Document::Sequence(items) => Value::Array(items.iter().map(Document::to_json).collect()),
            Document::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            Document::Link(cid) => {
                let mut map = Map::new();
                map.insert(LINK_KEY.into(), Value::String(cid.to_string()));
                Value::Object(map)
            }
        }
    }
}

/// Plain structural conversion. `{"/": ...}` objects stay objects; lifting
/// them into [`Document::Link`] is the codec's job.
impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => Document::Sequence(items.into_iter().map(Document::from).collect()),
            Value::Object(map) => Document::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Cid> for Document {
    fn from(cid: Cid) -> Self {
        Document::Link(cid)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

/// Formats the value as compact JSON.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) => n.serialize(serializer),
            Document::String(s) => serializer.serialize_str(s),
            Document::Sequence(items) => items.serialize(serializer),
            Document::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Document::Link(cid) => {
                let mut out = serializer.serialize_map(Some(1))?;
                out.serialize_entry(LINK_KEY, &cid.to_string())?;
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from)
    }
}

/// A link found by [`Document::link`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkRef<'a> {
    /// A decoded content identifier.
    Cid(&'a Cid),
    /// The string inside a `{"/": ...}` placeholder, not yet parsed.
    Placeholder(&'a str),
}

impl LinkRef<'_> {
    /// The content identifier this link points at.
    pub fn to_cid(&self) -> Result<Cid, cid::Error> {
        match self {
            LinkRef::Cid(cid) => Ok(**cid),
            LinkRef::Placeholder(s) => Cid::try_from(*s),
        }
    }
}

/// The key that names a node so other values can reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdKey {
    /// The JSON-LD keyword `@id`.
    #[default]
    At,
    /// The bare `id` alias used by documents whose `@context` is a remote
    /// reference (a plain string) rather than an inline object.
    Plain,
}

impl IdKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKey::At => "@id",
            IdKey::Plain => "id",
        }
    }

    /// Pick the identifier key for a document from the shape of its
    /// top-level `@context`.
    pub fn detect(document: &Document) -> Self {
        match document.get(CONTEXT) {
            Some(Document::String(_)) => IdKey::Plain,
            _ => IdKey::At,
        }
    }
}

impl fmt::Display for IdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- tests -------------------------------------------------------------------
