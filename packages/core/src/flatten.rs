//! The flattening service and its default node-map implementation.
//!
//! The resolver only needs one thing from a flattener: every node of the
//! document, hoisted to the top level of `@graph`, with nested nodes replaced
//! by identifier-only references. [`Flattener`] is that seam.
//! [`NodeMapFlattener`] fills it without expanding terms, so property names
//! come out exactly as the document spelled them.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use thiserror::Error;

use crate::document::{Document, IdKey, CONTEXT, GRAPH, LINK_KEY, LIST, SET, VALUE};

/// Process-wide flattening options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Base IRI joined onto relative node identifiers. `None` leaves them as is.
    pub base: Option<String>,
    /// Prefix of generated blank node identifiers.
    pub blank_node_prefix: String,
    /// Emit nodes sorted by identifier instead of first-seen order.
    pub ordered: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            base: None,
            blank_node_prefix: "_:b".into(),
            ordered: false,
        }
    }
}

/// Errors returned by a [`Flattener`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FlattenError {
    #[error("cannot flatten a top-level {found}; expected an object or sequence")]
    NotANode { found: &'static str },

    #[error("node identifier must be a string, found {found}")]
    InvalidNodeId { found: &'static str },

    /// Failure reported by an external processor.
    #[error("{0}")]
    Processor(String),
}

/// Turns a nested document into a flat `{"@graph": [...]}` node list.
///
/// Implementations must not retain state between calls; the resolver shares
/// one instance across threads.
pub trait Flattener: Send + Sync {
    fn flatten(
        &self,
        document: &Document,
        context: Option<&Document>,
        options: &FlattenOptions,
    ) -> Result<Document, FlattenError>;
}

/// Node-map flattening over compact keys.
///
/// Walks the document once, assigning each node object an identifier
/// (generating blank ids where missing) and merging every occurrence of the
/// same identifier into one node. Nodes that end up with nothing but an
/// identifier are left out of the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeMapFlattener;

impl Flattener for NodeMapFlattener {
    fn flatten(
        &self,
        document: &Document,
        context: Option<&Document>,
        options: &FlattenOptions,
    ) -> Result<Document, FlattenError> {
        let items = top_level_items(document)?;
        let mut map = NodeMap::new(IdKey::detect(document), options);
        for item in &items {
            map.reserve_ids(item);
        }
        for item in items {
            if let Document::Object(node) = item {
                if is_node(node) {
                    map.add_node(node)?;
                }
            }
        }
        Ok(map.into_document(context))
    }
}

fn top_level_items(document: &Document) -> Result<Vec<&Document>, FlattenError> {
    match document {
        Document::Object(map) => Ok(match map.get(GRAPH) {
            Some(Document::Sequence(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => vec![document],
        }),
        Document::Sequence(items) => Ok(items.iter().collect()),
        other => Err(FlattenError::NotANode {
            found: other.kind(),
        }),
    }
}

/// An object that names (or implicitly is) a node, as opposed to a value
/// object, a container wrapper, or a link placeholder.
fn is_node(map: &BTreeMap<String, Document>) -> bool {
    let placeholder = map.len() == 1 && map.contains_key(LINK_KEY);
    !(placeholder || map.contains_key(VALUE) || map.contains_key(LIST) || map.contains_key(SET))
}

struct NodeMap<'o> {
    id_key: IdKey,
    options: &'o FlattenOptions,
    order: Vec<String>,
    nodes: HashMap<String, BTreeMap<String, Document>>,
    // Ids the document spells out itself; generated blank ids skip these.
    authored: HashSet<String>,
    next_blank: usize,
}

impl<'o> NodeMap<'o> {
    fn new(id_key: IdKey, options: &'o FlattenOptions) -> Self {
        Self {
            id_key,
            options,
            order: Vec::new(),
            nodes: HashMap::new(),
            authored: HashSet::new(),
            next_blank: 0,
        }
    }

    /// Hoist `node` (and everything nested in it) and return its identifier.
    fn add_node(&mut self, node: &BTreeMap<String, Document>) -> Result<String, FlattenError> {
        let id = match node.get(self.id_key.as_str()) {
            Some(Document::String(id)) => self.resolve_id(id),
            Some(other) => {
                return Err(FlattenError::InvalidNodeId {
                    found: other.kind(),
                })
            }
            None => self.blank_id(),
        };
        self.ensure(&id);

        for (key, value) in node {
            if key == self.id_key.as_str() || key == CONTEXT {
                continue;
            }
            let flattened = self.flatten_value(value)?;
            self.merge(&id, key, flattened);
        }
        Ok(id)
    }

    fn flatten_value(&mut self, value: &Document) -> Result<Document, FlattenError> {
        match value {
            Document::Sequence(items) => items
                .iter()
                .map(|item| self.flatten_value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Document::Sequence),
            Document::Object(map) if is_node(map) => {
                let id = self.add_node(map)?;
                Ok(Document::Object(BTreeMap::from([(
                    self.id_key.as_str().to_string(),
                    Document::String(id),
                )])))
            }
            Document::Object(map) if map.contains_key(LIST) || map.contains_key(SET) => {
                let mut out = map.clone();
                for key in [LIST, SET] {
                    if let Some(inner) = map.get(key) {
                        out.insert(key.to_string(), self.flatten_value(inner)?);
                    }
                }
                Ok(Document::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn ensure(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            let node = BTreeMap::from([(
                self.id_key.as_str().to_string(),
                Document::String(id.to_string()),
            )]);
            self.nodes.insert(id.to_string(), node);
            self.order.push(id.to_string());
        }
    }

    // Repeated properties collect into a sequence without duplicates.
    fn merge(&mut self, id: &str, key: &str, value: Document) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        match node.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if *existing == value {
                    return;
                }
                let mut items = match std::mem::replace(existing, Document::Null) {
                    Document::Sequence(items) => items,
                    single => vec![single],
                };
                let incoming = match value {
                    Document::Sequence(items) => items,
                    single => vec![single],
                };
                for item in incoming {
                    if !items.contains(&item) {
                        items.push(item);
                    }
                }
                *existing = Document::Sequence(items);
            }
        }
    }

    fn resolve_id(&self, id: &str) -> String {
        match &self.options.base {
            Some(base) if !id.contains(':') => format!("{base}{id}"),
            _ => id.to_string(),
        }
    }

    /// Record every node id written in `value`, at any depth.
    fn reserve_ids(&mut self, value: &Document) {
        match value {
            Document::Sequence(items) => items.iter().for_each(|item| self.reserve_ids(item)),
            Document::Object(map) => {
                if is_node(map) {
                    if let Some(Document::String(id)) = map.get(self.id_key.as_str()) {
                        let id = self.resolve_id(id);
                        self.authored.insert(id);
                    }
                }
                map.iter()
                    .filter(|(key, _)| key.as_str() != CONTEXT)
                    .for_each(|(_, v)| self.reserve_ids(v));
            }
            _ => {}
        }
    }

    fn blank_id(&mut self) -> String {
        loop {
            let id = format!("{}{}", self.options.blank_node_prefix, self.next_blank);
            self.next_blank += 1;
            if !self.authored.contains(&id) {
                return id;
            }
        }
    }

    fn into_document(mut self, context: Option<&Document>) -> Document {
        if self.options.ordered {
            self.order.sort();
        }
        let graph = self
            .order
            .iter()
            .filter_map(|id| self.nodes.remove(id))
            // identifier-only nodes carry no data of their own
            .filter(|node| node.len() > 1)
            .map(Document::Object)
            .collect();

        let mut out = BTreeMap::new();
        if let Some(context) = context {
            out.insert(CONTEXT.to_string(), context.clone());
        }
        out.insert(GRAPH.to_string(), Document::Sequence(graph));
        Document::Object(out)
    }
}

// --- tests -------------------------------------------------------------------
