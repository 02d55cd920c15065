//! The flattened node graph and the walk through it.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::descent::parse_index;
use crate::document::{Document, IdKey, GRAPH};
use crate::error::ResolveError;
use crate::extract::extract;

/// The node list of a flattened document, indexed by identifier.
///
/// Nodes are owned in a flat `Vec`; references between them are id lookups
/// into `index`, so cyclic graphs need no pointer cycles.
///
/// When two nodes carry the same identifier, the first one wins. Later
/// duplicates stay in the node list but are unreachable by reference.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Document>,
    index: HashMap<String, usize>,
}

impl NodeArena {
    /// Take ownership of a flattened document's `@graph`.
    ///
    /// The document must be an object whose `@graph` is a sequence of objects.
    pub fn from_flattened(flattened: Document, id_key: IdKey) -> Result<Self, ResolveError> {
        const EXPECTED: &str = "a flattened object with a @graph sequence of node objects";

        let found = flattened.kind();
        let Document::Object(mut map) = flattened else {
            return Err(ResolveError::InvalidDocument {
                expected: EXPECTED,
                found,
            });
        };
        let nodes = match map.remove(GRAPH) {
            Some(Document::Sequence(nodes)) => nodes,
            other => {
                return Err(ResolveError::InvalidDocument {
                    expected: EXPECTED,
                    found: other.as_ref().map_or("nothing", Document::kind),
                })
            }
        };
        if let Some(bad) = nodes.iter().find(|n| n.as_object().is_none()) {
            return Err(ResolveError::InvalidDocument {
                expected: EXPECTED,
                found: bad.kind(),
            });
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            let Some(id) = node.get(id_key.as_str()).and_then(Document::as_str) else {
                continue;
            };
            if index.contains_key(id) {
                tracing::warn!(id, "flattened graph repeats a node id; keeping the first");
                continue;
            }
            index.insert(id.to_string(), i);
        }

        Ok(Self { nodes, index })
    }

    /// The node carrying identifier `id`.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Total number of nodes, including unreachable duplicates.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in graph order.
    pub fn nodes(&self) -> impl Iterator<Item = &Document> {
        self.nodes.iter()
    }
}

/// Walk `path` from `value` through the flattened graph.
///
/// Each step consumes one segment, indexes the current sequence or object,
/// and runs [`extract`] on what it found. The walk stops early, without
/// error, on a scalar (including null) or a link placeholder: the unconsumed
/// segments are returned for the caller to judge.
pub fn walk<'a, 'p, S: AsRef<str>>(
    nodes: &'a NodeArena,
    mut value: Cow<'a, Document>,
    mut path: &'p [S],
    id_key: IdKey,
) -> Result<(Cow<'a, Document>, &'p [S]), ResolveError> {
    while let Some((head, rest)) = path.split_first() {
        if value.is_scalar() || value.link().is_some() {
            break;
        }
        let segment = head.as_ref();
        tracing::trace!(segment, kind = value.kind(), "graph step");

        value = match value {
            Cow::Borrowed(current) => step(nodes, current, segment, id_key)?,
            Cow::Owned(current) => Cow::Owned(step(nodes, &current, segment, id_key)?.into_owned()),
        };
        path = rest;
    }
    Ok((value, path))
}

fn step<'a>(
    nodes: &'a NodeArena,
    value: &'a Document,
    segment: &str,
    id_key: IdKey,
) -> Result<Cow<'a, Document>, ResolveError> {
    match value {
        Document::Sequence(items) => extract(nodes, &items[parse_index(segment, items.len())?], id_key),
        Document::Object(map) => {
            let found = map.get(segment).ok_or_else(|| ResolveError::PropertyNotFound {
                key: segment.to_string(),
            })?;
            extract(nodes, found, id_key)
        }
        other => Err(ResolveError::InvalidDocument {
            expected: "a sequence or object",
            found: other.kind(),
        }),
    }
}

// --- tests -------------------------------------------------------------------
