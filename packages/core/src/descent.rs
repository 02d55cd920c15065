//! Top-level descent: the first path segment, against the raw document.
//!
//! Most lookups are one segment deep, so this step deliberately works on the
//! document as decoded. Only when segments remain afterwards does the
//! resolver pay for flattening.

use crate::document::{Document, IdKey, CONTEXT, GRAPH};
use crate::error::ResolveError;

/// Where top-level descent stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Descent<'d, 'p, S> {
    /// The value selected by the first segment.
    pub value: &'d Document,
    /// Segments still to walk.
    pub remaining: &'p [S],
    /// Context to hand to the flattener, when the document is graph-shaped.
    pub context: Option<&'d Document>,
    /// Identifier key in force for this document.
    pub id_key: IdKey,
}

/// Consume the first segment of `path` against `document`.
///
/// An empty path selects the document itself.
pub fn descend<'d, 'p, S: AsRef<str>>(
    document: &'d Document,
    path: &'p [S],
) -> Result<Descent<'d, 'p, S>, ResolveError> {
    let id_key = IdKey::detect(document);

    let Some((head, rest)) = path.split_first() else {
        return Ok(Descent {
            value: document,
            remaining: path,
            context: None,
            id_key,
        });
    };
    let head = head.as_ref();

    match document {
        Document::Object(map) if is_graph_shaped(document) => {
            let nodes = map
                .get(GRAPH)
                .and_then(Document::as_sequence)
                .filter(|nodes| nodes.iter().all(|n| n.as_object().is_some()))
                .ok_or(ResolveError::InvalidDocument {
                    expected: "a sequence of node objects under @graph",
                    found: map.get(GRAPH).map_or("nothing", Document::kind),
                })?;

            let node = nodes
                .iter()
                .find(|n| n.get(id_key.as_str()).and_then(Document::as_str) == Some(head))
                .ok_or_else(|| ResolveError::NodeNotFound {
                    id: head.to_string(),
                    id_key,
                })?;

            Ok(Descent {
                value: node,
                remaining: rest,
                context: map.get(CONTEXT),
                id_key,
            })
        }
        Document::Object(map) => {
            let value = map.get(head).ok_or_else(|| ResolveError::PropertyNotFound {
                key: head.to_string(),
            })?;
            Ok(Descent {
                value,
                remaining: rest,
                context: None,
                id_key,
            })
        }
        Document::Sequence(items) => {
            let value = &items[parse_index(head, items.len())?];
            Ok(Descent {
                value,
                remaining: rest,
                context: None,
                id_key,
            })
        }
        other => Err(ResolveError::UnsupportedTopLevel {
            found: other.kind(),
        }),
    }
}

/// An object with exactly the keys `@context` and `@graph`.
pub fn is_graph_shaped(document: &Document) -> bool {
    document
        .as_object()
        .is_some_and(|map| map.len() == 2 && map.contains_key(CONTEXT) && map.contains_key(GRAPH))
}

/// Parse a decimal sequence index and check it against `len`.
///
/// Negative numbers parse but are out of bounds; anything that is not an
/// integer is rejected as a malformed segment.
pub fn parse_index(segment: &str, len: usize) -> Result<usize, ResolveError> {
    let index: i64 = segment.parse().map_err(|_| ResolveError::InvalidIndex {
        segment: segment.to_string(),
    })?;
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(ResolveError::IndexOutOfBounds { index, len })
}

// --- tests -------------------------------------------------------------------
