//! Value extraction: what a property value *means* once the graph is flat.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::document::{Document, IdKey, INDEX, LIST, SET, VALUE};
use crate::error::ResolveError;
use crate::graph::NodeArena;

/// Interpret `value` against the flattened node set.
///
/// 1. Single-key `@list` / `@set` wrappers are peeled off, repeatedly.
/// 2. A value object yields its `@value`, keyed by `@index` when present.
/// 3. An object holding only the identifier key is replaced by the node it
///    names.
///
/// Anything else comes back untouched. Nothing is copied unless an `@index`
/// wrapper has to be built.
pub fn extract<'a>(
    nodes: &'a NodeArena,
    value: &'a Document,
    id_key: IdKey,
) -> Result<Cow<'a, Document>, ResolveError> {
    let value = unwrap_containers(value);

    let Document::Object(map) = value else {
        return Ok(Cow::Borrowed(value));
    };

    if let Some(inner) = map.get(VALUE) {
        return match map.get(INDEX) {
            Some(Document::String(index)) => Ok(Cow::Owned(Document::Object(BTreeMap::from([(
                index.clone(),
                inner.clone(),
            )])))),
            Some(other) => Err(ResolveError::InvalidIndexAnnotation {
                found: other.kind(),
            }),
            None => Ok(Cow::Borrowed(inner)),
        };
    }

    if map.len() == 1 {
        if let Some(id) = map.get(id_key.as_str()) {
            return id
                .as_str()
                .and_then(|id| nodes.get(id))
                .map(Cow::Borrowed)
                .ok_or_else(|| ResolveError::InvalidId {
                    id: id.as_str().map_or_else(|| id.to_string(), str::to_string),
                });
        }
    }

    Ok(Cow::Borrowed(value))
}

fn unwrap_containers(mut value: &Document) -> &Document {
    while let Document::Object(map) = value {
        if map.len() != 1 {
            break;
        }
        match map.get(LIST).or_else(|| map.get(SET)) {
            Some(inner) => value = inner,
            None => break,
        }
    }
    value
}

// --- tests -------------------------------------------------------------------
