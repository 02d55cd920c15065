//! Errors returned by path resolution.

use thiserror::Error;

use crate::document::{Document, IdKey};
use crate::flatten::FlattenError;

/// Coarse classification of a [`ResolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A node, property, or referenced id does not exist.
    NotFound,
    /// A numeric segment lies outside the sequence.
    OutOfBounds,
    /// The document or a segment does not have the shape the walk needs.
    Malformed,
    /// A value was produced but path segments remain.
    PartialResolution,
    /// Link resolution reached something that is not a link.
    NotALink,
    /// The flattening service failed.
    Flatten,
}

/// Why a path could not be resolved.
///
/// Every failure is terminal for the call that produced it.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("could not find top-level node with {id_key} {id:?}")]
    NodeNotFound { id: String, id_key: IdKey },

    #[error("could not find top-level property {key:?}")]
    PropertyNotFound { key: String },

    #[error("invalid id {id:?}: no node in the flattened graph carries it")]
    InvalidId { id: String },

    #[error("sequence index {index} is out of bounds (length {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("path segment {segment:?} is not a sequence index")]
    InvalidIndex { segment: String },

    #[error("invalid JSON-LD document: expected {expected}, found {found}")]
    InvalidDocument {
        expected: &'static str,
        found: &'static str,
    },

    #[error("could not parse top-level document: found {found}")]
    UnsupportedTopLevel { found: &'static str },

    #[error("@index must be a string, found {found}")]
    InvalidIndexAnnotation { found: &'static str },

    /// The walk stopped on a non-link value with segments left over. The
    /// value reached so far is kept so callers can inspect it.
    #[error("could not resolve all the way through: {} segment(s) remain", .remaining.len())]
    Incomplete {
        value: Box<Document>,
        remaining: Vec<String>,
    },

    #[error("found non-link at given path: {found}")]
    NotALink {
        found: &'static str,
        remaining: Vec<String>,
    },

    #[error("link placeholder {text:?} is not a valid CID: {reason}")]
    InvalidLink { text: String, reason: String },

    #[error("flattening failed: {0}")]
    Flatten(#[from] FlattenError),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::NodeNotFound { .. }
            | ResolveError::PropertyNotFound { .. }
            | ResolveError::InvalidId { .. } => ErrorKind::NotFound,
            ResolveError::IndexOutOfBounds { .. } => ErrorKind::OutOfBounds,
            ResolveError::InvalidIndex { .. }
            | ResolveError::InvalidDocument { .. }
            | ResolveError::UnsupportedTopLevel { .. }
            | ResolveError::InvalidIndexAnnotation { .. }
            | ResolveError::InvalidLink { .. } => ErrorKind::Malformed,
            ResolveError::Incomplete { .. } => ErrorKind::PartialResolution,
            ResolveError::NotALink { .. } => ErrorKind::NotALink,
            ResolveError::Flatten(_) => ErrorKind::Flatten,
        }
    }
}
