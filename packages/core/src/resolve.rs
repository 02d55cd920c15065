//! Two-phase path resolution: structural descent, then the flattened graph.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use cid::Cid;
use serde::Serialize;

use crate::config::ResolverConfig;
use crate::descent::descend;
use crate::document::Document;
use crate::error::ResolveError;
use crate::flatten::{FlattenError, FlattenOptions, Flattener, NodeMapFlattener};
use crate::graph::{walk, NodeArena};

/// The value found at a path, plus any segments left for the host to follow.
///
/// `remaining` is only non-empty when `value` is a link: the rest of the path
/// belongs to the linked block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub value: Document,
    pub remaining: Vec<String>,
}

impl Resolution {
    /// `true` when the whole path was consumed inside this document.
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Resolves paths inside JSON-LD documents.
///
/// Cheap to clone; the flattener is shared and the configuration is never
/// mutated after construction.
#[derive(Clone)]
pub struct Resolver {
    flattener: Arc<dyn Flattener>,
    config: ResolverConfig,
    // Raw values still carry the ids as written, so the walk must see them
    // unrebased.
    walk_options: FlattenOptions,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    /// A resolver backed by [`NodeMapFlattener`].
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_flattener(Arc::new(NodeMapFlattener), config)
    }

    /// A resolver backed by an arbitrary flattening service.
    pub fn with_flattener(flattener: Arc<dyn Flattener>, config: ResolverConfig) -> Self {
        let walk_options = FlattenOptions {
            base: None,
            ..config.flatten.clone()
        };
        Self {
            flattener,
            config,
            walk_options,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Flatten `document` with this resolver's service and options.
    pub fn flatten(
        &self,
        document: &Document,
        context: Option<&Document>,
    ) -> Result<Document, FlattenError> {
        self.flattener.flatten(document, context, &self.config.flatten)
    }

    /// Resolve `path` inside `document`.
    ///
    /// The first segment is matched against the document as decoded. Only if
    /// more segments follow is the document flattened and the rest of the
    /// path walked through its node graph.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Incomplete`] if the walk stops on a non-link
    /// value before the path is exhausted, and the matching lookup error if
    /// any segment fails to index the value in front of it.
    pub fn resolve<S: AsRef<str>>(
        &self,
        document: &Document,
        path: &[S],
    ) -> Result<Resolution, ResolveError> {
        if path.is_empty() {
            return Ok(Resolution {
                value: document.clone(),
                remaining: Vec::new(),
            });
        }

        let descent = descend(document, path)?;
        if descent.remaining.is_empty() {
            tracing::debug!(segment = path[0].as_ref(), "resolved by top-level descent");
            return Ok(Resolution {
                value: descent.value.clone(),
                remaining: Vec::new(),
            });
        }

        tracing::debug!(
            remaining = descent.remaining.len(),
            id_key = %descent.id_key,
            "flattening document"
        );
        let flattened = self
            .flattener
            .flatten(document, descent.context, &self.walk_options)?;
        let nodes = NodeArena::from_flattened(flattened, descent.id_key)?;
        let (value, rest) = walk(
            &nodes,
            Cow::Borrowed(descent.value),
            descent.remaining,
            descent.id_key,
        )?;

        classify(value.into_owned(), rest)
    }

    /// Resolve `path` and require the result to be a link.
    ///
    /// Returns the linked CID together with the segments that should be
    /// resolved inside the linked block.
    pub fn resolve_link<S: AsRef<str>>(
        &self,
        document: &Document,
        path: &[S],
    ) -> Result<(Cid, Vec<String>), ResolveError> {
        let Resolution { value, remaining } = self.resolve(document, path)?;
        match value.link() {
            Some(link) => link
                .to_cid()
                .map(|cid| (cid, remaining))
                .map_err(|e| ResolveError::InvalidLink {
                    text: value.to_string(),
                    reason: e.to_string(),
                }),
            None => Err(ResolveError::NotALink {
                found: value.kind(),
                remaining,
            }),
        }
    }
}

// A link ends the walk no matter how much path is left; anything else must
// have consumed every segment.
fn classify<S: AsRef<str>>(value: Document, rest: &[S]) -> Result<Resolution, ResolveError> {
    let remaining: Vec<String> = rest.iter().map(|s| s.as_ref().to_string()).collect();
    if remaining.is_empty() || value.link().is_some() {
        Ok(Resolution { value, remaining })
    } else {
        Err(ResolveError::Incomplete {
            value: Box::new(value),
            remaining,
        })
    }
}

// --- tests -------------------------------------------------------------------
