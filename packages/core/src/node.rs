//! A decoded JSON-LD block, as handed to the host runtime.

use cid::Cid;

use crate::codec::{Block, CodecError};
use crate::document::Document;
use crate::error::ResolveError;
use crate::resolve::{Resolution, Resolver};

/// A decoded block: its CID, its document, and the bytes it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    cid: Cid,
    document: Document,
    raw: Vec<u8>,
}

impl Node {
    pub fn new(cid: Cid, document: Document, raw: Vec<u8>) -> Self {
        Self { cid, document, raw }
    }

    /// Encode `document` into a fresh block and wrap it.
    pub fn from_document(document: Document) -> Result<Self, CodecError> {
        let Block { cid, data } = Block::encode(&document)?;
        Ok(Self::new(cid, document, data))
    }

    pub fn cid(&self) -> Cid {
        self.cid
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn raw_data(&self) -> &[u8] {
        &self.raw
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    /// Resolve `path` inside this block. See [`Resolver::resolve`].
    pub fn resolve<S: AsRef<str>>(
        &self,
        resolver: &Resolver,
        path: &[S],
    ) -> Result<Resolution, ResolveError> {
        resolver.resolve(&self.document, path)
    }

    /// Resolve `path` to a link out of this block. See [`Resolver::resolve_link`].
    pub fn resolve_link<S: AsRef<str>>(
        &self,
        resolver: &Resolver,
        path: &[S],
    ) -> Result<(Cid, Vec<String>), ResolveError> {
        resolver.resolve_link(&self.document, path)
    }

    /// Every CID this block links to, in document order.
    pub fn links(&self) -> Vec<Cid> {
        let mut out = Vec::new();
        collect_links(&self.document, &mut out);
        out
    }

    /// List the structural paths below `prefix`, `/`-joined and relative to it.
    ///
    /// `depth` bounds how many segments deep the listing goes; `None` lists
    /// everything. Links are listed but not entered. A prefix that does not
    /// name a sequence or object yields an empty list.
    pub fn tree<S: AsRef<str>>(&self, prefix: &[S], depth: Option<usize>) -> Vec<String> {
        let mut current = &self.document;
        for segment in prefix {
            let segment = segment.as_ref();
            let next = match current {
                Document::Object(map) => map.get(segment),
                Document::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Vec::new(),
            }
        }

        let mut out = Vec::new();
        list_paths(current, "", depth, &mut out);
        out
    }
}

fn collect_links(value: &Document, out: &mut Vec<Cid>) {
    match value {
        Document::Link(cid) => out.push(*cid),
        Document::Sequence(items) => items.iter().for_each(|v| collect_links(v, out)),
        Document::Object(map) => map.values().for_each(|v| collect_links(v, out)),
        _ => {}
    }
}

fn list_paths(value: &Document, prefix: &str, depth: Option<usize>, out: &mut Vec<String>) {
    if depth == Some(0) {
        return;
    }
    let children: Vec<(String, &Document)> = match value {
        Document::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Document::Sequence(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        _ => return,
    };
    for (segment, child) in children {
        let path = if prefix.is_empty() {
            segment
        } else {
            format!("{prefix}/{segment}")
        };
        out.push(path.clone());
        list_paths(child, &path, depth.map(|d| d - 1), out);
    }
}

// --- tests -------------------------------------------------------------------
