//! Block codec: JSON-LD bytes ⇄ [`Document`], and the CIDs that name them.
//!
//! Blocks are canonical JSON (RFC 8785, via `serde_jcs`), so equal documents
//! always encode to equal bytes and therefore to equal CIDs. Links use the
//! DAG-JSON spelling `{"/": "<cid>"}` on the wire and decode to
//! [`Document::Link`].

use cid::Cid;
use multihash::Multihash;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::document::{Document, LINK_KEY};
use crate::node::Node;

/// Multicodec under which JSON-LD blocks are registered.
pub const JSONLD_CODEC: u64 = 0x77;

/// SHA2-256 multihash code.
const SHA2_256: u64 = 0x12;

/// Errors from encoding or decoding a block.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("block is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("block codec is {found:#x}, expected {expected:#x}")]
    WrongCodec { expected: u64, found: u64 },

    #[error("block data does not match its CID: expected {expected}, got {actual}")]
    CidMismatch { expected: Cid, actual: Cid },

    #[error("multihash wrap failed: {0}")]
    Multihash(String),
}

/// Raw bytes plus the CID that names them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub cid: Cid,
    pub data: Vec<u8>,
}

impl Block {
    pub fn new(cid: Cid, data: Vec<u8>) -> Self {
        Self { cid, data }
    }

    /// Encode `document` canonically and name the result.
    pub fn encode(document: &Document) -> Result<Self, CodecError> {
        let data = encode_document(document)?;
        let cid = cid_for_data(&data)?;
        Ok(Self { cid, data })
    }
}

/// CIDv1 (JSON-LD codec, sha2-256) of `data`.
pub fn cid_for_data(data: &[u8]) -> Result<Cid, CodecError> {
    let digest = Sha256::digest(data);
    let mh = Multihash::<64>::wrap(SHA2_256, &digest)
        .map_err(|e| CodecError::Multihash(e.to_string()))?;
    Ok(Cid::new_v1(JSONLD_CODEC, mh))
}

/// Parse JSON bytes, lifting `{"/": "<cid>"}` placeholders into links.
///
/// A placeholder whose string is not a CID is kept as an ordinary object.
pub fn decode_document(data: &[u8]) -> Result<Document, CodecError> {
    let value: Value = serde_json::from_slice(data)?;
    Ok(lift_links(value))
}

/// Canonical JSON encoding of `document`.
pub fn encode_document(document: &Document) -> Result<Vec<u8>, CodecError> {
    serde_jcs::to_vec(&document.to_json()).map_err(|e| CodecError::Canonicalization(e.to_string()))
}

/// Decode a block into a [`Node`].
///
/// Rejects blocks tagged with another codec. When the CID uses sha2-256 the
/// data is re-hashed and must match.
pub fn decode_block(block: &Block) -> Result<Node, CodecError> {
    if block.cid.codec() != JSONLD_CODEC {
        return Err(CodecError::WrongCodec {
            expected: JSONLD_CODEC,
            found: block.cid.codec(),
        });
    }
    if block.cid.hash().code() == SHA2_256 {
        let actual = cid_for_data(&block.data)?;
        if actual.hash() != block.cid.hash() {
            return Err(CodecError::CidMismatch {
                expected: block.cid,
                actual,
            });
        }
    }
    let document = decode_document(&block.data)?;
    Ok(Node::new(block.cid, document, block.data.clone()))
}

fn lift_links(value: Value) -> Document {
    match value {
        Value::Object(map) if map.len() == 1 => {
            if let Some(Value::String(s)) = map.get(LINK_KEY) {
                if let Ok(cid) = Cid::try_from(s.as_str()) {
                    return Document::Link(cid);
                }
            }
            Document::Object(map.into_iter().map(|(k, v)| (k, lift_links(v))).collect())
        }
        Value::Object(map) => {
            Document::Object(map.into_iter().map(|(k, v)| (k, lift_links(v))).collect())
        }
        Value::Array(items) => Document::Sequence(items.into_iter().map(lift_links).collect()),
        scalar => Document::from(scalar),
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cid_is_v1_with_jsonld_codec() {
        let cid = cid_for_data(b"{}").unwrap();
        assert_eq!(cid.version(), cid::Version::V1);
        assert_eq!(cid.codec(), JSONLD_CODEC);
        assert_eq!(cid.hash().code(), SHA2_256);
        assert_eq!(cid.hash().digest(), Sha256::digest(b"{}").as_slice());
    }

    #[test]
    fn encoding_is_canonical() {
        let a = Document::from(json!({"b": 2, "a": {"y": [1, 2], "x": null}}));
        let bytes = encode_document(&a).unwrap();
        assert_eq!(bytes, br#"{"a":{"x":null,"y":[1,2]},"b":2}"#);
        assert_eq!(Block::encode(&a).unwrap().cid, cid_for_data(&bytes).unwrap());
    }

    #[test]
    fn links_are_lifted_on_decode() {
        let target = cid_for_data(b"target").unwrap();
        let bytes = format!(r#"{{"next": {{"/": "{target}"}}, "bogus": {{"/": "nope"}}}}"#);
        let doc = decode_document(bytes.as_bytes()).unwrap();
        assert_eq!(doc.get("next"), Some(&Document::Link(target)));
        assert_eq!(doc.get("bogus"), Some(&Document::from(json!({"/": "nope"}))));
    }

    #[test]
    fn links_survive_encode_and_decode() {
        let target = cid_for_data(b"target").unwrap();
        let doc = Document::Sequence(vec![Document::Link(target), Document::from("x")]);
        let block = Block::encode(&doc).unwrap();
        let node = decode_block(&block).unwrap();
        assert_eq!(node.document(), &doc);
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(matches!(decode_document(b"{not json"), Err(CodecError::Json(_))));
    }

    #[test]
    fn decode_block_checks_codec_and_hash() {
        let block = Block::encode(&Document::from(json!({"a": 1}))).unwrap();

        let raw_cid = Cid::new_v1(0x55, *block.cid.hash());
        let err = decode_block(&Block::new(raw_cid, block.data.clone())).unwrap_err();
        assert!(matches!(err, CodecError::WrongCodec { found: 0x55, .. }));

        let tampered = Block::new(block.cid, br#"{"a":2}"#.to_vec());
        assert!(matches!(decode_block(&tampered), Err(CodecError::CidMismatch { .. })));
    }
}
