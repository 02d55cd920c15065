//! Host-side decoder registry, and the plugin that fills it.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::codec::{decode_block, Block, CodecError, JSONLD_CODEC};
use crate::node::Node;

/// Decodes a block of one particular codec.
pub type DecodeBlockFn = fn(&Block) -> Result<Node, CodecError>;

/// Errors returned by [`DecoderRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a decoder is already registered for codec {0:#x}")]
    AlreadyRegistered(u64),

    #[error("no decoder registered for codec {0:#x}")]
    UnknownCodec(u64),

    #[error("decoding failed: {0}")]
    Decode(#[from] CodecError),
}

/// Maps multicodec values to block decoders.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<u64, DecodeBlockFn>,
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codecs: Vec<_> = self.decoders.keys().collect();
        codecs.sort();
        f.debug_struct("DecoderRegistry")
            .field("codecs", &codecs)
            .finish()
    }
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `decoder` for `codec`. Each codec may be registered once.
    pub fn register(&mut self, codec: u64, decoder: DecodeBlockFn) -> Result<(), RegistryError> {
        if self.decoders.contains_key(&codec) {
            return Err(RegistryError::AlreadyRegistered(codec));
        }
        tracing::debug!("registered block decoder for codec {codec:#x}");
        self.decoders.insert(codec, decoder);
        Ok(())
    }

    pub fn contains(&self, codec: u64) -> bool {
        self.decoders.contains_key(&codec)
    }

    /// Decode `block` with the decoder registered for its CID's codec.
    pub fn decode(&self, block: &Block) -> Result<Node, RegistryError> {
        let codec = block.cid.codec();
        let decoder = self
            .decoders
            .get(&codec)
            .ok_or(RegistryError::UnknownCodec(codec))?;
        Ok(decoder(block)?)
    }
}

/// Something that contributes decoders to a host registry.
pub trait Plugin {
    fn register_block_decoders(&self, registry: &mut DecoderRegistry) -> Result<(), RegistryError>;
}

/// Registers the JSON-LD block decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdPlugin;

impl Plugin for JsonLdPlugin {
    fn register_block_decoders(&self, registry: &mut DecoderRegistry) -> Result<(), RegistryError> {
        registry.register(JSONLD_CODEC, decode_block)
    }
}
