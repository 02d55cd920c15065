//! JSON-LD blocks for content-addressed graphs.
//!
//! This crate decodes JSON-LD blocks and resolves paths inside them. A path
//! is walked in two phases: the first segment is matched structurally
//! against the document as decoded, and only if more segments follow is the
//! document flattened so that the rest of the path can cross `@id`
//! references between nodes. A walk that reaches a link to another block
//! stops there and hands the unconsumed segments back to the host.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`document`] | The [`Document`] tagged union and JSON-LD keywords |
//! | [`descent`] | Top-level descent against the raw document |
//! | [`graph`] | [`NodeArena`] and the walk through the flattened graph |
//! | [`extract`] | Container/value unwrapping and `@id` dereferencing |
//! | [`flatten`] | The [`Flattener`] seam and [`NodeMapFlattener`] |
//! | [`resolve`] | [`Resolver`]: the two phases joined, plus link classification |
//! | [`codec`] | Canonical block encoding, CIDs, and [`decode_block`] |
//! | [`node`] | [`Node`], the decoded block the host works with |
//! | [`registry`] | [`DecoderRegistry`] and [`JsonLdPlugin`] |
//! | [`config`] | [`ResolverConfig`], read from the environment |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ldnode::{Block, DecoderRegistry, JsonLdPlugin, Plugin, Resolver, ResolverConfig};
//!
//! let mut registry = DecoderRegistry::new();
//! JsonLdPlugin.register_block_decoders(&mut registry)?;
//!
//! let node = registry.decode(&block)?;
//! let resolver = Resolver::new(ResolverConfig::from_env());
//! let found = node.resolve(&resolver, &["post", "author", "name"])?;
//! println!("{}", found.value);
//! ```

pub mod codec;
pub mod config;
pub mod descent;
pub mod document;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod graph;
pub mod node;
pub mod registry;
pub mod resolve;

pub use codec::{decode_block, Block, CodecError, JSONLD_CODEC};
pub use config::ResolverConfig;
pub use document::{Document, IdKey, LinkRef};
pub use error::{ErrorKind, ResolveError};
pub use flatten::{FlattenError, FlattenOptions, Flattener, NodeMapFlattener};
pub use graph::NodeArena;
pub use node::Node;
pub use registry::{DecodeBlockFn, DecoderRegistry, JsonLdPlugin, Plugin, RegistryError};
pub use resolve::{Resolution, Resolver};

pub use cid::Cid;
