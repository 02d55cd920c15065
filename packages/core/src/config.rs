//! Resolver configuration, populated from environment variables.

use crate::flatten::FlattenOptions;

/// Immutable configuration shared by every resolution call.
///
/// Build it once at start-up and hand it to [`Resolver`](crate::Resolver).
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `LDNODE_BASE` | (absent) | Base IRI joined onto relative node ids while flattening |
/// | `LDNODE_BLANK_PREFIX` | `_:b` | Prefix of generated blank node ids |
/// | `LDNODE_ORDERED` | `false` | Emit flattened nodes sorted by id |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Options passed unchanged to the flattener on every call.
    pub flatten: FlattenOptions,
}

impl ResolverConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = FlattenOptions::default();
        let ordered = lookup("LDNODE_ORDERED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.ordered);

        Self {
            flatten: FlattenOptions {
                base: lookup("LDNODE_BASE").filter(|b| !b.is_empty()),
                blank_node_prefix: lookup("LDNODE_BLANK_PREFIX")
                    .filter(|p| !p.is_empty())
                    .unwrap_or(defaults.blank_node_prefix),
                ordered,
            },
        }
    }
}
