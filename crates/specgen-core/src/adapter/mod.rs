pub mod fallback;
pub mod selector;

use std::fmt;

use serde::{Serialize, Serializer};

use crate::version::version_float;

pub use fallback::{FallbackResolution, resolve_fallback};
pub use selector::{AdapterDecision, AdapterSelector};

/// The generator adapters built into specgen.
///
/// The set is closed; generation dispatches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorAdapter {
    /// Conservative generator for OpenAPI 3.0.x (`nullable: true` semantics).
    Legacy30,
    /// Generator for OpenAPI 3.1.x (JSON Schema 2020-12 `type` arrays, `const`).
    Modern31,
}

impl GeneratorAdapter {
    pub const ALL: [GeneratorAdapter; 2] = [GeneratorAdapter::Legacy30, GeneratorAdapter::Modern31];

    pub fn name(self) -> &'static str {
        match self {
            GeneratorAdapter::Legacy30 => "openapi-3.0",
            GeneratorAdapter::Modern31 => "openapi-3.1",
        }
    }

    /// Whether this adapter explicitly handles `version` (e.g. `"3.0.3"`, read as `3.0`).
    pub fn supports(self, version: &str) -> bool {
        let Some(v) = version_float(version) else {
            return false;
        };
        match self {
            GeneratorAdapter::Legacy30 => (3.0..3.1).contains(&v),
            GeneratorAdapter::Modern31 => (3.1..3.2).contains(&v),
        }
    }

    /// Look an adapter up by its name.
    pub fn from_name(name: &str) -> Option<GeneratorAdapter> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for GeneratorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for GeneratorAdapter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Ordered list of adapters. Registration order is the selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRegistry {
    adapters: Vec<GeneratorAdapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Append an adapter. Re-registering an adapter keeps its original slot.
    pub fn register(&mut self, adapter: GeneratorAdapter) -> &mut Self {
        if !self.adapters.contains(&adapter) {
            self.adapters.push(adapter);
        }
        self
    }

    /// First adapter, in registration order, that explicitly supports `version`.
    pub fn find_supporting(&self, version: &str) -> Option<GeneratorAdapter> {
        self.adapters.iter().copied().find(|a| a.supports(version))
    }

    pub fn adapters(&self) -> &[GeneratorAdapter] {
        &self.adapters
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    /// Legacy first, so well-understood versions keep the conservative generator.
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register(GeneratorAdapter::Legacy30)
            .register(GeneratorAdapter::Modern31);
        registry
    }
}
