use std::path::Path;

use serde::Serialize;

use super::{AdapterRegistry, GeneratorAdapter, resolve_fallback};
use crate::config::FallbackMode;
use crate::error::SelectionError;
use crate::version::{VersionInfo, detect_version};

/// Which adapter runs for one generation, and how it was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterDecision {
    pub version: VersionInfo,
    pub adapter: GeneratorAdapter,
    pub is_explicitly_supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_fallback: Option<FallbackMode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Combines version detection, the adapter registry and the fallback policy.
#[derive(Debug, Clone)]
pub struct AdapterSelector {
    registry: AdapterRegistry,
    mode: FallbackMode,
}

impl AdapterSelector {
    pub fn new(registry: AdapterRegistry, mode: FallbackMode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> FallbackMode {
        self.mode
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Pick an adapter for an already detected version.
    pub fn select(&self, version: VersionInfo) -> Result<AdapterDecision, SelectionError> {
        if let Some(adapter) = self.registry.find_supporting(&version.version) {
            log::debug!("OpenAPI {version} handled by {adapter}");
            return Ok(AdapterDecision {
                version,
                adapter,
                is_explicitly_supported: true,
                applied_fallback: None,
                warnings: Vec::new(),
            });
        }

        let resolution = resolve_fallback(&version, self.mode)?;
        Ok(AdapterDecision {
            version,
            adapter: resolution.adapter,
            is_explicitly_supported: false,
            applied_fallback: Some(self.mode),
            warnings: resolution.warning.into_iter().collect(),
        })
    }

    /// Detect the version of the spec at `path` and pick an adapter for it.
    pub fn detect_adapter(&self, path: &Path) -> Result<AdapterDecision, SelectionError> {
        let version = detect_version(path)?;
        self.select(version)
    }
}

impl Default for AdapterSelector {
    fn default() -> Self {
        Self::new(AdapterRegistry::default(), FallbackMode::default())
    }
}
