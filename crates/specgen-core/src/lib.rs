pub mod adapter;
pub mod checksum;
pub mod config;
pub mod drift;
pub mod error;
pub mod parse;
pub mod spec;
pub mod templates;
pub mod version;

pub use adapter::{AdapterDecision, AdapterRegistry, AdapterSelector, GeneratorAdapter};
pub use error::GeneratorError;

/// A generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from a spec's schema model.
pub trait CodeGenerator {
    type Options;

    fn adapter(&self) -> GeneratorAdapter;

    fn generate(
        &self,
        spec: &parse::ModelSpec,
        options: &Self::Options,
    ) -> Result<Vec<GeneratedFile>, GeneratorError>;
}
