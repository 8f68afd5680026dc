use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or parsing a spec document. Always fatal.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("spec root in {0} is not a JSON object")]
    NotAnObject(PathBuf),
}

/// Adapter selection failures.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(
        "no adapter supports OpenAPI version {version} (fallback mode: strict)\n\
         To continue, either:\n  \
         1. set OPENAPI_ADAPTER_FALLBACK=warn or auto to use the closest adapter,\n  \
         2. add an adapter that supports {version}, or\n  \
         3. downgrade the spec to a supported version (3.0.x or 3.1.x)"
    )]
    NoAdapterForVersion { version: String },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Checksum drift detected by the verifier.
#[derive(Debug, Error)]
pub enum DriftError {
    #[error(
        "checksum drift detected in {spec_path}\n{details}\n\
         To resolve, either:\n  \
         1. revert the spec to the vendored version, or\n  \
         2. regenerate checksums with `specgen verify --update` (or `specgen process --stamp`)"
    )]
    Mismatch { spec_path: PathBuf, details: String },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// Errors raised while loading the project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

/// Errors produced by code generators.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to read schema model: {0}")]
    Model(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(String),

    #[error("generation failed: {0}")]
    Other(String),
}
