use std::path::PathBuf;

use thiserror::Error;

/// A transform could not rewrite one file. The pipeline logs it and moves on.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("enum {name}: unbalanced braces")]
    UnbalancedEnum { name: String },

    #[error("enum declaration text not found from byte {position}")]
    EnumTextNotFound { position: usize },
}

/// Failures that stop the whole postprocess run.
#[derive(Debug, Error)]
pub enum PostprocessError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

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
}
