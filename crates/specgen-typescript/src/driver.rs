use std::fs;
use std::path::{Path, PathBuf};

use specgen_core::error::SpecError;
use specgen_core::{CodeGenerator, GeneratedFile, GeneratorAdapter, GeneratorError, parse, spec};
use thiserror::Error;

use crate::generator::{GenerateOptions, LegacyModelGenerator, ModernModelGenerator};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Run `adapter` against the spec at `input`, writing its files under `output_dir`.
///
/// Returns the paths written, in generation order.
pub fn generate(
    adapter: GeneratorAdapter,
    input: &Path,
    output_dir: &Path,
    options: &GenerateOptions,
) -> Result<Vec<PathBuf>, GenerateError> {
    let doc = spec::read_spec(input)?;
    let model = parse::model_from_value(&doc).map_err(GeneratorError::from)?;

    let files = match adapter {
        GeneratorAdapter::Legacy30 => LegacyModelGenerator.generate(&model, options)?,
        GeneratorAdapter::Modern31 => ModernModelGenerator.generate(&model, options)?,
    };
    log::debug!("{adapter} produced {} files", files.len());

    write_files(output_dir, &files)
}

/// Write generated files to disk under the given base directory.
pub fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &file.content).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}
