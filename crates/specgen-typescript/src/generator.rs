use std::path::PathBuf;

use specgen_core::parse::ModelSpec;
use specgen_core::{CodeGenerator, GeneratedFile, GeneratorAdapter, GeneratorError};

use crate::emitters;
use crate::emitters::models::ModelEmitter;
use crate::templates;
use crate::type_mapper::Dialect;

/// Options passed to an adapter's `generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Load templates from this directory instead of the built-ins.
    pub template_dir: Option<PathBuf>,
    pub no_jsdoc: bool,
}

/// Model generator behind the `openapi-3.0` adapter.
pub struct LegacyModelGenerator;

/// Model generator behind the `openapi-3.1` adapter.
pub struct ModernModelGenerator;

impl CodeGenerator for LegacyModelGenerator {
    type Options = GenerateOptions;

    fn adapter(&self) -> GeneratorAdapter {
        GeneratorAdapter::Legacy30
    }

    fn generate(
        &self,
        spec: &ModelSpec,
        options: &GenerateOptions,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        emit_all(spec, Dialect::OpenApi30, options)
    }
}

impl CodeGenerator for ModernModelGenerator {
    type Options = GenerateOptions;

    fn adapter(&self) -> GeneratorAdapter {
        GeneratorAdapter::Modern31
    }

    fn generate(
        &self,
        spec: &ModelSpec,
        options: &GenerateOptions,
    ) -> Result<Vec<GeneratedFile>, GeneratorError> {
        emit_all(spec, Dialect::OpenApi31, options)
    }
}

fn emit_all(
    spec: &ModelSpec,
    dialect: Dialect,
    options: &GenerateOptions,
) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let env = templates::environment(options.template_dir.as_deref());
    let emitter = ModelEmitter {
        env: &env,
        dialect,
        no_jsdoc: options.no_jsdoc,
    };
    let (mut files, modules) = emitter.emit_models(spec)?;
    files.push(emitters::index::emit_index(&env, &modules)?);
    Ok(files)
}
