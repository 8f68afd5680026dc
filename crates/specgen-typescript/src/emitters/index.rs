use minijinja::{Environment, context};
use specgen_core::{GeneratedFile, GeneratorError};

use super::{MODELS_DIR, render};
use crate::templates::INDEX_TEMPLATE;

/// Emit `models/index.ts` re-exporting every model module.
pub fn emit_index(
    env: &Environment<'static>,
    modules: &[String],
) -> Result<GeneratedFile, GeneratorError> {
    let mut content = render(env, INDEX_TEMPLATE, context! { modules => modules })?;
    if !content.ends_with('\n') {
        content.push('\n');
    }
    Ok(GeneratedFile {
        path: format!("{MODELS_DIR}/index.ts"),
        content,
    })
}
