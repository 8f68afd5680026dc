pub mod index;
pub mod models;

use minijinja::Environment;
use specgen_core::GeneratorError;

/// Directory, relative to the output root, that holds the generated models.
pub const MODELS_DIR: &str = "models";

/// Render a named template, mapping template failures to `GeneratorError`.
pub(crate) fn render(
    env: &Environment<'static>,
    name: &str,
    ctx: minijinja::Value,
) -> Result<String, GeneratorError> {
    let tmpl = env
        .get_template(name)
        .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))?;
    tmpl.render(ctx)
        .map_err(|e| GeneratorError::Template(format!("{name}: {e}")))
}
