use std::path::Path;

use minijinja::Environment;

pub const MODEL_TEMPLATE: &str = "model.ts.j2";
pub const ENUM_TEMPLATE: &str = "enum.ts.j2";
pub const INDEX_TEMPLATE: &str = "index.ts.j2";

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks.
fn escape_jsdoc(value: String) -> String {
    value.replace("*/", "*\\/")
}

/// Template environment backed by `template_dir`, or by the built-in templates.
pub fn environment(template_dir: Option<&Path>) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_filter("escape_jsdoc", escape_jsdoc);

    match template_dir {
        Some(dir) => env.set_loader(minijinja::path_loader(dir.to_path_buf())),
        None => {
            env.add_template(MODEL_TEMPLATE, include_str!("../templates/model.ts.j2"))
                .expect("template should be valid");
            env.add_template(ENUM_TEMPLATE, include_str!("../templates/enum.ts.j2"))
                .expect("template should be valid");
            env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.ts.j2"))
                .expect("template should be valid");
        }
    }
    env
}
