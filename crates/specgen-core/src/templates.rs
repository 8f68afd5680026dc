use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Manifest file listing the templates a template directory provides.
pub const TEMPLATE_MANIFEST_FILE: &str = "manifest.yaml";

/// Contents of `manifest.yaml` (YAML or JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateManifest {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

/// Outcome of [`validate_templates`]. Callers only need to look at `missing_templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValidation {
    pub valid: bool,
    pub missing_templates: Vec<String>,
}

impl TemplateValidation {
    fn from_missing(missing_templates: Vec<String>) -> Self {
        Self {
            valid: missing_templates.is_empty(),
            missing_templates,
        }
    }
}

/// Check that every required template named in `dir/manifest.yaml` exists.
///
/// A missing or unreadable manifest is reported as the manifest itself being the one
/// missing template.
pub fn validate_templates(dir: &Path) -> TemplateValidation {
    let manifest_path = dir.join(TEMPLATE_MANIFEST_FILE);
    let manifest = match fs::read_to_string(&manifest_path) {
        Ok(content) => match serde_yaml_ng::from_str::<TemplateManifest>(&content) {
            Ok(manifest) => manifest,
            Err(e) => {
                log::warn!("invalid template manifest {}: {e}", manifest_path.display());
                return TemplateValidation::from_missing(vec![TEMPLATE_MANIFEST_FILE.to_string()]);
            }
        },
        Err(_) => {
            return TemplateValidation::from_missing(vec![TEMPLATE_MANIFEST_FILE.to_string()]);
        }
    };

    for name in &manifest.optional {
        if !dir.join(name).is_file() {
            log::debug!("optional template {name} not found in {}", dir.display());
        }
    }

    let missing = manifest
        .required
        .iter()
        .filter(|name| !dir.join(name).is_file())
        .cloned()
        .collect();
    TemplateValidation::from_missing(missing)
}
