pub mod schema;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use schema::SchemaOrRef;

/// API metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// Reusable definitions of an OpenAPI 3.x document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaOrRef>,
}

/// The part of a spec document the model generators consume: metadata and named schemas.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub info: Info,
    pub components: Components,
    /// Swagger 2.0 schema definitions.
    pub definitions: IndexMap<String, SchemaOrRef>,
}

impl ModelSpec {
    /// Named schemas: `components.schemas`, then Swagger `definitions` not already present.
    pub fn schemas(&self) -> Vec<(&str, &SchemaOrRef)> {
        let mut schemas: Vec<(&str, &SchemaOrRef)> = self
            .components
            .schemas
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
            .collect();
        for (name, schema) in &self.definitions {
            if !self.components.schemas.contains_key(name) {
                schemas.push((name.as_str(), schema));
            }
        }
        schemas
    }
}

/// Read the schema model out of a parsed spec document.
pub fn model_from_value(doc: &Value) -> Result<ModelSpec, serde_json::Error> {
    ModelSpec::deserialize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_components_and_definitions() {
        let doc = json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": {},
            "components": {"schemas": {"Pet": {"type": "object"}}},
            "definitions": {"Pet": {"type": "string"}, "Error": {"type": "object"}}
        });
        let model = model_from_value(&doc).unwrap();
        assert_eq!(model.info.title, "Pets");
        let names: Vec<&str> = model.schemas().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["Pet", "Error"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let model = model_from_value(&json!({"openapi": "3.1.0"})).unwrap();
        assert!(model.schemas().is_empty());
        assert_eq!(model.info, Info::default());
    }
}
