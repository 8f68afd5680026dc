use indexmap::IndexMap;
use serde::Deserialize;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or (3.1) an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    pub fn as_slice(&self) -> &[SchemaType] {
        match self {
            TypeSet::Single(t) => std::slice::from_ref(t),
            TypeSet::Multiple(ts) => ts,
        }
    }
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

/// The JSON Schema keywords the model generators read. Unknown keywords are ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<TypeSet>,

    pub format: Option<String>,

    pub title: Option<String>,

    pub description: Option<String>,

    /// 3.0-style nullability.
    pub nullable: Option<bool>,

    pub deprecated: Option<bool>,

    pub properties: IndexMap<String, SchemaOrRef>,

    pub required: Vec<String>,

    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,

    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "allOf")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(rename = "enum")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(rename = "const")]
    pub const_value: Option<serde_json::Value>,

    #[serde(rename = "readOnly")]
    pub read_only: Option<bool>,
}

impl Schema {
    /// Declared types, empty when `type` is absent.
    pub fn types(&self) -> &[SchemaType] {
        self.schema_type.as_ref().map(TypeSet::as_slice).unwrap_or(&[])
    }

    pub fn has_type(&self, ty: SchemaType) -> bool {
        self.types().contains(&ty)
    }

    /// An enum schema whose values can become TypeScript enum members.
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

/// Name a `$ref` points to: the last path segment, e.g. `#/components/schemas/Pet` → `Pet`.
///
/// External references are not dereferenced; they are named the same way.
pub fn ref_name(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_array_with_null() {
        let schema: Schema = serde_json::from_str(r#"{"type": ["string", "null"]}"#).unwrap();
        assert_eq!(schema.types(), &[SchemaType::String, SchemaType::Null]);
        assert!(schema.has_type(SchemaType::Null));
    }

    #[test]
    fn unknown_keywords_ignored() {
        let schema: Schema =
            serde_json::from_str(r#"{"type": "integer", "minimum": 1, "x-internal": true}"#).unwrap();
        assert_eq!(schema.types(), &[SchemaType::Integer]);
    }

    #[test]
    fn ref_or_schema() {
        let r: SchemaOrRef = serde_json::from_str(r##"{"$ref": "#/components/schemas/Pet"}"##).unwrap();
        match r {
            SchemaOrRef::Ref { ref_path } => assert_eq!(ref_name(&ref_path), "Pet"),
            SchemaOrRef::Schema(_) => panic!("expected ref"),
        }
    }

    #[test]
    fn ref_name_of_external_ref() {
        assert_eq!(ref_name("common.json#/definitions/Error"), "Error");
        assert_eq!(ref_name("Plain"), "Plain");
    }
}
