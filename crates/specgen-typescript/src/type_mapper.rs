use std::collections::BTreeSet;

use serde_json::Value;
use specgen_core::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, ref_name};

use crate::name_normalizer::{property_key, type_name};

/// Which JSON Schema flavour the generator reads nullability and `const` from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// OpenAPI 3.0: `nullable: true`, no `const`, single `type`.
    OpenApi30,
    /// OpenAPI 3.1: `type` arrays containing `null`, `const`.
    OpenApi31,
}

/// Maps schemas to TypeScript type expressions, collecting referenced type names.
pub struct TypeMapper<'a> {
    dialect: Dialect,
    refs: &'a mut BTreeSet<String>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(dialect: Dialect, refs: &'a mut BTreeSet<String>) -> Self {
        Self { dialect, refs }
    }

    pub fn schema_or_ref_to_ts(&mut self, schema: &SchemaOrRef) -> String {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                let name = type_name(ref_name(ref_path));
                self.refs.insert(name.clone());
                name
            }
            SchemaOrRef::Schema(schema) => self.schema_to_ts(schema),
        }
    }

    pub fn schema_to_ts(&mut self, schema: &Schema) -> String {
        let base = self.base_type(schema);
        if self.is_nullable(schema) && base != "unknown" && base != "null" {
            format!("{} | null", wrap_union(&base))
        } else {
            base
        }
    }

    /// Whether the schema admits `null` under this dialect.
    pub fn is_nullable(&self, schema: &Schema) -> bool {
        match self.dialect {
            Dialect::OpenApi30 => schema.nullable == Some(true),
            Dialect::OpenApi31 => schema.has_type(SchemaType::Null) && schema.types().len() > 1,
        }
    }

    fn base_type(&mut self, schema: &Schema) -> String {
        if self.dialect == Dialect::OpenApi31
            && let Some(value) = &schema.const_value
        {
            return literal_to_ts(value);
        }

        if !schema.all_of.is_empty() {
            let parts: Vec<String> = schema
                .all_of
                .iter()
                .map(|s| wrap_union(&self.schema_or_ref_to_ts(s)))
                .collect();
            return parts.join(" & ");
        }

        let variants = if schema.one_of.is_empty() {
            &schema.any_of
        } else {
            &schema.one_of
        };
        if !variants.is_empty() {
            let parts: Vec<String> = variants.iter().map(|s| self.schema_or_ref_to_ts(s)).collect();
            return parts.join(" | ");
        }

        if schema.is_enum() {
            let literals: Vec<String> = schema
                .enum_values
                .iter()
                .filter(|v| !v.is_null())
                .map(literal_to_ts)
                .collect();
            if !literals.is_empty() {
                return literals.join(" | ");
            }
        }

        match primary_type(schema) {
            Some(SchemaType::String) if schema.format.as_deref() == Some("binary") => {
                "Blob".to_string()
            }
            Some(SchemaType::String) => "string".to_string(),
            Some(SchemaType::Integer | SchemaType::Number) => "number".to_string(),
            Some(SchemaType::Boolean) => "boolean".to_string(),
            Some(SchemaType::Null) => "null".to_string(),
            Some(SchemaType::Array) => {
                let inner = match &schema.items {
                    Some(items) => self.schema_or_ref_to_ts(items),
                    None => "unknown".to_string(),
                };
                if inner.contains('|') || inner.contains('&') {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            Some(SchemaType::Object) | None if !schema.properties.is_empty() => {
                self.inline_object(schema)
            }
            Some(SchemaType::Object) => match &schema.additional_properties {
                Some(AdditionalProperties::Schema(value)) => {
                    format!("Record<string, {}>", self.schema_or_ref_to_ts(value))
                }
                _ => "Record<string, unknown>".to_string(),
            },
            None => "unknown".to_string(),
        }
    }

    fn inline_object(&mut self, schema: &Schema) -> String {
        let fields: Vec<String> = schema
            .properties
            .iter()
            .map(|(name, prop)| {
                let ts_type = self.schema_or_ref_to_ts(prop);
                let key = property_key(name);
                if schema.required.contains(name) {
                    format!("{key}: {ts_type}")
                } else {
                    format!("{key}?: {ts_type}")
                }
            })
            .collect();
        format!("{{ {} }}", fields.join("; "))
    }
}

/// First non-null declared type; `Null` only when it is the sole type.
fn primary_type(schema: &Schema) -> Option<SchemaType> {
    let types = schema.types();
    types
        .iter()
        .copied()
        .find(|t| *t != SchemaType::Null)
        .or_else(|| types.first().copied())
}

fn literal_to_ts(value: &Value) -> String {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => value.to_string(),
        _ => "unknown".to_string(),
    }
}

fn wrap_union(ts: &str) -> String {
    if ts.contains(" | ") && !ts.starts_with('{') {
        format!("({ts})")
    } else {
        ts.to_string()
    }
}
