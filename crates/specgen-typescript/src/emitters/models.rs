use std::collections::{BTreeSet, HashSet};

use minijinja::{Environment, context};
use serde_json::Value;
use specgen_core::{GeneratedFile, GeneratorError};
use specgen_core::parse::ModelSpec;
use specgen_core::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

use super::{MODELS_DIR, render};
use crate::name_normalizer::{member_name, property_key, type_name};
use crate::templates::MODEL_TEMPLATE;
use crate::type_mapper::{Dialect, TypeMapper};

/// Options shared by every model emitter.
pub struct ModelEmitter<'a> {
    pub env: &'a Environment<'static>,
    pub dialect: Dialect,
    pub no_jsdoc: bool,
}

impl ModelEmitter<'_> {
    /// Emit one `models/<Name>.ts` per named schema. Returns the files and the module names
    /// in emission order.
    pub fn emit_models(
        &self,
        spec: &ModelSpec,
    ) -> Result<(Vec<GeneratedFile>, Vec<String>), GeneratorError> {
        let mut files = Vec::new();
        let mut modules = Vec::new();
        let mut seen = HashSet::new();

        for (name, schema) in spec.schemas() {
            let model_name = type_name(name);
            if !seen.insert(model_name.clone()) {
                log::warn!("schema {name:?} maps to duplicate type name {model_name}, skipping");
                continue;
            }
            let ctx = self.model_context(spec, &model_name, schema);
            let mut content = render(self.env, MODEL_TEMPLATE, ctx)?;
            if !content.ends_with('\n') {
                content.push('\n');
            }
            files.push(GeneratedFile {
                path: format!("{MODELS_DIR}/{model_name}.ts"),
                content,
            });
            modules.push(model_name);
        }

        Ok((files, modules))
    }

    fn model_context(&self, spec: &ModelSpec, name: &str, schema: &SchemaOrRef) -> minijinja::Value {
        let mut refs = BTreeSet::new();
        let mut enums = Vec::new();

        let (kind, description, fields, additional, target, top_enum) = match schema {
            SchemaOrRef::Schema(s) if s.is_enum() => (
                "enum",
                s.description.clone(),
                Vec::new(),
                None,
                None,
                Some(enum_context(name, s.description.clone(), &s.enum_values)),
            ),
            SchemaOrRef::Schema(s) if is_interface(s) => {
                let fields = self.fields(name, s, &mut refs, &mut enums);
                let additional = match &s.additional_properties {
                    Some(AdditionalProperties::Bool(false)) | None => None,
                    Some(_) => Some("unknown"),
                };
                ("object", s.description.clone(), fields, additional, None, None)
            }
            SchemaOrRef::Schema(s) => {
                let target = TypeMapper::new(self.dialect, &mut refs).schema_to_ts(s);
                ("alias", s.description.clone(), Vec::new(), None, Some(target), None)
            }
            SchemaOrRef::Ref { .. } => {
                let target = TypeMapper::new(self.dialect, &mut refs).schema_or_ref_to_ts(schema);
                ("alias", None, Vec::new(), None, Some(target), None)
            }
        };

        refs.remove(name);
        let imports: Vec<String> = refs.into_iter().collect();

        context! {
            title => spec.info.title.clone(),
            api_version => spec.info.version.clone(),
            name => name,
            kind => kind,
            description => description,
            imports => imports,
            fields => fields,
            additional_properties => additional,
            target => target,
            enum => top_enum,
            enums => enums,
            no_jsdoc => self.no_jsdoc,
        }
    }

    /// Interface fields. Inline enum properties become `<Model><Prop>Enum` declarations.
    fn fields(
        &self,
        model: &str,
        schema: &Schema,
        refs: &mut BTreeSet<String>,
        enums: &mut Vec<minijinja::Value>,
    ) -> Vec<minijinja::Value> {
        schema
            .properties
            .iter()
            .map(|(prop_name, prop)| {
                let (field_type, description, read_only) = match prop {
                    SchemaOrRef::Schema(inline) if inline.is_enum() && is_plain_enum(inline) => {
                        let enum_name = format!("{model}{}Enum", type_name(prop_name));
                        enums.push(enum_context(
                            &enum_name,
                            inline.description.clone(),
                            &inline.enum_values,
                        ));
                        let mapper = TypeMapper::new(self.dialect, refs);
                        let field_type = if mapper.is_nullable(inline) {
                            format!("{enum_name} | null")
                        } else {
                            enum_name
                        };
                        (field_type, inline.description.clone(), inline.read_only)
                    }
                    SchemaOrRef::Schema(inline) => (
                        TypeMapper::new(self.dialect, refs).schema_to_ts(inline),
                        inline.description.clone(),
                        inline.read_only,
                    ),
                    SchemaOrRef::Ref { .. } => (
                        TypeMapper::new(self.dialect, refs).schema_or_ref_to_ts(prop),
                        None,
                        None,
                    ),
                };
                context! {
                    name => property_key(prop_name),
                    type => field_type,
                    optional => !schema.required.contains(prop_name),
                    description => description,
                    read_only => read_only.unwrap_or(false),
                }
            })
            .collect()
    }
}

/// Object schemas without composition become interfaces; everything else is an alias.
fn is_interface(schema: &Schema) -> bool {
    let composed = !schema.all_of.is_empty() || !schema.one_of.is_empty() || !schema.any_of.is_empty();
    if composed {
        return false;
    }
    if !schema.properties.is_empty() {
        return true;
    }
    schema.has_type(SchemaType::Object)
        && !matches!(schema.additional_properties, Some(AdditionalProperties::Schema(_)))
}

/// Enum values only, no composition that would change what the enum means.
fn is_plain_enum(schema: &Schema) -> bool {
    schema.all_of.is_empty() && schema.one_of.is_empty() && schema.any_of.is_empty()
}

/// Members for an enum declaration. Strings keep their value; numbers get `NUMBER_<n>`
/// names; other values cannot be enum members and are skipped.
fn enum_context(name: &str, description: Option<String>, values: &[Value]) -> minijinja::Value {
    let mut used = HashSet::new();
    let mut members = Vec::new();
    for value in values {
        let (base, literal) = match value {
            Value::String(s) => (member_name(s), value.to_string()),
            Value::Number(n) => {
                let text = n.to_string();
                (format!("NUMBER_{}", text.replace(['-', '.'], "_")), text)
            }
            other => {
                log::debug!("enum {name}: skipping value {other} that cannot be a member");
                continue;
            }
        };
        let mut member = base.clone();
        let mut i = 2;
        while !used.insert(member.clone()) {
            member = format!("{base}_{i}");
            i += 1;
        }
        members.push(context! { name => member, value => literal });
    }
    context! {
        name => name,
        description => description,
        members => members,
    }
}
