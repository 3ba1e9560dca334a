//! Schema resolution: OpenAPI component schemas -> model graph.
//!
//! Inline object shapes never stay anonymous. They are hoisted into
//! generated models named after their owner (`ProjectSettings` for the
//! `settings` property of `Project`), or bound to a surrogate name chosen
//! by the caller for request and response payloads. Every document name is
//! reserved first, so a hoisted name never displaces a document schema.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::model::{Field, Model, ModelGraph, Primitive, TypeToken};
use super::naming::{TypeNames, hoisted_name, type_name};
use crate::openapi::spec::{
    AdditionalProperties, MediaType, OpenApiSpec, Schema, SchemaType, enum_literal_text,
    json_media, ref_name,
};

/// Result of resolving a schema used as a value type.
#[derive(Debug, Clone)]
pub enum Resolution<'s> {
    /// The schema has a type token of its own.
    Type(TypeToken),
    /// An inline object or composition that needs a name, wrapped in
    /// `depth` levels of array.
    Anonymous {
        /// The unnamed schema.
        schema: &'s Schema,
        /// Array nesting around it.
        depth: usize,
    },
}

impl Resolution<'_> {
    /// Turn the resolution into a type token. Anonymous shapes become
    /// generated models under a name claimed from `preferred`, pushed onto
    /// `out` together with anything hoisted out of them.
    pub fn bind(self, preferred: &str, names: &mut TypeNames, out: &mut Vec<Model>) -> TypeToken {
        match self {
            Resolution::Type(token) => token,
            Resolution::Anonymous { schema, depth } => {
                let name = names.claim(preferred);
                if name != preferred {
                    debug!(preferred = %preferred, model = %name, "Synthesized name was taken, numbered it.");
                }
                debug!(model = %name, "Synthesized inline model.");
                out.extend(build_model(&name, schema, true, names));
                let mut token = TypeToken::Named(name);
                for _ in 0..depth {
                    token = TypeToken::array(token);
                }
                token
            }
        }
    }

    /// Whether the schema still needs a name.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Resolution::Anonymous { .. })
    }
}

/// Schema of a component payload that gets a model of its own.
///
/// Payload components that are a bare `$ref` are resolved straight to the
/// referenced schema by the extractor and need no model.
fn payload_schema(content: Option<&HashMap<String, MediaType>>) -> Option<&Schema> {
    content
        .and_then(json_media)
        .and_then(|media| media.schema.as_ref())
        .filter(|schema| !schema.is_bare_ref())
}

/// Build the full model graph from component schemas, responses and
/// request bodies.
pub fn resolve_components(spec: &OpenApiSpec) -> ModelGraph {
    let mut graph = ModelGraph::new();
    let Some(components) = &spec.components else {
        return graph;
    };

    let mut named: Vec<(String, &Schema)> = Vec::new();
    if let Some(schemas) = &components.schemas {
        for key in sorted_keys(schemas) {
            named.push((type_name(key), &schemas[key]));
        }
    }
    if let Some(responses) = &components.responses {
        for key in sorted_keys(responses) {
            if let Some(schema) = payload_schema(responses[key].content.as_ref()) {
                named.push((type_name(key), schema));
            }
        }
    }
    if let Some(bodies) = &components.request_bodies {
        for key in sorted_keys(bodies) {
            if let Some(schema) = payload_schema(bodies[key].content.as_ref()) {
                named.push((type_name(key), schema));
            }
        }
    }

    let mut names: TypeNames = named.iter().map(|(name, _)| name.as_str()).collect();
    for (name, schema) in &named {
        for model in build_model(name, schema, false, &mut names) {
            insert_model(&mut graph, model);
        }
    }

    debug!(models = graph.len(), "Resolved component models.");
    graph
}

fn insert_model(graph: &mut ModelGraph, model: Model) {
    if graph.contains(&model.name) {
        warn!(model = %model.name, "Duplicate model name, keeping the first definition.");
        return;
    }
    graph.insert(model);
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys
}

fn is_null_schema(schema: &Schema) -> bool {
    matches!(&schema.schema_type, Some(SchemaType::Single(t)) if t == "null")
}

fn has_properties(schema: &Schema) -> bool {
    schema.properties.as_ref().is_some_and(|p| !p.is_empty())
}

/// Resolve a schema used as a property, item, parameter or payload type.
pub fn resolve_value(schema: &Schema) -> Resolution<'_> {
    if let Some(ref_path) = &schema.ref_path
        && !has_properties(schema)
        && schema.composition().is_none()
    {
        return Resolution::Type(TypeToken::Named(type_name(ref_name(ref_path))));
    }

    if let Some((members, _)) = schema.composition() {
        if has_properties(schema) {
            return Resolution::Anonymous { schema, depth: 0 };
        }
        let shaped: Vec<&Schema> = members.iter().filter(|m| !is_null_schema(m)).collect();
        if let [single] = shaped.as_slice() {
            return resolve_value(single);
        }
        if shaped
            .iter()
            .any(|m| m.ref_path.is_some() || has_properties(m) || m.composition().is_some())
        {
            return Resolution::Anonymous { schema, depth: 0 };
        }
        return Resolution::Type(TypeToken::Any);
    }

    if has_properties(schema) {
        return Resolution::Anonymous { schema, depth: 0 };
    }

    match schema.primary_type() {
        Some("array") => match schema.items.as_deref().map(resolve_value) {
            Some(Resolution::Type(item)) => Resolution::Type(TypeToken::array(item)),
            Some(Resolution::Anonymous { schema, depth }) => Resolution::Anonymous {
                schema,
                depth: depth + 1,
            },
            None => Resolution::Type(TypeToken::array(TypeToken::Any)),
        },
        Some("object") => Resolution::Type(map_type(schema)),
        Some(other) => Resolution::Type(
            Primitive::from_schema(other, schema.format.as_deref())
                .map_or(TypeToken::Any, TypeToken::Primitive),
        ),
        None if schema.additional_properties.is_some() => Resolution::Type(map_type(schema)),
        None => Resolution::Type(TypeToken::Any),
    }
}

/// Map type of a property-less object.
fn map_type(schema: &Schema) -> TypeToken {
    match &schema.additional_properties {
        Some(AdditionalProperties::Schema(value)) => match resolve_value(value) {
            Resolution::Type(token) => TypeToken::Map(Box::new(token)),
            Resolution::Anonymous { .. } => TypeToken::Map(Box::new(TypeToken::Any)),
        },
        _ => TypeToken::Map(Box::new(TypeToken::Any)),
    }
}

/// Build the model `name` from `schema`, followed by any models hoisted
/// out of it.
///
/// `name` must already be taken in `names`; hoisted models claim theirs.
pub fn build_model(
    name: &str,
    schema: &Schema,
    generated: bool,
    names: &mut TypeNames,
) -> Vec<Model> {
    let mut model = Model::new(name);
    model.generated = generated;
    model.description = schema.description.clone();
    let mut hoisted = Vec::new();

    if let Some(ref_path) = &schema.ref_path
        && schema.is_bare_ref()
    {
        model.children.insert(type_name(ref_name(ref_path)));
    } else if let Some((members, union)) = schema.composition() {
        model.union = union;
        build_composition(&mut model, schema, members, names, &mut hoisted);
    } else if has_properties(schema) {
        populate_fields(&mut model, schema, names, &mut hoisted);
    } else if schema.is_scalar() || schema.enum_values.is_some() {
        build_scalar(&mut model, schema);
    } else if schema.primary_type() == Some("array") {
        let token = resolve_value(schema).bind(&format!("{name}Item"), names, &mut hoisted);
        model.alias = Some(token);
    } else if let Some(AdditionalProperties::Schema(_)) = &schema.additional_properties {
        model.alias = Some(map_type(schema));
    }

    let mut models = Vec::with_capacity(hoisted.len() + 1);
    models.push(model);
    models.extend(hoisted);
    models
}

fn build_scalar(model: &mut Model, schema: &Schema) {
    let primitive = schema
        .primary_type()
        .and_then(|t| Primitive::from_schema(t, schema.format.as_deref()));
    model.alias = Some(match primitive {
        Some(p) => TypeToken::Primitive(p),
        None if schema.enum_values.is_some() => TypeToken::Primitive(Primitive::String),
        None => TypeToken::Any,
    });
    if let Some(values) = &schema.enum_values {
        model.is_enum = true;
        model
            .children
            .extend(values.iter().filter_map(enum_literal_text));
    }
}

fn build_composition(
    model: &mut Model,
    schema: &Schema,
    members: &[Schema],
    names: &mut TypeNames,
    hoisted: &mut Vec<Model>,
) {
    let mut inline: Vec<&Schema> = Vec::new();
    for member in members {
        if let Some(ref_path) = &member.ref_path
            && member.is_bare_ref()
        {
            model.children.insert(type_name(ref_name(ref_path)));
        } else if has_properties(member) || member.composition().is_some() {
            inline.push(member);
        }
    }

    // Properties declared alongside the composition count as one more
    // inline member.
    let own_fields = usize::from(has_properties(schema));
    let total = inline.len() + own_fields;
    let base = model.name.clone();
    let preferred = |index: usize| {
        if total == 1 {
            format!("{base}Fields")
        } else {
            format!("{base}Fields{index}")
        }
    };

    let mut member_names = Vec::with_capacity(total);
    for (i, member) in inline.into_iter().enumerate() {
        let member_name = names.claim(&preferred(i + 1));
        debug!(model = %member_name, "Hoisted inline composition member.");
        hoisted.extend(build_model(&member_name, member, true, names));
        member_names.push(member_name);
    }
    if own_fields == 1 {
        let fields_name = names.claim(&preferred(total));
        let mut fields_model = Model::new(&fields_name);
        fields_model.generated = true;
        populate_fields(&mut fields_model, schema, names, hoisted);
        hoisted.push(fields_model);
        member_names.push(fields_name);
    }
    model.children.extend(member_names);

    if model.children.is_empty() {
        // Alternatives of scalars only: keep the raw value.
        model.alias = Some(TypeToken::Any);
    }
}

fn populate_fields(
    model: &mut Model,
    schema: &Schema,
    names: &mut TypeNames,
    hoisted: &mut Vec<Model>,
) {
    let Some(properties) = &schema.properties else {
        return;
    };
    for key in sorted_keys(properties) {
        let prop = &properties[key];
        let ty = resolve_value(prop).bind(&hoisted_name(&model.name, key), names, hoisted);
        // A bare reference is both a field and a composed child.
        if prop.is_bare_ref()
            && let Some(child) = ty.named()
        {
            model.children.insert(child.to_string());
        }
        let mut field = Field::body(key.as_str(), ty);
        field.description = prop.description.clone();
        model.insert_field(field);
    }

    for name in schema.required.iter().flatten() {
        if let Some(field) = model.fields.get_mut(name) {
            field.required = true;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::model::ModelShape;

    fn graph_of(json: &str) -> ModelGraph {
        let spec = OpenApiSpec::from_json(json).unwrap();
        resolve_components(&spec)
    }

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    const DOC: &str = r##"{
  "openapi": "3.0.3",
  "info": { "title": "T", "version": "1" },
  "paths": {},
  "components": {
    "schemas": {
      "EndpointState": { "type": "string", "enum": ["ready", "init"], "description": "State." },
      "ProjectID": { "type": "string" },
      "Project": {
        "type": "object",
        "required": ["id", "name", "ghost"],
        "properties": {
          "id": { "$ref": "#/components/schemas/ProjectID" },
          "name": { "type": "string", "description": "Display name." },
          "created_at": { "type": "string", "format": "date-time" },
          "settings": {
            "type": "object",
            "properties": { "quota": { "type": "integer", "format": "int64" } }
          },
          "tags": { "type": "array", "items": { "type": "string" } },
          "labels": { "type": "object", "additionalProperties": { "type": "string" } }
        }
      },
      "ProjectResponse": {
        "allOf": [
          { "$ref": "#/components/schemas/Project" },
          { "$ref": "#/components/schemas/EndpointState" }
        ]
      },
      "Projects": { "type": "array", "items": { "$ref": "#/components/schemas/Project" } },
      "Anything": { "type": "object" }
    },
    "responses": {
      "ProjectsResponse": {
        "description": "OK",
        "content": { "application/json": { "schema": {
          "type": "object",
          "properties": { "projects": { "type": "array", "items": { "$ref": "#/components/schemas/Project" } } }
        } } }
      },
      "PassThrough": {
        "description": "OK",
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Project" } } }
      }
    }
  }
}"##;

    #[test]
    fn test_enum_alias() {
        let graph = graph_of(DOC);
        let state = graph.get("EndpointState").unwrap();
        assert_eq!(state.shape(), ModelShape::EnumAlias);
        assert_eq!(
            state.children.iter().cloned().collect::<Vec<_>>(),
            vec!["init".to_string(), "ready".to_string()],
            "literals must be sorted"
        );
        assert_eq!(state.description.as_deref(), Some("State."));
    }

    #[test]
    fn test_object_fields_and_required() {
        let graph = graph_of(DOC);
        let project = graph.get("Project").unwrap();
        assert_eq!(project.shape(), ModelShape::Struct);
        assert!(project.fields["id"].required);
        assert!(project.fields["name"].required);
        assert!(!project.fields["created_at"].required);
        assert!(!project.fields.contains_key("ghost"), "unknown required names are ignored");
        assert_eq!(
            project.fields["created_at"].ty,
            TypeToken::Primitive(Primitive::DateTime)
        );
        assert_eq!(
            project.fields["tags"].ty,
            TypeToken::array(TypeToken::Primitive(Primitive::String))
        );
        assert_eq!(
            project.fields["labels"].ty,
            TypeToken::Map(Box::new(TypeToken::Primitive(Primitive::String)))
        );
    }

    #[test]
    fn test_bare_ref_property_is_field_and_child() {
        let graph = graph_of(DOC);
        let project = graph.get("Project").unwrap();
        assert_eq!(project.fields["id"].ty, TypeToken::Named("ProjectID".to_string()));
        assert!(project.children.contains("ProjectID"));
    }

    #[test]
    fn test_nested_object_is_hoisted() {
        let graph = graph_of(DOC);
        let project = graph.get("Project").unwrap();
        assert_eq!(
            project.fields["settings"].ty,
            TypeToken::Named("ProjectSettings".to_string())
        );
        let settings = graph.get("ProjectSettings").unwrap();
        assert!(settings.generated);
        assert_eq!(
            settings.fields["quota"].ty,
            TypeToken::Primitive(Primitive::Int64)
        );
    }

    #[test]
    fn test_hoisted_name_never_displaces_document_schema() {
        let graph = graph_of(
            r#"{
  "openapi": "3.0.3",
  "paths": {},
  "components": { "schemas": {
    "Project": {
      "type": "object",
      "properties": {
        "settings": { "type": "object", "properties": { "quota": { "type": "integer" } } }
      }
    },
    "ProjectSettings": { "type": "object", "properties": { "theme": { "type": "string" } } }
  } }
}"#,
        );

        let document = graph.get("ProjectSettings").unwrap();
        assert!(!document.generated);
        assert!(document.fields.contains_key("theme"));

        let project = graph.get("Project").unwrap();
        assert_eq!(
            project.fields["settings"].ty,
            TypeToken::Named("ProjectSettings2".to_string())
        );
        let hoisted = graph.get("ProjectSettings2").unwrap();
        assert!(hoisted.generated);
        assert!(hoisted.fields.contains_key("quota"));
    }

    #[test]
    fn test_composition_member_names_avoid_document_schemas() {
        let s = schema(
            r##"{ "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "properties": { "extra": { "type": "boolean" } } }
            ] }"##,
        );
        let mut names: TypeNames = ["Derived", "DerivedFields"].into_iter().collect();
        let models = build_model("Derived", &s, false, &mut names);
        assert_eq!(models[1].name, "DerivedFields2");
        assert!(models[0].children.contains("DerivedFields2"));
    }

    #[test]
    fn test_pure_composition() {
        let graph = graph_of(DOC);
        let response = graph.get("ProjectResponse").unwrap();
        assert_eq!(response.shape(), ModelShape::Composition);
        assert!(!response.union);
        assert_eq!(response.children.len(), 2);
    }

    #[test]
    fn test_array_alias_and_empty_model() {
        let graph = graph_of(DOC);
        assert_eq!(
            graph.get("Projects").unwrap().alias,
            Some(TypeToken::array(TypeToken::Named("Project".to_string())))
        );
        assert_eq!(graph.get("Anything").unwrap().shape(), ModelShape::Empty);
    }

    #[test]
    fn test_component_responses() {
        let graph = graph_of(DOC);
        let response = graph.get("ProjectsResponse").unwrap();
        assert_eq!(
            response.fields["projects"].ty,
            TypeToken::array(TypeToken::Named("Project".to_string()))
        );
        assert!(
            graph.get("PassThrough").is_none(),
            "bare-ref responses resolve to the referenced schema"
        );
    }

    #[test]
    fn test_resolve_nested_arrays() {
        let s = schema(r#"{ "type": "array", "items": { "type": "array", "items": { "type": "number" } } }"#);
        let expected =
            TypeToken::array(TypeToken::array(TypeToken::Primitive(Primitive::Number)));
        assert!(
            matches!(resolve_value(&s), Resolution::Type(token) if token == expected),
            "nested arrays resolve to a nested array token"
        );
    }

    #[test]
    fn test_anonymous_composition_item_is_bound_by_caller() {
        let s = schema(
            r##"{ "type": "array", "items": { "allOf": [
                { "$ref": "#/components/schemas/Branch" },
                { "$ref": "#/components/schemas/Endpoint" }
            ] } }"##,
        );
        let resolution = resolve_value(&s);
        assert!(resolution.is_anonymous());

        let mut out = Vec::new();
        let token = resolution.bind("ListBranchesRespObj", &mut TypeNames::new(), &mut out);
        assert_eq!(
            token,
            TypeToken::array(TypeToken::Named("ListBranchesRespObj".to_string()))
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].generated);
        assert_eq!(out[0].shape(), ModelShape::Composition);
        assert!(out[0].children.contains("Branch"));
        assert!(out[0].children.contains("Endpoint"));
    }

    #[test]
    fn test_nullable_single_member_composition() {
        let s = schema(
            r##"{ "anyOf": [{ "$ref": "#/components/schemas/Branch" }, { "type": "null" }] }"##,
        );
        assert!(
            matches!(resolve_value(&s), Resolution::Type(TypeToken::Named(name)) if name == "Branch"),
            "a nullable single member resolves to that member"
        );
    }

    #[test]
    fn test_all_of_inline_members_are_hoisted() {
        let s = schema(
            r##"{ "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "required": ["extra"], "properties": { "extra": { "type": "boolean" } } }
            ] }"##,
        );
        let models = build_model("Derived", &s, false, &mut TypeNames::new());
        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Derived", "DerivedFields"]);
        assert!(models[0].children.contains("Base"));
        assert!(models[0].children.contains("DerivedFields"));
        assert!(models[1].fields["extra"].required);
    }

    #[test]
    fn test_one_of_marks_union() {
        let s = schema(
            r##"{ "oneOf": [
                { "$ref": "#/components/schemas/Cat" },
                { "$ref": "#/components/schemas/Dog" }
            ] }"##,
        );
        let models = build_model("Pet", &s, false, &mut TypeNames::new());
        assert!(models[0].union);
        assert_eq!(models[0].shape(), ModelShape::Composition);
    }

    #[test]
    fn test_scalar_only_alternatives_are_any() {
        let s = schema(r#"{ "oneOf": [{ "type": "string" }, { "type": "integer" }] }"#);
        let models = build_model("Flexible", &s, false, &mut TypeNames::new());
        assert_eq!(models[0].alias, Some(TypeToken::Any));
    }
}
