//! Endpoint extraction: OpenAPI paths -> ordered endpoint IR.
//!
//! Paths are visited in an explicit caller-supplied route order, never in
//! the document's native map order. Surrogate names for inline payloads
//! are claimed against the resolved graph, so they never shadow a
//! component.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::api::{Endpoint, HttpMethod, Payload, placeholders};
use super::model::{Field, FieldLocation, Model, ModelGraph, Primitive, TypeToken};
use super::naming::{TypeNames, canonicalize_export, endpoint_name, hoisted_name, type_name};
use super::resolve::{Resolution, resolve_value};
use crate::error::GenerateError;
use crate::openapi::spec::{MediaType, OpenApiSpec, Operation, Parameter, PathItem, json_media, ref_name};

/// Success statuses checked in priority order.
const SUCCESS_STATUSES: [&str; 2] = ["200", "201"];

/// Status assumed when an operation declares no success response.
const DEFAULT_STATUS: u16 = 200;

/// Endpoints of a run plus the models synthesized while extracting them.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Endpoints in route order, then method order.
    pub endpoints: Vec<Endpoint>,
    /// Generated models bound to surrogate names, to be inserted into the
    /// model graph before pruning.
    pub synthesized: Vec<Model>,
}

/// Models synthesized during extraction and the names already in use.
struct Synthesis {
    names: TypeNames,
    models: Vec<Model>,
}

impl Synthesis {
    fn bind(&mut self, resolution: Resolution<'_>, preferred: &str) -> TypeToken {
        resolution.bind(preferred, &mut self.names, &mut self.models)
    }
}

/// Extract one endpoint per operation, following `routes` for ordering.
///
/// With an empty route list the document's paths are taken in
/// lexicographic order. `graph` holds the resolved component models; no
/// synthesized model takes one of their names.
pub fn extract_endpoints(
    spec: &OpenApiSpec,
    routes: &[String],
    graph: &ModelGraph,
) -> Result<Extraction, GenerateError> {
    let order = route_order(spec, routes);
    let mut endpoints = Vec::new();
    let mut synthesis = Synthesis {
        names: graph.names().collect(),
        models: Vec::new(),
    };

    for route in &order {
        let Some(item) = spec.paths.get(route) else {
            warn!(route = %route, "Route is not in the document, skipping.");
            continue;
        };
        for (method_name, op) in item.operations() {
            let Some(method) = HttpMethod::from_name(method_name) else {
                continue;
            };
            let endpoint = process_operation(spec, route, method, item, op, &mut synthesis)?;
            debug!(
                route = %route,
                method = method.as_str(),
                name = %endpoint.name,
                "Extracted endpoint."
            );
            endpoints.push(endpoint);
        }
    }

    Ok(Extraction {
        endpoints,
        synthesized: synthesis.models,
    })
}

fn route_order(spec: &OpenApiSpec, routes: &[String]) -> Vec<String> {
    let mut document_paths: Vec<&String> = spec.paths.keys().collect();
    document_paths.sort();

    if routes.is_empty() {
        debug!(
            paths = document_paths.len(),
            "No route order configured, using lexicographic path order."
        );
        return document_paths.into_iter().cloned().collect();
    }

    let listed: HashSet<&str> = routes.iter().map(String::as_str).collect();
    for path in document_paths {
        if !listed.contains(path.as_str()) {
            warn!(route = %path, "Path is not in the route list, skipping.");
        }
    }
    routes.to_vec()
}

fn process_operation(
    spec: &OpenApiSpec,
    route: &str,
    method: HttpMethod,
    item: &PathItem,
    op: &Operation,
    synthesis: &mut Synthesis,
) -> Result<Endpoint, GenerateError> {
    let name = match &op.operation_id {
        Some(id) => endpoint_name(id),
        None => fallback_name(method, route),
    };

    let (path_params, query_params) = extract_params(spec, &name, item, op, synthesis);

    for placeholder in placeholders(route) {
        if !path_params.iter().any(|p| p.key == placeholder) {
            return Err(GenerateError::UnboundPlaceholder {
                route: route.to_string(),
                placeholder,
            });
        }
    }

    let (status_code, response, example_response) =
        extract_response(spec, &name, op, synthesis);
    let request = extract_request(spec, &name, op, synthesis);

    Ok(Endpoint {
        name,
        method,
        route: route.to_string(),
        description: op.description.clone().or_else(|| op.summary.clone()),
        request,
        response,
        path_params,
        query_params,
        example_response,
        status_code,
    })
}

/// Name for an operation without an identifier, e.g. `GetProjectsProjectID`.
fn fallback_name(method: HttpMethod, route: &str) -> String {
    let words: String = format!("{}_{route}", method.as_str().to_lowercase())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let name = canonicalize_export(&words);
    debug!(route = %route, name = %name, "Operation has no operationId, derived a name.");
    name
}

/// Path-level parameters followed by operation-level parameters,
/// classified by location. Duplicates are kept.
fn extract_params(
    spec: &OpenApiSpec,
    endpoint: &str,
    item: &PathItem,
    op: &Operation,
    synthesis: &mut Synthesis,
) -> (Vec<Field>, Vec<Field>) {
    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let all = item
        .parameters
        .iter()
        .flatten()
        .chain(op.parameters.iter().flatten());

    for raw in all {
        let Some(param) = spec.resolve_parameter(raw) else {
            warn!(
                endpoint = %endpoint,
                reference = raw.ref_path.as_deref().unwrap_or_default(),
                "Unresolvable parameter reference, skipping."
            );
            continue;
        };

        let location = match param.location.as_str() {
            "path" => FieldLocation::Path,
            "query" => FieldLocation::Query,
            other => {
                debug!(endpoint = %endpoint, param = %param.name, location = other, "Ignoring parameter.");
                continue;
            }
        };

        if !seen.insert((param.name.clone(), param.location.clone())) {
            warn!(
                endpoint = %endpoint,
                param = %param.name,
                "Parameter declared at both path and operation level."
            );
        }

        let field = param_field(endpoint, param, location, synthesis);
        match location {
            FieldLocation::Path => path_params.push(field),
            _ => query_params.push(field),
        }
    }

    (path_params, query_params)
}

fn param_field(
    endpoint: &str,
    param: &Parameter,
    location: FieldLocation,
    synthesis: &mut Synthesis,
) -> Field {
    let ty = match &param.schema {
        Some(schema) => synthesis.bind(resolve_value(schema), &hoisted_name(endpoint, &param.name)),
        None => TypeToken::Primitive(Primitive::String),
    };
    let mut field = Field::param(param.name.as_str(), ty, location, param.required);
    field.description = param.description.clone();
    field
}

fn extract_response(
    spec: &OpenApiSpec,
    endpoint: &str,
    op: &Operation,
    synthesis: &mut Synthesis,
) -> (u16, Option<TypeToken>, Option<serde_json::Value>) {
    let Some((status, response)) = SUCCESS_STATUSES
        .iter()
        .find_map(|status| op.responses.get(*status).map(|r| (*status, r)))
    else {
        return (DEFAULT_STATUS, None, None);
    };
    let status_code = status.parse().unwrap_or(DEFAULT_STATUS);

    let (content, component) = match &response.ref_path {
        Some(ref_path) => {
            let key = ref_name(ref_path);
            match spec.component_response(key) {
                Some(component) => (component.content.as_ref(), Some(key)),
                None => {
                    warn!(endpoint = %endpoint, reference = %ref_path, "Unresolvable response reference.");
                    (None, None)
                }
            }
        }
        None => (response.content.as_ref(), None),
    };

    let surrogate = format!("{endpoint}RespObj");
    let (ty, example) = resolve_payload(spec, content, component, &surrogate, synthesis);
    (status_code, ty, example)
}

fn extract_request(
    spec: &OpenApiSpec,
    endpoint: &str,
    op: &Operation,
    synthesis: &mut Synthesis,
) -> Option<Payload> {
    let body = op.request_body.as_ref()?;

    let (content, component, required) = match &body.ref_path {
        Some(ref_path) => {
            let key = ref_name(ref_path);
            let Some(component) = spec.component_request_body(key) else {
                warn!(endpoint = %endpoint, reference = %ref_path, "Unresolvable request body reference.");
                return None;
            };
            (component.content.as_ref(), Some(key), component.required || body.required)
        }
        None => (body.content.as_ref(), None, body.required),
    };

    let surrogate = format!("{endpoint}ReqObj");
    let (ty, _) = resolve_payload(spec, content, component, &surrogate, synthesis);
    ty.map(|ty| Payload { ty, required })
}

/// Resolve a payload's type and example.
///
/// Component payloads are named by their component key unless they are a
/// bare schema reference, which resolves to the referenced schema.
fn resolve_payload(
    spec: &OpenApiSpec,
    content: Option<&HashMap<String, MediaType>>,
    component: Option<&str>,
    surrogate: &str,
    synthesis: &mut Synthesis,
) -> (Option<TypeToken>, Option<serde_json::Value>) {
    let Some(media) = content.and_then(json_media) else {
        return (None, None);
    };
    // No schema means a unit response, which takes no example.
    let Some(schema) = &media.schema else {
        return (None, None);
    };

    let example = media
        .explicit_example()
        .or(schema.example.as_ref())
        .or_else(|| {
            schema
                .ref_path
                .as_deref()
                .and_then(|r| spec.component_schema(ref_name(r)))
                .and_then(|s| s.example.as_ref())
        })
        .cloned();

    let ty = match component {
        Some(key) if !schema.is_bare_ref() => TypeToken::Named(type_name(key)),
        _ => synthesis.bind(resolve_value(schema), surrogate),
    };
    (Some(ty), example)
}
