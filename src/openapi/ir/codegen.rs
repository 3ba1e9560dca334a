//! Code generation: model graph and endpoint IR -> Rust source IR.
//!
//! Models are rendered in name order and endpoints in extraction order.
//! Every formatting decision lives in `emit`; this module only decides
//! which items, statements and expressions make up each file.

use std::collections::BTreeSet;

use tracing::warn;

use super::api::{Endpoint, Payload, RouteSegment, parse_route};
use super::model::{Field, Model, ModelGraph, ModelShape, Primitive, TypeToken};
use super::naming::{enum_const_name, field_ident, method_ident};
use super::types::{
    RsDecl, RsExpr, RsField, RsFn, RsImpl, RsItem, RsModule, RsParam, RsStmt, RsTrait, RsType,
};

/// Local names used inside generated method bodies.
const RESERVED_LOCALS: [&str; 3] = ["path", "query", "body"];

/// Depth limit when checking whether a composition flattens to a map.
const FLATTEN_DEPTH: usize = 8;

// =============================================================================
// Type mapping
// =============================================================================

/// Rust type of a type token.
pub fn rust_type(token: &TypeToken, graph: &ModelGraph) -> RsType {
    match token {
        TypeToken::Primitive(p) => RsType::path(p.rust_type()),
        TypeToken::Named(name) if graph.contains(name) => RsType::path(name.as_str()),
        TypeToken::Named(name) => {
            warn!(model = %name, "Reference to an unknown model, using an untyped value.");
            RsType::path("serde_json::Value")
        }
        TypeToken::Array(inner) => RsType::vec(rust_type(inner, graph)),
        TypeToken::Map(inner) => RsType::Map(Box::new(rust_type(inner, graph))),
        TypeToken::Any => RsType::path("serde_json::Value"),
    }
}

/// Return type of an endpoint method's success value.
pub fn response_type(endpoint: &Endpoint, graph: &ModelGraph) -> RsType {
    endpoint
        .response
        .as_ref()
        .map_or(RsType::Unit, |token| rust_type(token, graph))
}

/// Parameter type: optional scalars are `Option<T>`, arrays stay `Vec<T>`.
pub fn param_type(field: &Field, graph: &ModelGraph) -> RsType {
    let ty = rust_type(&field.ty, graph);
    if field.required || field.is_array() {
        ty
    } else {
        RsType::option(ty)
    }
}

/// Request body parameter type.
pub fn body_type(payload: &Payload, graph: &ModelGraph) -> RsType {
    let ty = rust_type(&payload.ty, graph);
    if payload.required { ty } else { RsType::option(ty) }
}

/// How a value is turned into wire text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Already a `String`.
    Str,
    /// String enum newtype, via `as_str()`.
    StrEnum,
    /// Numbers and untyped values, via `to_string()`.
    Display,
    /// `%Y-%m-%d`
    Date,
    /// RFC 3339 with second precision.
    DateTime,
    /// `"true"` or `"false"`.
    Bool,
    /// Anything else, as JSON text.
    Json,
}

/// Serialization rule for a scalar token, following aliases.
pub fn value_kind(token: &TypeToken, graph: &ModelGraph) -> ValueKind {
    if let TypeToken::Named(name) = token
        && graph.get(name).is_some_and(Model::is_string_enum)
    {
        return ValueKind::StrEnum;
    }
    if matches!(token, TypeToken::Any) {
        return ValueKind::Display;
    }
    match graph.scalar_of(token) {
        Some(Primitive::String) => ValueKind::Str,
        Some(Primitive::Date) => ValueKind::Date,
        Some(Primitive::DateTime) => ValueKind::DateTime,
        Some(Primitive::Boolean) => ValueKind::Bool,
        Some(_) => ValueKind::Display,
        None => ValueKind::Json,
    }
}

// =============================================================================
// Identifiers
// =============================================================================

fn unique(taken: &mut BTreeSet<String>, base: String) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Parameter identifiers of an endpoint in signature order.
pub fn param_idents(endpoint: &Endpoint) -> Vec<String> {
    let mut taken = BTreeSet::new();
    endpoint
        .params()
        .enumerate()
        .map(|(i, param)| {
            let ident = match field_ident(&param.key) {
                Ok(ident) if RESERVED_LOCALS.contains(&ident.as_str()) => format!("{ident}_"),
                Ok(ident) => ident,
                Err(e) => {
                    warn!(endpoint = %endpoint.name, error = %e, "Degraded parameter name.");
                    format!("param_{i}")
                }
            };
            unique(&mut taken, ident)
        })
        .collect()
}

// =============================================================================
// Models
// =============================================================================

/// Render the model graph as the `models.rs` module.
pub fn codegen_models(graph: &ModelGraph) -> RsModule {
    let decls = graph
        .iter()
        .flat_map(|model| model_items(model, graph))
        .map(RsDecl::Item)
        .collect();
    RsModule {
        doc: vec!["Data types generated from the API document.".to_string()],
        inner_attrs: vec!["allow(non_upper_case_globals)".to_string()],
        uses: Vec::new(),
        decls,
    }
}

/// Items for a single model.
pub fn model_items(model: &Model, graph: &ModelGraph) -> Vec<RsItem> {
    let doc = model.description.clone();
    match model.shape() {
        ModelShape::EnumAlias => enum_items(model, graph),
        ModelShape::Alias => {
            let ty = model
                .alias
                .as_ref()
                .map_or(RsType::path("serde_json::Value"), |t| rust_type(t, graph));
            vec![RsItem::TypeAlias {
                name: model.name.clone(),
                ty,
                doc,
            }]
        }
        ModelShape::Struct => vec![RsItem::Struct {
            name: model.name.clone(),
            doc,
            fields: struct_fields(model, graph),
        }],
        ModelShape::Composition => {
            let fields = composition_fields(model, graph);
            if fields.is_empty() {
                vec![RsItem::TypeAlias {
                    name: model.name.clone(),
                    ty: RsType::path("serde_json::Value"),
                    doc,
                }]
            } else {
                vec![RsItem::Struct {
                    name: model.name.clone(),
                    doc,
                    fields,
                }]
            }
        }
        ModelShape::Empty => vec![RsItem::TypeAlias {
            name: model.name.clone(),
            ty: RsType::Map(Box::new(RsType::path("serde_json::Value"))),
            doc,
        }],
    }
}

fn enum_items(model: &Model, graph: &ModelGraph) -> Vec<RsItem> {
    let name = &model.name;
    let mut items = Vec::with_capacity(model.children.len() + 1);
    let mut taken = BTreeSet::new();

    if model.is_string_enum() {
        items.push(RsItem::StringNewtype {
            name: name.clone(),
            doc: model.description.clone(),
        });
        for literal in &model.children {
            items.push(RsItem::Const {
                name: unique(&mut taken, enum_const_name(name, literal)),
                ty: RsType::path(name.as_str()),
                value: RsExpr::call(
                    name.as_str(),
                    vec![RsExpr::call(
                        "std::borrow::Cow::Borrowed",
                        vec![RsExpr::str(literal.as_str())],
                    )],
                ),
            });
        }
        return items;
    }

    let scalar = model.alias.as_ref().and_then(|t| graph.scalar_of(t));
    items.push(RsItem::TypeAlias {
        name: name.clone(),
        ty: model
            .alias
            .as_ref()
            .map_or(RsType::path("serde_json::Value"), |t| rust_type(t, graph)),
        doc: model.description.clone(),
    });
    for literal in &model.children {
        let value = match scalar {
            Some(Primitive::Int32 | Primitive::Int64 | Primitive::Integer) => {
                literal.parse().ok().map(RsExpr::Int)
            }
            Some(Primitive::Float | Primitive::Double | Primitive::Number) => {
                literal.parse().ok().map(RsExpr::Float)
            }
            Some(Primitive::Boolean) => literal.parse().ok().map(RsExpr::Bool),
            // Timestamps have no const constructor.
            _ => None,
        };
        if let Some(value) = value {
            items.push(RsItem::Const {
                name: unique(&mut taken, enum_const_name(name, literal)),
                ty: RsType::path(name.as_str()),
                value,
            });
        }
    }
    items
}

const OPTIONAL_SERDE: &str = "default, skip_serializing_if = \"Option::is_none\"";

fn struct_fields(model: &Model, graph: &ModelGraph) -> Vec<RsField> {
    let mut taken = BTreeSet::new();
    model
        .fields
        .values()
        .enumerate()
        .map(|(i, field)| {
            let ident = match field_ident(&field.key) {
                Ok(ident) => ident,
                Err(e) => {
                    warn!(model = %model.name, error = %e, "Degraded field name.");
                    format!("field_{i}")
                }
            };
            let ident = unique(&mut taken, ident);

            let base = rust_type(&field.ty, graph);
            let on_cycle = matches!(
                &field.ty,
                TypeToken::Named(target) if stores_inline(target, &model.name, graph)
            );
            let ty = if on_cycle {
                RsType::option(RsType::Boxed(Box::new(base)))
            } else if field.required {
                base
            } else {
                RsType::option(base)
            };

            let mut serde = Vec::new();
            if ident.trim_start_matches("r#") != field.key {
                serde.push(format!("rename = \"{}\"", field.key.replace('"', "\\\"")));
            }
            if ty.is_option() {
                serde.push(OPTIONAL_SERDE.to_string());
            }

            RsField {
                name: ident,
                ty,
                doc: field.description.clone(),
                serde,
            }
        })
        .collect()
}

/// Whether a model serializes as a JSON object and can be flattened.
fn flattens(name: &str, graph: &ModelGraph, depth: usize) -> bool {
    let Some(model) = graph.get(name) else {
        return false;
    };
    match model.shape() {
        ModelShape::Struct | ModelShape::Empty => true,
        ModelShape::Alias => match &model.alias {
            Some(TypeToken::Map(_)) => true,
            Some(TypeToken::Named(target)) if depth < FLATTEN_DEPTH => {
                flattens(target, graph, depth + 1)
            }
            _ => false,
        },
        ModelShape::Composition if depth < FLATTEN_DEPTH => model
            .children
            .iter()
            .any(|child| flattens(child, graph, depth + 1)),
        ModelShape::EnumAlias | ModelShape::Composition => false,
    }
}

/// Models a value of `model` holds by value: plainly named fields,
/// flattened children and alias targets. Arrays and maps allocate, so
/// they never contribute.
fn inline_targets<'g>(model: &'g Model, graph: &ModelGraph) -> Vec<&'g str> {
    match model.shape() {
        ModelShape::Struct => model
            .fields
            .values()
            .filter_map(|field| match &field.ty {
                TypeToken::Named(name) => Some(name.as_str()),
                _ => None,
            })
            .collect(),
        ModelShape::Composition => model
            .children
            .iter()
            .filter(|child| flattens(child, graph, 0))
            .map(String::as_str)
            .collect(),
        ModelShape::Alias => match &model.alias {
            Some(TypeToken::Named(name)) => vec![name.as_str()],
            _ => Vec::new(),
        },
        ModelShape::EnumAlias | ModelShape::Empty => Vec::new(),
    }
}

/// Whether a value of `from` contains a value of `to`, directly or
/// through other models. A by-value edge for which this holds back to
/// its owner closes a cycle and must be boxed.
fn stores_inline<'g>(from: &'g str, to: &str, graph: &'g ModelGraph) -> bool {
    let mut visited = BTreeSet::new();
    let mut pending = vec![from];
    while let Some(name) = pending.pop() {
        if name == to {
            return true;
        }
        if !visited.insert(name) {
            continue;
        }
        if let Some(model) = graph.get(name) {
            pending.extend(inline_targets(model, graph));
        }
    }
    false
}

fn composition_fields(model: &Model, graph: &ModelGraph) -> Vec<RsField> {
    let mut taken = BTreeSet::new();
    model
        .children
        .iter()
        .filter(|child| flattens(child, graph, 0))
        .map(|child| {
            let base = field_ident(child).unwrap_or_else(|_| "inner".to_string());
            let name = unique(&mut taken, base);
            let ty = if stores_inline(child, &model.name, graph) {
                RsType::Boxed(Box::new(RsType::path(child.as_str())))
            } else {
                RsType::path(child.as_str())
            };
            if model.union {
                RsField {
                    name,
                    ty: RsType::option(ty),
                    doc: None,
                    serde: vec!["flatten".to_string(), OPTIONAL_SERDE.to_string()],
                }
            } else {
                RsField {
                    name,
                    ty,
                    doc: None,
                    serde: vec!["flatten".to_string()],
                }
            }
        })
        .collect()
}

// =============================================================================
// Client
// =============================================================================

/// Render the endpoints as the `client.rs` module: an `ApiClient` trait and
/// its implementation for `Client`.
pub fn codegen_client(endpoints: &[Endpoint], graph: &ModelGraph) -> RsModule {
    let methods: Vec<RsFn> = endpoints.iter().map(|e| endpoint_fn(e, graph)).collect();
    let declarations = methods
        .iter()
        .map(|m| RsFn {
            body: Vec::new(),
            ..m.clone()
        })
        .collect();
    let implementations = methods
        .into_iter()
        .map(|m| RsFn { doc: Vec::new(), ..m })
        .collect();

    RsModule {
        doc: vec!["Client methods generated from the API document.".to_string()],
        inner_attrs: vec!["allow(unused_imports, unused_mut)".to_string()],
        uses: vec![
            "crate::error::Error".to_string(),
            "crate::models::*".to_string(),
            "crate::transport::{Client, append_query}".to_string(),
        ],
        decls: vec![
            RsDecl::Trait(RsTrait {
                name: "ApiClient".to_string(),
                doc: Some("Operations of the API.".to_string()),
                methods: declarations,
            }),
            RsDecl::Impl(RsImpl {
                trait_name: Some("ApiClient".to_string()),
                target: "Client".to_string(),
                methods: implementations,
            }),
        ],
    }
}

/// Method definition for one endpoint.
pub fn endpoint_fn(endpoint: &Endpoint, graph: &ModelGraph) -> RsFn {
    let idents = param_idents(endpoint);
    let mut params: Vec<RsParam> = endpoint
        .params()
        .zip(&idents)
        .map(|(field, ident)| RsParam {
            name: ident.clone(),
            ty: param_type(field, graph),
        })
        .collect();
    if let Some(payload) = &endpoint.request {
        params.push(RsParam {
            name: "body".to_string(),
            ty: body_type(payload, graph),
        });
    }

    let mut doc = Vec::new();
    if let Some(description) = &endpoint.description {
        doc.push(description.clone());
        doc.push(String::new());
    }
    doc.push(format!("`{} {}`", endpoint.method.as_str(), endpoint.route));

    RsFn {
        name: method_ident(&endpoint.name),
        doc,
        attrs: Vec::new(),
        is_pub: false,
        receiver: true,
        params,
        ret: RsType::Result(Box::new(response_type(endpoint, graph))),
        body: endpoint_body(endpoint, &idents, graph),
    }
}

fn endpoint_body(endpoint: &Endpoint, idents: &[String], graph: &ModelGraph) -> Vec<RsStmt> {
    let path_idents = &idents[..endpoint.path_params.len()];
    let query_idents = &idents[endpoint.path_params.len()..];

    let mut body = route_statements(endpoint, path_idents, graph);

    if !endpoint.query_params.is_empty() {
        body.push(RsStmt::Let {
            name: "query".to_string(),
            mutable: true,
            ty: Some(RsType::vec(RsType::path("(&str, String)"))),
            init: RsExpr::call("Vec::new", vec![]),
        });
        for (field, ident) in endpoint.query_params.iter().zip(query_idents) {
            body.push(query_statement(field, ident, graph));
        }
        body.push(RsStmt::Expr(RsExpr::call(
            "append_query",
            vec![
                RsExpr::Raw("&mut path".to_string()),
                RsExpr::ident("query").borrow(),
            ],
        )));
    }

    let body_arg = match &endpoint.request {
        None => RsExpr::Raw("None::<&()>".to_string()),
        Some(payload) if payload.required => {
            RsExpr::call("Some", vec![RsExpr::ident("body").borrow()])
        }
        Some(_) => RsExpr::ident("body").method("as_ref", vec![]),
    };
    body.push(RsStmt::Tail(RsExpr::ident("self").method(
        "request_handler",
        vec![
            RsExpr::str(endpoint.method.as_str()),
            RsExpr::ident("path").borrow(),
            body_arg,
        ],
    )));
    body
}

/// `let mut path = String::from(..); path.push_str(..); ...`
pub fn route_statements(
    endpoint: &Endpoint,
    path_idents: &[String],
    graph: &ModelGraph,
) -> Vec<RsStmt> {
    let segments = parse_route(&endpoint.route);
    let mut rest = segments.iter().peekable();

    let init = match rest.peek() {
        Some(RouteSegment::Literal(literal)) => {
            let init = RsExpr::call("String::from", vec![RsExpr::str(literal.as_str())]);
            rest.next();
            init
        }
        _ => RsExpr::call("String::new", vec![]),
    };
    let pushes: Vec<RsStmt> = rest
        .map(|segment| {
            let arg = match segment {
                RouteSegment::Literal(literal) => RsExpr::str(literal.as_str()),
                // The first matching parameter wins when a name is declared twice.
                RouteSegment::Param(placeholder) => endpoint
                    .path_params
                    .iter()
                    .zip(path_idents)
                    .find(|(field, _)| &field.key == placeholder)
                    .map_or_else(
                        || RsExpr::str(format!("{{{placeholder}}}")),
                        |(field, ident)| path_segment_expr(field, ident, graph),
                    ),
            };
            RsStmt::Expr(RsExpr::ident("path").method("push_str", vec![arg]))
        })
        .collect();

    let mut statements = vec![RsStmt::Let {
        name: "path".to_string(),
        mutable: !pushes.is_empty() || !endpoint.query_params.is_empty(),
        ty: None,
        init,
    }];
    statements.extend(pushes);
    statements
}

fn bool_str(value: RsExpr) -> RsExpr {
    RsExpr::IfElse {
        cond: Box::new(value),
        then_expr: Box::new(RsExpr::str("true")),
        else_expr: Box::new(RsExpr::str("false")),
    }
}

fn date_string(value: RsExpr) -> RsExpr {
    value
        .method("format", vec![RsExpr::str("%Y-%m-%d")])
        .method("to_string", vec![])
}

fn date_time_string(value: RsExpr) -> RsExpr {
    value.method(
        "to_rfc3339_opts",
        vec![
            RsExpr::ident("chrono::SecondsFormat::Secs"),
            RsExpr::Bool(true),
        ],
    )
}

fn json_string(value: RsExpr) -> RsExpr {
    RsExpr::call("serde_json::to_string", vec![value])
        .method("unwrap_or_default", vec![])
}

/// `&str` expression for a path parameter value.
fn path_segment_expr(field: &Field, ident: &str, graph: &ModelGraph) -> RsExpr {
    let value = RsExpr::ident(ident);
    if field.is_array() {
        return array_string(value, value_kind(field.ty.element(), graph)).borrow();
    }
    match value_kind(&field.ty, graph) {
        ValueKind::Str => value.borrow(),
        ValueKind::StrEnum => value.method("as_str", vec![]),
        ValueKind::Display => value.method("to_string", vec![]).borrow(),
        ValueKind::Date => date_string(value).borrow(),
        ValueKind::DateTime => date_time_string(value).borrow(),
        ValueKind::Bool => bool_str(value),
        ValueKind::Json => json_string(value.borrow()).borrow(),
    }
}

/// Owned `String` expression for a scalar query value.
fn scalar_string(value: RsExpr, kind: ValueKind) -> RsExpr {
    match kind {
        ValueKind::Str => value,
        ValueKind::StrEnum => value.method("as_str", vec![]).method("to_string", vec![]),
        ValueKind::Display => value.method("to_string", vec![]),
        ValueKind::Date => date_string(value),
        ValueKind::DateTime => date_time_string(value),
        ValueKind::Bool => RsExpr::call("String::from", vec![bool_str(value)]),
        ValueKind::Json => json_string(value.borrow()),
    }
}

/// Comma-joined `String` expression for an array value.
fn array_string(value: RsExpr, kind: ValueKind) -> RsExpr {
    if kind == ValueKind::Str {
        return value.method("join", vec![RsExpr::str(",")]);
    }
    let element = RsExpr::ident("e");
    let per_element = match kind {
        ValueKind::StrEnum => element.method("as_str", vec![]),
        ValueKind::Date => date_string(element),
        ValueKind::DateTime => date_time_string(element),
        ValueKind::Bool => bool_str(element.deref()),
        ValueKind::Json => json_string(element),
        ValueKind::Str | ValueKind::Display => element.method("to_string", vec![]),
    };
    value
        .method("iter", vec![])
        .method(
            "map",
            vec![RsExpr::Closure {
                param: "e".to_string(),
                body: Box::new(per_element),
            }],
        )
        .method("collect::<Vec<_>>", vec![])
        .method("join", vec![RsExpr::str(",")])
}

fn query_push(key: &str, value: RsExpr) -> RsStmt {
    RsStmt::Expr(RsExpr::ident("query").method(
        "push",
        vec![RsExpr::Tuple(vec![RsExpr::str(key), value])],
    ))
}

/// Statement appending one query parameter.
pub fn query_statement(field: &Field, ident: &str, graph: &ModelGraph) -> RsStmt {
    if field.is_array() {
        let kind = value_kind(field.ty.element(), graph);
        let push = query_push(&field.key, array_string(RsExpr::ident(ident), kind));
        if field.required {
            return push;
        }
        return RsStmt::If {
            cond: RsExpr::Raw(format!("!{ident}.is_empty()")),
            body: vec![push],
        };
    }

    let kind = value_kind(&field.ty, graph);
    if field.required {
        return query_push(&field.key, scalar_string(RsExpr::ident(ident), kind));
    }
    RsStmt::IfLet {
        pattern: "Some(value)".to_string(),
        expr: RsExpr::ident(ident),
        body: vec![query_push(
            &field.key,
            scalar_string(RsExpr::ident("value"), kind),
        )],
    }
}
