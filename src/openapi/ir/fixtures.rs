//! Mock transport fixtures and example-driven tests.
//!
//! Each endpoint that is not deny-listed gets one fixture (its status code
//! and example payload) and a happy/unhappy test pair run against the mock
//! transport of the generated crate.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::api::{Endpoint, HttpMethod};
use super::codegen::{body_type, param_type, response_type, rust_type};
use super::emit::Emit;
use super::model::{Field, Model, ModelGraph, Primitive, TypeToken};
use super::naming::method_ident;
use super::types::{RsDecl, RsExpr, RsFn, RsItem, RsModule, RsStmt, RsType};
use crate::config::GeneratorConfig;

/// Credential the mock transport accepts.
pub const VALID_API_KEY: &str = "foo";

/// Credential the mock transport rejects.
pub const INVALID_API_KEY: &str = "invalidApiKey";

/// A mock response for one route and method.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    /// Route template.
    pub route: String,
    /// Method of the operation.
    pub method: HttpMethod,
    /// Status the mock answers with.
    pub status: u16,
    /// Canonical JSON text of the payload.
    pub body: String,
}

fn skipped(config: &GeneratorConfig, endpoint: &Endpoint) -> bool {
    config.skip_tests.iter().any(|route| route == &endpoint.route)
}

/// Fixture table ordered by route, then method.
pub fn fixture_table(endpoints: &[Endpoint], config: &GeneratorConfig) -> Vec<Fixture> {
    let mut table: BTreeMap<&str, BTreeMap<HttpMethod, Fixture>> = BTreeMap::new();

    for endpoint in endpoints {
        if skipped(config, endpoint) {
            debug!(route = %endpoint.route, "Route is deny-listed, no fixture.");
            continue;
        }
        let payload = match config.example_override(&endpoint.route, endpoint.method) {
            Some(value) => {
                debug!(route = %endpoint.route, method = endpoint.method.as_str(), "Using example override.");
                Some(value)
            }
            None => endpoint.example_response.clone(),
        };
        let body = payload.map_or_else(|| "null".to_string(), |v| v.to_string());

        table.entry(endpoint.route.as_str()).or_default().insert(
            endpoint.method,
            Fixture {
                route: endpoint.route.clone(),
                method: endpoint.method,
                status: endpoint.status_code,
                body,
            },
        );
    }

    table
        .into_values()
        .flat_map(BTreeMap::into_values)
        .collect()
}

/// Render the fixture table as the `mock.rs` module.
pub fn codegen_mock(fixtures: &[Fixture]) -> RsModule {
    let entries = fixtures
        .iter()
        .map(|fixture| RsExpr::StructLit {
            name: "Fixture".to_string(),
            fields: vec![
                ("route".to_string(), RsExpr::str(fixture.route.as_str())),
                ("method".to_string(), RsExpr::str(fixture.method.as_str())),
                ("status".to_string(), RsExpr::Int(i64::from(fixture.status))),
                ("body".to_string(), RsExpr::RawStr(fixture.body.clone())),
            ],
        })
        .collect();

    RsModule {
        doc: vec!["Mock transport fixtures generated from the API document examples.".to_string()],
        inner_attrs: Vec::new(),
        uses: vec!["crate::transport::Fixture".to_string()],
        decls: vec![RsDecl::Item(RsItem::Const {
            name: "FIXTURES".to_string(),
            ty: RsType::path("&[Fixture]"),
            value: RsExpr::SliceRef(entries),
        })],
    }
}

/// Render the happy/unhappy test pair of every endpoint as `sdk_test.rs`.
pub fn codegen_tests(
    endpoints: &[Endpoint],
    graph: &ModelGraph,
    config: &GeneratorConfig,
) -> RsModule {
    let mut decls = Vec::new();
    for endpoint in endpoints {
        if skipped(config, endpoint) {
            continue;
        }
        decls.push(RsDecl::Fn(happy_path(endpoint, graph)));
        decls.push(RsDecl::Fn(unhappy_path(endpoint, graph)));
    }

    RsModule {
        doc: vec!["Example-driven tests generated from the API document.".to_string()],
        inner_attrs: vec!["allow(unused_imports)".to_string()],
        uses: vec![
            "crate::client::ApiClient".to_string(),
            "crate::mock::FIXTURES".to_string(),
            "crate::models::*".to_string(),
            "crate::transport::{Client, INVALID_API_KEY, MockTransport, VALID_API_KEY}".to_string(),
        ],
        decls,
    }
}

fn test_name(endpoint: &Endpoint, scenario: &str) -> String {
    let method = method_ident(&endpoint.name);
    format!("{}_{scenario}", method.trim_start_matches("r#"))
}

fn call(endpoint: &Endpoint, graph: &ModelGraph) -> RsExpr {
    let mut args: Vec<RsExpr> = endpoint.params().map(|p| dummy_arg(p, graph)).collect();
    if let Some(payload) = &endpoint.request {
        let body = RsExpr::ident("Default::default()");
        args.push(if body_type(payload, graph).is_option() {
            RsExpr::call("Some", vec![body])
        } else {
            body
        });
    }
    RsExpr::ident("client").method(method_ident(&endpoint.name), args)
}

fn test_fn(name: String, body: Vec<RsStmt>) -> RsFn {
    RsFn {
        name,
        doc: Vec::new(),
        attrs: vec!["test".to_string()],
        is_pub: false,
        receiver: false,
        params: Vec::new(),
        ret: RsType::Unit,
        body,
    }
}

fn let_stmt(name: &str, ty: Option<RsType>, init: RsExpr) -> RsStmt {
    RsStmt::Let {
        name: name.to_string(),
        mutable: false,
        ty,
        init,
    }
}

fn happy_path(endpoint: &Endpoint, graph: &ModelGraph) -> RsFn {
    let mut body = vec![let_stmt(
        "transport",
        None,
        RsExpr::call("MockTransport::new", vec![RsExpr::ident("FIXTURES")]),
    )];

    let response = response_type(endpoint, graph);
    let has_response = response != RsType::Unit;
    if has_response {
        body.push(let_stmt(
            "expected",
            Some(response),
            RsExpr::ident("transport").method(
                "expected",
                vec![
                    RsExpr::str(endpoint.route.as_str()),
                    RsExpr::str(endpoint.method.as_str()),
                ],
            ),
        ));
    }
    body.push(let_stmt(
        "client",
        None,
        RsExpr::call(
            "Client::new",
            vec![RsExpr::ident("VALID_API_KEY"), RsExpr::ident("transport")],
        ),
    ));
    body.push(let_stmt("result", None, call(endpoint, graph)));

    let unwrapped = RsExpr::ident("result").method("expect", vec![RsExpr::str("request succeeds")]);
    if has_response {
        body.push(RsStmt::Expr(RsExpr::macro_call(
            "assert_eq",
            vec![unwrapped, RsExpr::ident("expected")],
        )));
    } else {
        body.push(RsStmt::Expr(unwrapped));
    }

    test_fn(test_name(endpoint, "happy_path"), body)
}

fn unhappy_path(endpoint: &Endpoint, graph: &ModelGraph) -> RsFn {
    let mut body = vec![
        let_stmt(
            "client",
            None,
            RsExpr::call(
                "Client::new",
                vec![
                    RsExpr::ident("INVALID_API_KEY"),
                    RsExpr::call("MockTransport::new", vec![RsExpr::ident("FIXTURES")]),
                ],
            ),
        ),
        let_stmt("result", None, call(endpoint, graph)),
        RsStmt::Expr(RsExpr::macro_call(
            "assert",
            vec![RsExpr::ident("result").method("is_err", vec![])],
        )),
    ];

    if let Some(sentinel) = sentinel(endpoint, graph) {
        body.push(RsStmt::Expr(RsExpr::macro_call(
            "assert_eq",
            vec![
                RsExpr::ident("result").method("unwrap_or_default", vec![]),
                sentinel,
            ],
        )));
    }

    test_fn(test_name(endpoint, "unhappy_path"), body)
}

/// Value a failed call falls back to: an empty list for list-shaped
/// responses, the default instance otherwise, nothing without a response.
pub fn sentinel(endpoint: &Endpoint, graph: &ModelGraph) -> Option<RsExpr> {
    let token = endpoint.response.as_ref()?;
    let expr = match token {
        TypeToken::Array(inner) => {
            RsExpr::Raw(format!("Vec::<{}>::new()", rust_type(inner, graph).emit()))
        }
        other => RsExpr::Raw(format!("<{}>::default()", rust_type(other, graph).emit())),
    };
    Some(expr)
}

/// Placeholder argument for a parameter.
pub fn dummy_arg(field: &Field, graph: &ModelGraph) -> RsExpr {
    let value = dummy_value(&field.ty, graph);
    if param_type(field, graph).is_option() {
        RsExpr::call("Some", vec![value])
    } else {
        value
    }
}

fn dummy_value(token: &TypeToken, graph: &ModelGraph) -> RsExpr {
    if let TypeToken::Array(inner) = token {
        return RsExpr::macro_call("vec", vec![dummy_value(inner, graph)]);
    }
    if let TypeToken::Named(name) = token
        && graph.get(name).is_some_and(Model::is_string_enum)
    {
        return RsExpr::call(format!("{name}::from"), vec![RsExpr::str("foo")]);
    }
    match graph.scalar_of(token) {
        Some(Primitive::String) => RsExpr::str("foo").method("to_string", vec![]),
        Some(Primitive::Int32 | Primitive::Int64 | Primitive::Integer) => RsExpr::Int(1),
        Some(Primitive::Float | Primitive::Double | Primitive::Number) => RsExpr::Float(1.0),
        Some(Primitive::Boolean) => RsExpr::Bool(true),
        Some(Primitive::Date) => RsExpr::call("chrono::NaiveDate::default", vec![]),
        Some(Primitive::DateTime) => {
            RsExpr::call("chrono::DateTime::<chrono::Utc>::default", vec![])
        }
        None => {
            if let TypeToken::Named(name) = token
                && !graph.contains(name)
            {
                warn!(model = %name, "Dummy argument for an unknown model.");
            }
            RsExpr::ident("Default::default()")
        }
    }
}
