//! Rust SDK emitter for OpenAPI documents.
//!
//! The pipeline is:
//! 1. Resolve: component schemas -> ModelGraph
//! 2. Extract: paths -> Endpoints (plus synthesized surrogate models)
//! 3. Prune: ModelGraph -> models reachable from the endpoints
//! 4. Codegen: models and endpoints -> RsModule (Rust source IR)
//! 5. Emit: RsModule -> String (via Emit trait)
//!
//! Static files come from the injected `Templates`. Nothing is returned
//! unless every step succeeds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::openapi::ir::utils::escape_rust_string;
use crate::openapi::ir::{
    Emit, codegen_client, codegen_mock, codegen_models, codegen_tests, extract_endpoints,
    fixture_table, prune, resolve_components,
};
use crate::openapi::spec::OpenApiSpec;
use crate::templates::{TemplateContext, Templates};

/// Data types of the generated crate.
pub const MODELS_PATH: &str = "src/models.rs";
/// `ApiClient` trait and its implementation.
pub const CLIENT_PATH: &str = "src/client.rs";
/// Fixture table served by the mock transport.
pub const MOCK_PATH: &str = "src/mock.rs";
/// Happy and unhappy path tests.
pub const TESTS_PATH: &str = "src/sdk_test.rs";

/// Every file of a generated SDK crate, keyed by path relative to its root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSdk {
    /// File contents by relative path.
    pub files: BTreeMap<PathBuf, String>,
}

impl GeneratedSdk {
    /// Contents of the file at `path`, if it was generated.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }
}

/// Generate the complete SDK for `spec` in memory.
pub fn generate(
    spec: &OpenApiSpec,
    config: &GeneratorConfig,
    templates: &Templates,
) -> Result<GeneratedSdk, GenerateError> {
    let base_url = spec.base_url().ok_or(GenerateError::MissingServer)?;
    info!(
        title = spec.title(),
        paths = spec.paths.len(),
        schemas = spec.schema_count(),
        "Generating SDK."
    );

    let mut graph = resolve_components(spec);
    let extraction = extract_endpoints(spec, &config.routes, &graph)?;
    for model in extraction.synthesized {
        graph.insert(model);
    }
    let endpoints = extraction.endpoints;
    let models = prune(&graph, &endpoints);
    let fixtures = fixture_table(&endpoints, config);
    debug!(
        endpoints = endpoints.len(),
        fixtures = fixtures.len(),
        "Rendering SDK sources."
    );

    let mut files = BTreeMap::new();
    files.insert(PathBuf::from(MODELS_PATH), codegen_models(&models).emit());
    files.insert(
        PathBuf::from(CLIENT_PATH),
        codegen_client(&endpoints, &models).emit(),
    );
    files.insert(PathBuf::from(MOCK_PATH), codegen_mock(&fixtures).emit());
    files.insert(
        PathBuf::from(TESTS_PATH),
        codegen_tests(&endpoints, &models, config).emit(),
    );

    let context = TemplateContext {
        package_name: config.package_name.clone(),
        base_url: base_url.to_string(),
        base_url_literal: escape_rust_string(base_url),
        api_title: spec.title().to_string(),
        api_version: spec.version().to_string(),
    };
    for (path, content) in templates.render(&context)? {
        if files.contains_key(&path) {
            warn!(path = %path.display(), "Template overrides a generated file.");
        }
        files.insert(path, content);
    }

    Ok(GeneratedSdk { files })
}
