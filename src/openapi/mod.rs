//! OpenAPI to Rust SDK generator.
//!
//! This module turns an OpenAPI 3.x document into the sources of a typed
//! client crate:
//! - Data types from the component schemas reachable from some operation
//! - An `ApiClient` trait with one method per operation, implemented on `Client`
//! - A mock transport fixture table built from the document examples
//! - A happy/unhappy test pair per operation

mod emitter;
pub mod ir;
pub mod spec;

pub use emitter::{CLIENT_PATH, GeneratedSdk, MOCK_PATH, MODELS_PATH, TESTS_PATH, generate};
pub use ir::HttpMethod;
pub use spec::OpenApiSpec;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::error::GenerateError;
    use crate::templates::Templates;

    const TEST_OPENAPI_JSON: &str = r##"{
  "openapi": "3.0.3",
  "info": { "title": "Projects API", "version": "2.1.0" },
  "servers": [{ "url": "https://api.example.com/v2" }],
  "paths": {
    "/projects": {
      "get": {
        "operationId": "listProjects",
        "description": "List projects visible to the caller.",
        "parameters": [
          { "name": "limit", "in": "query", "schema": { "type": "integer", "format": "int32" } },
          { "name": "state", "in": "query", "schema": { "$ref": "#/components/schemas/ProjectState" } },
          { "name": "tags", "in": "query", "schema": { "type": "array", "items": { "type": "string" } } }
        ],
        "responses": {
          "200": {
            "description": "OK",
            "content": {
              "application/json": {
                "schema": { "$ref": "#/components/schemas/ProjectList" },
                "example": { "projects": [{ "state": "ready", "name": "demo", "id": "p1" }] }
              }
            }
          }
        }
      },
      "post": {
        "operationId": "createProject",
        "requestBody": { "required": true, "content": { "application/json": { "schema": { "$ref": "#/components/schemas/CreateProject" } } } },
        "responses": { "201": { "description": "Created", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Project" } } } } }
      }
    },
    "/projects/{project_id}": {
      "parameters": [{ "name": "project_id", "in": "path", "required": true, "schema": { "type": "string" } }],
      "get": {
        "operationId": "getProject",
        "responses": { "200": { "description": "OK", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Project" } } } } }
      },
      "delete": {
        "operationId": "deleteProject",
        "responses": { "204": { "description": "Deleted" } }
      }
    }
  },
  "components": {
    "schemas": {
      "Project": {
        "type": "object",
        "required": ["id", "name"],
        "properties": {
          "id": { "type": "string" },
          "name": { "type": "string", "description": "Display name." },
          "state": { "$ref": "#/components/schemas/ProjectState" },
          "createdAt": { "type": "string", "format": "date-time" },
          "settings": { "type": "object", "properties": { "retentionDays": { "type": "integer" } } }
        },
        "example": { "id": "p1", "name": "demo" }
      },
      "ProjectState": { "type": "string", "enum": ["ready", "init"] },
      "ProjectList": {
        "type": "object",
        "required": ["projects"],
        "properties": { "projects": { "type": "array", "items": { "$ref": "#/components/schemas/Project" } } }
      },
      "CreateProject": { "type": "object", "required": ["name"], "properties": { "name": { "type": "string" } } },
      "Unused": { "type": "object", "properties": { "x": { "type": "string" } } }
    }
  }
}"##;

    fn generate_sources(json: &str) -> GeneratedSdk {
        let spec = OpenApiSpec::from_json(json).unwrap();
        generate(&spec, &GeneratorConfig::default(), &Templates::default()).unwrap()
    }

    #[test]
    fn test_generate_from_openapi_json() {
        let sdk = generate_sources(TEST_OPENAPI_JSON);
        let paths: Vec<_> = sdk.files.keys().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(
            paths,
            vec![CLIENT_PATH, MOCK_PATH, MODELS_PATH, TESTS_PATH],
            "empty template set adds no files"
        );

        let models = sdk.get(MODELS_PATH).unwrap();
        println!("=== MODELS ===\n{models}\n=== END ===");
        assert!(models.contains("pub struct Project {"), "Missing Project struct");
        assert!(models.contains("pub struct ProjectSettings {"), "Missing hoisted settings");
        assert!(models.contains("pub struct ProjectList {"));
        assert!(models.contains("pub struct CreateProject {"));
        assert!(
            models.contains("pub struct ProjectState(pub std::borrow::Cow<'static, str>);"),
            "Missing enum newtype"
        );
        assert!(models.contains("rename = \"createdAt\""));
        assert!(models.contains("pub created_at: Option<chrono::DateTime<chrono::Utc>>,"));
        assert!(models.contains("    /// Display name.\n    pub name: String,\n"));
        assert!(!models.contains("Unused"), "Unreachable schema was emitted");

        let init = models.find("pub const ProjectStateInit: ProjectState").unwrap();
        let ready = models.find("pub const ProjectStateReady: ProjectState").unwrap();
        assert!(init < ready, "enum constants are sorted");
    }

    #[test]
    fn test_client_methods() {
        let sdk = generate_sources(TEST_OPENAPI_JSON);
        let client = sdk.get(CLIENT_PATH).unwrap();
        println!("=== CLIENT ===\n{client}\n=== END ===");
        assert!(client.contains("pub trait ApiClient {"));
        assert!(client.contains("impl ApiClient for Client {"));
        assert!(client.contains(
            "fn list_projects(&self, limit: Option<i32>, state: Option<ProjectState>, tags: Vec<String>) -> Result<ProjectList, Error>"
        ));
        assert!(client.contains("fn create_project(&self, body: CreateProject) -> Result<Project, Error>"));
        assert!(client.contains("fn get_project(&self, project_id: String) -> Result<Project, Error>"));
        assert!(client.contains("fn delete_project(&self, project_id: String) -> Result<(), Error>"));
        assert!(client.contains("/// List projects visible to the caller."));

        // Methods follow route order, then method order.
        let order: Vec<usize> = ["fn list_projects", "fn create_project", "fn get_project", "fn delete_project"]
            .iter()
            .map(|name| client.find(name).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "unexpected method order");
    }

    #[test]
    fn test_fixtures_and_tests() {
        let sdk = generate_sources(TEST_OPENAPI_JSON);
        let mock = sdk.get(MOCK_PATH).unwrap();
        println!("=== MOCK ===\n{mock}\n=== END ===");
        assert!(mock.contains(
            r##"Fixture { route: "/projects", method: "GET", status: 200, body: r#"{"projects":[{"id":"p1","name":"demo","state":"ready"}]}"# },"##
        ));
        assert!(mock.contains(
            r##"Fixture { route: "/projects", method: "POST", status: 201, body: r#"{"id":"p1","name":"demo"}"# },"##
        ));
        assert!(mock.contains(
            r##"Fixture { route: "/projects/{project_id}", method: "DELETE", status: 200, body: r#"null"# },"##
        ));

        let tests = sdk.get(TESTS_PATH).unwrap();
        println!("=== TESTS ===\n{tests}\n=== END ===");
        assert!(tests.contains(
            "client.list_projects(Some(1), Some(ProjectState::from(\"foo\")), vec![\"foo\".to_string()])"
        ));
        assert!(tests.contains("client.create_project(Default::default())"));
        assert!(tests.contains("client.get_project(\"foo\".to_string())"));
        assert!(tests.contains("fn delete_project_happy_path()"));
        assert!(tests.contains("assert_eq!(result.unwrap_or_default(), <ProjectList>::default());"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate_sources(TEST_OPENAPI_JSON);
        let second = generate_sources(TEST_OPENAPI_JSON);
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_route_order() {
        let spec = OpenApiSpec::from_json(TEST_OPENAPI_JSON).unwrap();
        let config = GeneratorConfig {
            routes: vec!["/projects/{project_id}".to_string(), "/projects".to_string()],
            ..GeneratorConfig::default()
        };
        let sdk = generate(&spec, &config, &Templates::default()).unwrap();
        let client = sdk.get(CLIENT_PATH).unwrap();
        assert!(client.find("fn get_project").unwrap() < client.find("fn list_projects").unwrap());
    }

    #[test]
    fn test_missing_server_is_fatal() {
        let json = TEST_OPENAPI_JSON.replace(r#""servers": [{ "url": "https://api.example.com/v2" }],"#, "");
        let spec = OpenApiSpec::from_json(&json).unwrap();
        let err = generate(&spec, &GeneratorConfig::default(), &Templates::default()).unwrap_err();
        assert!(matches!(err, GenerateError::MissingServer));
    }

    #[test]
    fn test_unbound_placeholder_is_fatal() {
        let json = r#"{
  "openapi": "3.0.3",
  "servers": [{ "url": "https://api.example.com" }],
  "paths": { "/things/{thing_id}": { "get": { "operationId": "getThing", "responses": {} } } }
}"#;
        let spec = OpenApiSpec::from_json(json).unwrap();
        let err = generate(&spec, &GeneratorConfig::default(), &Templates::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::UnboundPlaceholder { ref placeholder, .. } if placeholder == "thing_id"
        ));
    }

    #[test]
    fn test_templates_receive_document_metadata() {
        let spec = OpenApiSpec::from_json(TEST_OPENAPI_JSON).unwrap();
        let templates = Templates::from_entries([(
            "src/lib.rs.jinja2",
            "// {{ api_title }} {{ api_version }}\npub const BASE_URL: &str = \"{{ base_url_literal }}\";\n",
        )]);
        let sdk = generate(&spec, &GeneratorConfig::default(), &templates).unwrap();
        assert_eq!(
            sdk.get("src/lib.rs"),
            Some("// Projects API 2.1.0\npub const BASE_URL: &str = \"https://api.example.com/v2\";\n")
        );
    }
}
