//! Generator configuration loaded from TOML.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::GenerateError;
use crate::openapi::HttpMethod;

/// Package name used when the configuration does not set one.
pub const DEFAULT_PACKAGE_NAME: &str = "openapi-sdk";

/// Options for one generation run. Every key is optional.
///
/// ```toml
/// package_name = "acme-sdk"
/// routes = ["/projects", "/projects/{project_id}"]
/// skip_tests = ["/health"]
///
/// [[example_overrides]]
/// route = "/projects"
/// method = "get"
/// body = '{"projects": []}'
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Cargo package name of the generated crate.
    pub package_name: String,
    /// Explicit route order. Empty means lexicographic document order.
    pub routes: Vec<String>,
    /// Routes that get no fixture and no generated tests.
    pub skip_tests: Vec<String>,
    /// Fixture payloads that replace document examples.
    pub example_overrides: Vec<ExampleOverride>,
}

/// Curated fixture payload that replaces the document example.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExampleOverride {
    /// Route template the override applies to.
    pub route: String,
    /// HTTP method name, case-insensitive.
    pub method: String,
    /// JSON text of the payload.
    pub body: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            routes: Vec::new(),
            skip_tests: Vec::new(),
            example_overrides: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(contents: &str) -> Result<Self, GenerateError> {
        let config: Self =
            toml::from_str(contents).map_err(|err| GenerateError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let contents = fs::read_to_string(path).map_err(|source| GenerateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            routes = config.routes.len(),
            overrides = config.example_overrides.len(),
            "Loaded generator config."
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if self.package_name.trim().is_empty() {
            return Err(GenerateError::Config("package_name is empty".to_string()));
        }
        for entry in &self.example_overrides {
            if HttpMethod::from_name(&entry.method).is_none() {
                return Err(GenerateError::Config(format!(
                    "example override for {} has unknown method {:?}",
                    entry.route, entry.method
                )));
            }
            serde_json::from_str::<serde_json::Value>(&entry.body).map_err(|err| {
                GenerateError::Config(format!(
                    "example override for {} {} is not valid JSON: {err}",
                    entry.method, entry.route
                ))
            })?;
        }
        Ok(())
    }

    /// The curated payload for `route` and `method`, if one is configured.
    pub fn example_override(&self, route: &str, method: HttpMethod) -> Option<serde_json::Value> {
        self.example_overrides
            .iter()
            .find(|entry| {
                entry.route == route && HttpMethod::from_name(&entry.method) == Some(method)
            })
            .and_then(|entry| serde_json::from_str(&entry.body).ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.package_name, "openapi-sdk");
    }

    #[test]
    fn test_full_config() {
        let config = GeneratorConfig::from_toml_str(
            r#"
package_name = "acme-sdk"
routes = ["/b", "/a"]
skip_tests = ["/health"]

[[example_overrides]]
route = "/a"
method = "GET"
body = '{"id": "p1"}'
"#,
        )
        .unwrap();
        assert_eq!(config.package_name, "acme-sdk");
        assert_eq!(config.routes, vec!["/b", "/a"]);
        assert_eq!(config.skip_tests, vec!["/health"]);
        assert_eq!(
            config.example_override("/a", HttpMethod::Get),
            Some(serde_json::json!({ "id": "p1" }))
        );
        assert_eq!(config.example_override("/a", HttpMethod::Post), None);
        assert_eq!(config.example_override("/b", HttpMethod::Get), None);
    }

    #[test]
    fn test_invalid_override_body_is_rejected() {
        let err = GeneratorConfig::from_toml_str(
            r#"
[[example_overrides]]
route = "/a"
method = "get"
body = "{not json"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_unknown_method_and_keys_are_rejected() {
        let err = GeneratorConfig::from_toml_str(
            r#"
[[example_overrides]]
route = "/a"
method = "fetch"
body = "{}"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown method"));

        assert!(GeneratorConfig::from_toml_str("route_order = []").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = GeneratorConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, GenerateError::Read { .. }));
    }
}
