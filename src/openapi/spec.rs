//! OpenAPI specification structs for serde deserialization.
//!
//! This module defines the subset of the OpenAPI 3.x document that the
//! SDK pipeline consumes. Structural validation is not attempted: the
//! document is assumed to be well formed.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::GenerateError;

/// Root OpenAPI specification.
#[derive(Debug, Deserialize)]
pub struct OpenApiSpec {
    /// Title and version.
    pub info: Option<Info>,
    /// Servers; the first URL becomes the SDK base URL.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Path items by route template.
    #[serde(default)]
    pub paths: HashMap<String, PathItem>,
    /// Reusable components.
    pub components: Option<Components>,
}

/// Document metadata.
#[derive(Debug, Deserialize)]
pub struct Info {
    /// API title.
    pub title: Option<String>,
    /// API version.
    pub version: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// A server entry; only the URL is used.
#[derive(Debug, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
}

/// Components section containing reusable schemas, responses, bodies and parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// `#/components/schemas`
    pub schemas: Option<HashMap<String, Schema>>,
    /// `#/components/responses`
    pub responses: Option<HashMap<String, Response>>,
    /// `#/components/requestBodies`
    pub request_bodies: Option<HashMap<String, RequestBody>>,
    /// `#/components/parameters`
    pub parameters: Option<HashMap<String, Parameter>>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Deserialize)]
pub struct PathItem {
    /// `get` operation.
    pub get: Option<Operation>,
    /// `post` operation.
    pub post: Option<Operation>,
    /// `put` operation.
    pub put: Option<Operation>,
    /// `patch` operation.
    pub patch: Option<Operation>,
    /// `delete` operation.
    pub delete: Option<Operation>,
    /// Path-level parameters shared by all operations.
    pub parameters: Option<Vec<Parameter>>,
}

/// An API operation (endpoint).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Identifier the endpoint and method names derive from.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Operation-level parameters.
    pub parameters: Option<Vec<Parameter>>,
    /// Request body, inline or a reference.
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    #[serde(default)]
    pub responses: HashMap<String, Response>,
}

/// A parameter (query, path, or header), possibly a `$ref` to a component.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Reference to a component parameter.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Parameter name on the wire.
    #[serde(default)]
    pub name: String,
    /// `path`, `query`, `header` or `cookie`.
    #[serde(rename = "in", default)]
    pub location: String,
    /// Whether the parameter must be sent.
    #[serde(default)]
    pub required: bool,
    /// Free-form description.
    pub description: Option<String>,
    /// Value schema.
    pub schema: Option<Schema>,
}

/// A request body definition.
#[derive(Debug, Deserialize)]
pub struct RequestBody {
    /// Reference to a component request body.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether the body must be sent.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: Option<HashMap<String, MediaType>>,
}

/// A response definition.
#[derive(Debug, Deserialize)]
pub struct Response {
    /// Reference to a component response.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Content by media type.
    pub content: Option<HashMap<String, MediaType>>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
    /// Single example value.
    pub example: Option<serde_json::Value>,
    /// Named examples.
    pub examples: Option<BTreeMap<String, Example>>,
}

/// A named example object.
#[derive(Debug, Deserialize)]
pub struct Example {
    /// Example payload.
    pub value: Option<serde_json::Value>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Schema title.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,

    /// Properties for object types.
    pub properties: Option<HashMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values (can be strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Alternatives, any of which may match.
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    /// Alternatives, exactly one of which matches.
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    /// Schemas merged into one.
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Additional properties for object types (map types).
    pub additional_properties: Option<AdditionalProperties>,

    /// Format hint (e.g., date-time, int64).
    pub format: Option<String>,

    /// Example value attached to the schema itself.
    pub example: Option<serde_json::Value>,

    /// OpenAPI 3.0 nullable flag.
    pub nullable: Option<bool>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String literal.
    String(String),
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// `null`
    Null,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows untyped extra keys.
    Bool(bool),
    /// Schema of every value.
    Schema(Box<Schema>),
}

impl OpenApiSpec {
    /// Parse an OpenAPI spec from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        serde_json::from_str(json)
            .map_err(|e| GenerateError::Parse(format!("invalid JSON document: {e}")))
    }

    /// Parse an OpenAPI spec from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, GenerateError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GenerateError::Parse(format!("invalid YAML document: {e}")))
    }

    /// URL of the first declared server.
    pub fn base_url(&self) -> Option<&str> {
        self.servers
            .first()
            .map(|s| s.url.as_str())
            .filter(|url| !url.is_empty())
    }

    /// `info.title`, or "API".
    pub fn title(&self) -> &str {
        self.info
            .as_ref()
            .and_then(|info| info.title.as_deref())
            .unwrap_or("API")
    }

    /// `info.version`, or "0.0.0".
    pub fn version(&self) -> &str {
        self.info
            .as_ref()
            .and_then(|info| info.version.as_deref())
            .unwrap_or("0.0.0")
    }

    /// Number of component schemas.
    pub fn schema_count(&self) -> usize {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .map_or(0, HashMap::len)
    }

    /// Look up a component schema by name.
    pub fn component_schema(&self, name: &str) -> Option<&Schema> {
        self.components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .and_then(|schemas| schemas.get(name))
    }

    /// Look up a component response by name.
    pub fn component_response(&self, name: &str) -> Option<&Response> {
        self.components
            .as_ref()
            .and_then(|c| c.responses.as_ref())
            .and_then(|responses| responses.get(name))
    }

    /// Look up a component request body by name.
    pub fn component_request_body(&self, name: &str) -> Option<&RequestBody> {
        self.components
            .as_ref()
            .and_then(|c| c.request_bodies.as_ref())
            .and_then(|bodies| bodies.get(name))
    }

    /// Follow a parameter `$ref`; inline parameters are returned as-is.
    pub fn resolve_parameter<'a>(&'a self, param: &'a Parameter) -> Option<&'a Parameter> {
        let Some(ref_path) = &param.ref_path else {
            return Some(param);
        };
        self.components
            .as_ref()
            .and_then(|c| c.parameters.as_ref())
            .and_then(|params| params.get(ref_name(ref_path)))
    }
}

impl PathItem {
    /// Operations present on this path, in the fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("GET", self.get.as_ref()),
            ("POST", self.post.as_ref()),
            ("PUT", self.put.as_ref()),
            ("PATCH", self.patch.as_ref()),
            ("DELETE", self.delete.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

impl MediaType {
    /// Explicit example: `example`, else the first entry of `examples`.
    pub fn explicit_example(&self) -> Option<&serde_json::Value> {
        self.example.as_ref().or_else(|| {
            self.examples
                .as_ref()
                .and_then(|examples| examples.values().find_map(|e| e.value.as_ref()))
        })
    }
}

impl Schema {
    /// The non-null type name, if any.
    pub fn primary_type(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => Some(t.as_str()),
            Some(SchemaType::Multiple(types)) => types
                .iter()
                .map(String::as_str)
                .find(|t| *t != "null"),
            None => None,
        }
    }

    /// Whether the schema is a plain `$ref` with no inline shape of its own.
    pub fn is_bare_ref(&self) -> bool {
        self.ref_path.is_some()
            && self.schema_type.is_none()
            && self.properties.is_none()
            && self.items.is_none()
            && self.all_of.is_none()
            && self.one_of.is_none()
            && self.any_of.is_none()
    }

    /// Whether the schema is a scalar (string/number/integer/boolean).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.primary_type(),
            Some("string" | "number" | "integer" | "boolean")
        ) && self.properties.is_none()
    }

    /// Composition members (`allOf`, then `oneOf`, then `anyOf`), with a flag
    /// telling whether the members are alternatives rather than a merge.
    pub fn composition(&self) -> Option<(&[Schema], bool)> {
        if let Some(all_of) = &self.all_of {
            return Some((all_of.as_slice(), false));
        }
        self.one_of
            .as_ref()
            .or(self.any_of.as_ref())
            .map(|members| (members.as_slice(), true))
    }
}

/// Extract the component name from a `$ref` path (its last segment).
pub fn ref_name(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}

/// Pick the JSON media type from a content map.
pub fn json_media(content: &HashMap<String, MediaType>) -> Option<&MediaType> {
    if let Some(media) = content.get("application/json") {
        return Some(media);
    }
    let mut keys: Vec<_> = content.keys().collect();
    keys.sort();
    keys.iter()
        .find(|k| k.ends_with("+json"))
        .or_else(|| keys.first())
        .and_then(|k| content.get(*k))
}

/// Text form of an enum literal; `null` has none.
pub fn enum_literal_text(value: &EnumValue) -> Option<String> {
    match value {
        EnumValue::String(s) => Some(s.clone()),
        EnumValue::Integer(n) => Some(n.to_string()),
        EnumValue::Float(f) => Some(f.to_string()),
        EnumValue::Bool(b) => Some(b.to_string()),
        EnumValue::Null => None,
    }
}
