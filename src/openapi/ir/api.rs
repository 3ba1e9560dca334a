//! API-level IR for extracted operations.
//!
//! This module defines the intermediate representation for API operations:
//! - Endpoint: One HTTP operation with its parameters and payloads
//! - Payload: Request body type with its required-ness
//! - RouteSegment: Parsed pieces of a route template

use super::model::{Field, TypeToken};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Parse a method name in any case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

/// Request body type and whether the operation requires it.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Declared body type.
    pub ty: TypeToken,
    /// Whether the method takes the body unwrapped.
    pub required: bool,
}

/// A single extracted operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// Operation identifier with its first letter upper-cased (e.g., "ListProjects")
    pub name: String,
    /// HTTP method of the operation.
    pub method: HttpMethod,
    /// Route template (e.g., "/projects/{project_id}")
    pub route: String,
    /// Operation description, falling back to its summary.
    pub description: Option<String>,
    /// Request body, if the operation takes one.
    pub request: Option<Payload>,
    /// Success payload type; `None` renders as `()`.
    pub response: Option<TypeToken>,
    /// Path parameters in document order
    pub path_params: Vec<Field>,
    /// Query parameters in document order
    pub query_params: Vec<Field>,
    /// Example of the success payload.
    pub example_response: Option<serde_json::Value>,
    /// Success status the fixture answers with.
    pub status_code: u16,
}

impl Endpoint {
    /// Path parameter bound to a placeholder.
    pub fn path_param(&self, placeholder: &str) -> Option<&Field> {
        self.path_params.iter().find(|p| p.key == placeholder)
    }

    /// Every parameter in signature order: path first, then query.
    pub fn params(&self) -> impl Iterator<Item = &Field> {
        self.path_params.iter().chain(self.query_params.iter())
    }
}

/// A piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
    /// Literal text copied verbatim
    Literal(String),
    /// `{name}` placeholder
    Param(String),
}

/// Split a route template into literal and placeholder segments.
pub fn parse_route(route: &str) -> Vec<RouteSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_param = false;

    for c in route.chars() {
        if c == '{' && !in_param {
            if !current.is_empty() {
                segments.push(RouteSegment::Literal(std::mem::take(&mut current)));
            }
            in_param = true;
        } else if c == '}' && in_param {
            segments.push(RouteSegment::Param(std::mem::take(&mut current)));
            in_param = false;
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        // An unterminated `{` is kept as literal text.
        if in_param {
            current.insert(0, '{');
        }
        segments.push(RouteSegment::Literal(current));
    }
    segments
}

/// Placeholder names of a route in order.
pub fn placeholders(route: &str) -> Vec<String> {
    parse_route(route)
        .into_iter()
        .filter_map(|segment| match segment {
            RouteSegment::Param(name) => Some(name),
            RouteSegment::Literal(_) => None,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route() {
        assert_eq!(
            parse_route("/projects/{project_id}/branches/{branch_id}"),
            vec![
                RouteSegment::Literal("/projects/".to_string()),
                RouteSegment::Param("project_id".to_string()),
                RouteSegment::Literal("/branches/".to_string()),
                RouteSegment::Param("branch_id".to_string()),
            ]
        );
        assert_eq!(
            parse_route("/projects"),
            vec![RouteSegment::Literal("/projects".to_string())]
        );
    }

    #[test]
    fn test_parse_route_adjacent_and_unterminated() {
        assert_eq!(
            parse_route("/{a}{b}"),
            vec![
                RouteSegment::Literal("/".to_string()),
                RouteSegment::Param("a".to_string()),
                RouteSegment::Param("b".to_string()),
            ]
        );
        assert_eq!(
            parse_route("/x/{oops"),
            vec![
                RouteSegment::Literal("/x/".to_string()),
                RouteSegment::Literal("{oops".to_string()),
            ]
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("/projects/{project_id}/operations/{operation_id}"),
            vec!["project_id".to_string(), "operation_id".to_string()]
        );
        assert!(placeholders("/health").is_empty());
    }

    #[test]
    fn test_http_method_names() {
        assert_eq!(HttpMethod::from_name("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_name("TRACE"), None);
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }
}
