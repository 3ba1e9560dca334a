//! Canonical identifiers derived from arbitrary document text.
//!
//! `canonicalize` produces lowerCamel names, `canonicalize_export` the
//! UpperCamel form, and the `*_ident` helpers produce Rust identifiers for
//! emitted code. All functions are pure and total except `field_ident`,
//! which reports inputs with no identifier characters. `TypeNames` keeps
//! synthesized type names apart from the document's own.

use std::collections::BTreeSet;

use super::utils::{capitalize_first, escape_keyword, is_identifier, lowercase_first, to_snake_case};
use crate::error::NamingError;

/// Canonical casing of acronym tokens and their plurals.
fn acronym(token: &str) -> Option<&'static str> {
    match token {
        "id" => Some("ID"),
        "ids" => Some("IDs"),
        "uri" => Some("URI"),
        "uris" => Some("URIs"),
        "url" => Some("URL"),
        "urls" => Some("URLs"),
        _ => None,
    }
}

fn is_mixed_case(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_uppercase()) && s.chars().any(|c| c.is_ascii_lowercase())
}

/// Convert text to a lowerCamel canonical identifier.
///
/// Hyphens, periods and spaces split words like underscores do. Every word
/// after the first has its first character upper-cased, and the words
/// `id`, `uri` and `url` (and plurals) are written as acronyms. Input that
/// is already camel-cased keeps its interior casing.
pub fn canonicalize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if matches!(c, '-' | '.' | ' ') { '_' } else { c })
        .collect();

    if !replaced.contains('_') && is_mixed_case(&replaced) {
        return lowercase_first(&replaced);
    }

    let lowered = replaced.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for (i, token) in lowered.split('_').enumerate() {
        if i == 0 {
            out.push_str(token);
        } else if let Some(upper) = acronym(token) {
            out.push_str(upper);
        } else {
            out.push_str(&capitalize_first(token));
        }
    }
    out
}

/// Convert text to an UpperCamel canonical identifier.
pub fn canonicalize_export(text: &str) -> String {
    capitalize_first(&canonicalize(text))
}

/// Type name for a document component key.
///
/// Keys that are already UpperCamel identifiers are used as-is.
pub fn type_name(key: &str) -> String {
    if is_identifier(key) && key.starts_with(|c: char| c.is_ascii_uppercase()) {
        return key.to_string();
    }
    let cleaned: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let name = canonicalize_export(&cleaned);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{name}")
    } else {
        name
    }
}

/// Name of a model hoisted out of a parent's property.
pub fn hoisted_name(parent: &str, property: &str) -> String {
    format!("{parent}{}", type_name_suffix(property))
}

/// Type names claimed during a run.
///
/// Document-named models are reserved before anything is synthesized.
/// `claim` hands out a synthesized name, appending `2`, `3`, ... when the
/// preferred one is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNames {
    taken: BTreeSet<String>,
}

impl TypeNames {
    /// An empty name set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a document name as taken. Reserving twice is allowed.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Whether `name` is already taken.
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Take `preferred`, or the first free numbered variant of it.
    pub fn claim(&mut self, preferred: &str) -> String {
        if self.taken.insert(preferred.to_string()) {
            return preferred.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{preferred}{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl<'a> FromIterator<&'a str> for TypeNames {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            taken: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Endpoint name: the operation identifier with its first letter upper-cased.
pub fn endpoint_name(operation_id: &str) -> String {
    capitalize_first(operation_id)
}

/// Constant name for an enum literal: the alias name followed by the
/// canonical form of the literal, e.g. `EndpointState` + `init`.
pub fn enum_const_name(alias: &str, literal: &str) -> String {
    let suffix = type_name_suffix(literal);
    if suffix.is_empty() {
        format!("{}Empty", capitalize_first(alias))
    } else {
        format!("{}{suffix}", capitalize_first(alias))
    }
}

fn type_name_suffix(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    canonicalize_export(&cleaned)
}

/// snake_case Rust identifier for a field or parameter key.
pub fn field_ident(key: &str) -> Result<String, NamingError> {
    let snake = to_snake_case(key);
    if snake.is_empty() {
        return Err(NamingError::Degenerate(key.to_string()));
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(format!("_{snake}"));
    }
    Ok(escape_keyword(&snake))
}

/// snake_case Rust identifier for an endpoint method.
pub fn method_ident(endpoint_name: &str) -> String {
    let snake = to_snake_case(endpoint_name);
    if snake.is_empty() {
        "call".to_string()
    } else {
        escape_keyword(&snake)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_acronyms() {
        assert_eq!(canonicalize("project_id"), "projectID");
        assert_eq!(canonicalize_export("connection_uri"), "ConnectionURI");
        assert_eq!(canonicalize_export("connection_uris"), "ConnectionURIs");
        assert_eq!(canonicalize("project_ids"), "projectIDs");
        assert_eq!(canonicalize("callback_urls"), "callbackURLs");
        assert_eq!(canonicalize("base-url"), "baseURL");
    }

    #[test]
    fn test_canonicalize_separators() {
        assert_eq!(canonicalize("pg.version"), "pgVersion");
        assert_eq!(canonicalize("created at"), "createdAt");
        assert_eq!(canonicalize("max-retry_count"), "maxRetryCount");
        assert_eq!(canonicalize("UPPER_CASE"), "upperCase");
    }

    #[test]
    fn test_first_token_is_not_an_acronym() {
        assert_eq!(canonicalize("id"), "id");
        assert_eq!(canonicalize_export("id"), "Id");
        assert_eq!(canonicalize("url_path"), "urlPath");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        for input in ["project_id", "connection_uris", "pg.version", "max-retry_count", "ready"] {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "canonicalize not idempotent on {input}");
            let export = canonicalize_export(input);
            assert_eq!(
                canonicalize_export(&export),
                export,
                "canonicalize_export not idempotent on {input}"
            );
        }
    }

    #[test]
    fn test_bare_acronym_is_the_exception() {
        // An all-caps acronym is read as a word and lower-cased.
        assert_eq!(canonicalize("ID"), "id");
    }

    #[test]
    fn test_canonicalize_is_total() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("___"), "");
        assert_eq!(canonicalize("_id"), "ID");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name("Project"), "Project");
        assert_eq!(type_name("ProjectID"), "ProjectID");
        assert_eq!(type_name("project-list"), "ProjectList");
        assert_eq!(type_name("branch.response"), "BranchResponse");
        assert_eq!(type_name("2fa"), "T2fa");
    }

    #[test]
    fn test_enum_const_name() {
        assert_eq!(enum_const_name("EndpointState", "init"), "EndpointStateInit");
        assert_eq!(enum_const_name("EndpointState", "ready"), "EndpointStateReady");
        assert_eq!(enum_const_name("Provider", "aws-us-east"), "ProviderAwsUsEast");
        assert_eq!(enum_const_name("Plan", "free/v2"), "PlanFreeV2");
        assert_eq!(enum_const_name("Plan", ""), "PlanEmpty");
        assert_eq!(enum_const_name("Code", "1"), "Code1");
    }

    #[test]
    fn test_hoisted_name() {
        assert_eq!(hoisted_name("Project", "settings"), "ProjectSettings");
        assert_eq!(hoisted_name("Project", "quota_reset"), "ProjectQuotaReset");
        assert_eq!(hoisted_name("Project", "owner_id"), "ProjectOwnerID");
    }

    #[test]
    fn test_type_names_claim_free_variants() {
        let mut names: TypeNames = ["ProjectSettings", "Project"].into_iter().collect();
        assert!(names.contains("Project"));
        assert_eq!(names.claim("ProjectSettings"), "ProjectSettings2");
        assert_eq!(names.claim("ProjectSettings"), "ProjectSettings3");
        assert_eq!(names.claim("ProjectQuota"), "ProjectQuota");
        assert_eq!(names.claim("ProjectQuota"), "ProjectQuota2");

        names.reserve("Project");
        assert_eq!(names.claim("Project"), "Project2");
    }

    #[test]
    fn test_field_ident() {
        assert_eq!(field_ident("project_id").unwrap(), "project_id");
        assert_eq!(field_ident("projectID").unwrap(), "project_id");
        assert_eq!(field_ident("createdAt").unwrap(), "created_at");
        assert_eq!(field_ident("type").unwrap(), "r#type");
        assert_eq!(field_ident("self").unwrap(), "self_");
        assert_eq!(field_ident("2fa").unwrap(), "_2fa");
        assert_eq!(
            field_ident("--").unwrap_err(),
            NamingError::Degenerate("--".to_string())
        );
        assert!(field_ident("").is_err());
    }

    #[test]
    fn test_method_ident() {
        assert_eq!(endpoint_name("listProjects"), "ListProjects");
        assert_eq!(method_ident("ListProjects"), "list_projects");
        assert_eq!(method_ident("GetProjectBranchIDs"), "get_project_branch_ids");
        assert_eq!(method_ident("Move"), "r#move");
    }
}
