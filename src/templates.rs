//! Static files of the generated crate.
//!
//! The template set is embedded from `templates/` at build time. Entries
//! ending in `.jinja2` are rendered with tera; everything else is copied
//! verbatim.

use std::path::PathBuf;

use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::error::GenerateError;

const TEMPLATE_SUFFIX: &str = ".jinja2";

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Embedded;

/// Values available to `.jinja2` templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    /// Cargo package name.
    pub package_name: String,
    /// First server URL of the document.
    pub base_url: String,
    /// `base_url` escaped for use inside a Rust string literal.
    pub base_url_literal: String,
    /// `info.title`
    pub api_title: String,
    /// `info.version`
    pub api_version: String,
}

/// Read-only set of static output files, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    entries: Vec<(String, String)>,
}

impl Templates {
    /// The template set compiled into the binary.
    pub fn embedded() -> Self {
        let entries = Embedded::iter().filter_map(|path| {
            let file = Embedded::get(&path)?;
            Some((path.to_string(), String::from_utf8_lossy(&file.data).into_owned()))
        });
        Self::from_entries(entries)
    }

    /// A template set built from `(path, content)` pairs.
    pub fn from_entries<P, C>(entries: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        let mut entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();
        entries.sort();
        Self { entries }
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no templates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render every entry, returning output paths with their contents.
    pub fn render(&self, context: &TemplateContext) -> Result<Vec<(PathBuf, String)>, GenerateError> {
        let context = Context::from_serialize(context)?;
        let mut rendered = Vec::with_capacity(self.entries.len());

        for (path, content) in &self.entries {
            if let Some(target) = path.strip_suffix(TEMPLATE_SUFFIX) {
                debug!(template = %path, "Rendering template.");
                let output = Tera::one_off(content, &context, false)?;
                rendered.push((PathBuf::from(target), output));
            } else {
                rendered.push((PathBuf::from(path), content.clone()));
            }
        }

        Ok(rendered)
    }
}
