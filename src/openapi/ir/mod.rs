//! Intermediate representation for OpenAPI to Rust SDK generation.
//!
//! This module defines a three-layer architecture:
//! 1. Document-level IR: models, fields and endpoints resolved from the
//!    OpenAPI document (`model`, `api`)
//! 2. Rust source IR: types, expressions, statements, items (`types`)
//! 3. Emission: Rust source IR to code strings via the `Emit` trait
//!
//! ## Module Structure
//!
//! - `naming`: canonical identifiers from arbitrary document text
//! - `resolve`: component schemas -> model graph
//! - `extract`: paths and operations -> ordered endpoints
//! - `prune`: reachability closure over the model graph
//! - `codegen`: models and endpoints -> Rust source IR
//! - `fixtures`: mock transport fixtures and example-driven tests
//! - `emit`: Rust source IR -> code strings
//! - `utils`: keyword table, casing and literal helpers

pub mod api;
pub mod codegen;
pub mod emit;
pub mod extract;
pub mod fixtures;
pub mod model;
pub mod naming;
pub mod prune;
pub mod resolve;
pub mod types;
pub mod utils;

pub use api::{Endpoint, HttpMethod};
pub use codegen::{codegen_client, codegen_models};
pub use emit::Emit;
pub use extract::{Extraction, extract_endpoints};
pub use fixtures::{codegen_mock, codegen_tests, fixture_table};
pub use model::{Model, ModelGraph};
pub use prune::prune;
pub use resolve::resolve_components;
