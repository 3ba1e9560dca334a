#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Typed Rust client SDK generator for OpenAPI 3.x documents.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use openapi_sdkgen::{GeneratorConfig, Templates, generate, load_document, write_sdk};
//!
//! # fn main() -> Result<(), openapi_sdkgen::GenerateError> {
//! let spec = load_document(Path::new("openapi.yaml"))?;
//! let sdk = generate(&spec, &GeneratorConfig::default(), &Templates::embedded())?;
//! write_sdk(&sdk, Path::new("generated"))?;
//! # Ok(())
//! # }
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod config;
pub mod error;
pub mod openapi;
pub mod templates;
pub mod writer;

pub use config::{ExampleOverride, GeneratorConfig};
pub use error::{GenerateError, NamingError, VerifyError};
pub use openapi::{GeneratedSdk, OpenApiSpec, generate};
pub use templates::Templates;
pub use writer::{load_document, verify, write_sdk};

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "OPENAPI_SDKGEN_LOG";

/// Install a stderr tracing subscriber.
///
/// `OPENAPI_SDKGEN_LOG` takes a plain level ("debug") or a full filter spec
/// ("openapi_sdkgen=trace,tera=warn"). Without it, `verbosity` picks the
/// level: 0 is info, 1 is debug, anything higher is trace.
pub fn init_tracing(verbosity: u8) {
    let crate_root = module_path!().to_string();

    let filter = match std::env::var(LOG_ENV) {
        Ok(level) if is_plain_level(&level) => format!("{crate_root}={level}"),
        Ok(spec) => spec,
        Err(_) => {
            let level = match verbosity {
                0 => "info",
                1 => "debug",
                _ => "trace",
            };
            format!("{crate_root}={level}")
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_levels() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("openapi_sdkgen=debug"));
        assert!(!is_plain_level("verbose"));
    }
}
