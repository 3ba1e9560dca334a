//! Reading the input document, writing the generated crate, and running the
//! external verifier on it.

use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{GenerateError, VerifyError};
use crate::openapi::{GeneratedSdk, OpenApiSpec};

/// Read and parse an OpenAPI document. `.yaml`/`.yml` files are parsed as
/// YAML, everything else as JSON.
pub fn load_document(path: &Path) -> Result<OpenApiSpec, GenerateError> {
    let contents = fs::read_to_string(path).map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let spec = if is_yaml {
        OpenApiSpec::from_yaml(&contents)?
    } else {
        OpenApiSpec::from_json(&contents)?
    };

    info!(
        path = %path.display(),
        paths = spec.paths.len(),
        schemas = spec.schema_count(),
        "Loaded OpenAPI document."
    );
    Ok(spec)
}

/// Write every file of `sdk` below `out_dir`, creating directories as needed.
pub fn write_sdk(sdk: &GeneratedSdk, out_dir: &Path) -> Result<(), GenerateError> {
    for (relative, content) in &sdk.files {
        let target = out_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, content).map_err(|source| GenerateError::Write {
            path: target.clone(),
            source,
        })?;
        debug!(path = %target.display(), bytes = content.len(), "Wrote file.");
    }

    info!(
        out_dir = %out_dir.display(),
        files = sdk.files.len(),
        "SDK written."
    );
    Ok(())
}

/// Build and test the generated crate with `cargo test`.
///
/// Files already written are left in place whatever the outcome.
pub fn verify(out_dir: &Path) -> Result<(), VerifyError> {
    info!(out_dir = %out_dir.display(), "Running cargo test on the generated SDK.");
    let output = Command::new("cargo")
        .arg("test")
        .arg("--quiet")
        .current_dir(out_dir)
        .output()
        .map_err(VerifyError::Spawn)?;

    if output.status.success() {
        info!("Generated SDK tests passed.");
        Ok(())
    } else {
        Err(VerifyError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
