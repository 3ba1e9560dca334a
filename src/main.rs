//! Command-line entry point: generate an SDK crate from an OpenAPI document.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use openapi_sdkgen::{
    GenerateError, GeneratorConfig, Templates, generate, init_tracing, load_document, verify,
    write_sdk,
};

#[derive(Parser, Debug)]
#[command(
    name = "openapi-sdkgen",
    version,
    about = "Generate a typed Rust client crate from an OpenAPI 3.x document"
)]
struct Args {
    /// OpenAPI document (.json, .yaml or .yml)
    #[arg(value_name = "SPEC")]
    spec: PathBuf,

    /// Directory the SDK crate is written to
    #[arg(short, long, value_name = "DIR", default_value = "sdk")]
    out: PathBuf,

    /// Generator configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run `cargo test` on the generated crate afterwards
    #[arg(long)]
    verify: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> i32 {
    if let Err(err) = generate_to_disk(&args) {
        error!(error = %err, "Generation failed.");
        return 1;
    }

    if args.verify
        && let Err(err) = verify(&args.out)
    {
        // Written files stay in place and generation still counts as a success.
        error!(error = %err, "Verification of the generated SDK failed.");
    }
    0
}

fn generate_to_disk(args: &Args) -> Result<(), GenerateError> {
    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let spec = load_document(&args.spec)?;
    let sdk = generate(&spec, &config, &Templates::embedded())?;
    write_sdk(&sdk, &args.out)?;
    info!(out_dir = %args.out.display(), "Generated SDK.");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    match run(args) {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
