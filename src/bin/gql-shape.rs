//! gql-shape CLI
//!
//! Command-line interface for turning schema manifests into GraphQL declarations.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use gql_shape::{load_manifest, ManifestError, SdlBuilder, TypeFactory};

#[derive(Parser)]
#[command(name = "gql-shape")]
#[command(about = "Derive GraphQL types from validation-schema manifests")]
#[command(version)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a manifest and print the resulting declarations
    Render {
        /// Manifest source: file path or URL (http:// or https://)
        manifest: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Sdl)]
        format: Format,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check that a manifest loads and every registration succeeds
    Check {
        /// Manifest source: file path or URL (http:// or https://)
        manifest: String,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// GraphQL schema definition language
    Sdl,
    /// JSON summary of every declaration
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render {
            manifest,
            format,
            output,
        } => run_render(&manifest, format, output),
        Commands::Check { manifest, json } => run_check(&manifest, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_render(source: &str, format: Format, output: Option<PathBuf>) -> Result<(), u8> {
    let fail = |e: ManifestError| {
        report_manifest_error(&e);
        e.exit_code() as u8
    };

    let manifest = load_manifest(source).map_err(fail)?;
    let builder = manifest.to_sdl_builder().map_err(fail)?;

    let rendered = match format {
        Format::Sdl => builder.render().map_err(|e| fail(e.into()))?,
        Format::Json => {
            let summary = builder.summary().map_err(|e| fail(e.into()))?;
            serde_json::to_string_pretty(&summary).map_err(|e| {
                eprintln!("Error serializing output: {}", e);
                2u8
            })?
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
            tracing::info!(path = %path.display(), "wrote declarations");
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn run_check(source: &str, json_output: bool) -> Result<(), u8> {
    let manifest = load_manifest(source).map_err(|e| report_check_error(json_output, &e))?;

    let mut factory = TypeFactory::new(SdlBuilder::new());
    let registered = manifest
        .apply(&mut factory)
        .map_err(|e| report_check_error(json_output, &e))?;
    factory
        .builder()
        .summary()
        .map_err(|e| report_check_error(json_output, &e.into()))?;

    if json_output {
        let output = serde_json::json!({
            "valid": true,
            "registered": registered,
        });
        println!("{}", output);
    } else {
        for r in &registered {
            println!("  {:?} {}", r.kind, r.name);
        }
        println!("Valid ({} registrations)", registered.len());
    }
    Ok(())
}

/// Report a failed check in plain text or JSON format and return its exit code.
fn report_check_error(json_output: bool, e: &ManifestError) -> u8 {
    if json_output {
        let output = match e {
            ManifestError::Invalid { issues } => serde_json::json!({
                "valid": false,
                "issues": issues,
            }),
            other => serde_json::json!({
                "valid": false,
                "error": other.to_string(),
            }),
        };
        println!("{}", output);
    } else {
        report_manifest_error(e);
    }
    e.exit_code() as u8
}

fn report_manifest_error(e: &ManifestError) {
    eprintln!("Error: {}", e);
    if let ManifestError::Invalid { issues } = e {
        for issue in issues {
            eprintln!("  {}", issue);
        }
    }
}
