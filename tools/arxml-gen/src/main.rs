// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AUTOSAR ARXML Generator CLI
//!
//! # Usage
//!
//! ```bash
//! # Merge two inputs and print the document
//! arxml-gen -i network.yaml -i services.yaml
//!
//! # Write to a file, replacing it if present
//! arxml-gen -i manifest.yaml -o gen/manifest.arxml --overwrite
//!
//! # Validate only, with a summary on stderr
//! arxml-gen -i manifest.yaml --validate-only --print-summary --strict
//! ```
//!
//! Exit codes: `0` on success, `2` on a configuration error, `1` otherwise.

use arxml_gen::{generate_from_files, write_output, ConfigError, GenerateOptions, Generation};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const PREFIX: &str = "[arxml-generator]";
const DEFAULT_LOG_FILTER: &str = "arxml_gen=warn";

/// AUTOSAR ARXML Generator
#[derive(Parser, Debug)]
#[command(name = "arxml-gen")]
#[command(about = "Generate AUTOSAR ARXML communication manifests from YAML")]
#[command(version)]
struct Args {
    /// Input YAML file (repeat to merge several, in order)
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output ARXML path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build the document but do not write it
    #[arg(long)]
    validate_only: bool,

    /// Indent width of the generated XML
    #[arg(long, default_value_t = arxml_gen::serializer::DEFAULT_INDENT, allow_hyphen_values = true)]
    indent: i64,

    /// Fail on unknown keys instead of warning
    #[arg(long)]
    strict: bool,

    /// Permit non-standard zerocopy and custom_elements sections
    #[arg(long)]
    allow_extensions: bool,

    /// Replace an existing output file
    #[arg(long)]
    overwrite: bool,

    /// Print element counts and warnings to stderr
    #[arg(long)]
    print_summary: bool,

    /// Log filter (e.g. debug, arxml_gen=info); defaults to RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("{PREFIX} error: {err}");
        let code = if err.downcast_ref::<ConfigError>().is_some() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let options = GenerateOptions {
        indent: args.indent,
        strict: args.strict,
        allow_extensions: args.allow_extensions,
    };

    let generation = generate_from_files(&args.input, &options)?;

    if !args.validate_only {
        match &args.output {
            Some(path) => write_output(path, &generation.xml, args.overwrite)?,
            None => print!("{}", generation.xml),
        }
    }

    if args.print_summary {
        print_summary(&generation, &output_label(args));
    }
    Ok(())
}

/// Label shown as the summary's output target.
fn output_label(args: &Args) -> String {
    if args.validate_only {
        return "<validate-only>".to_string();
    }
    match &args.output {
        Some(path) => path.display().to_string(),
        None => "<stdout>".to_string(),
    }
}

fn print_summary(generation: &Generation, target: &str) {
    eprintln!("{PREFIX} generation summary");
    eprintln!("  output: {target}");
    for (label, count) in generation.summary().entries() {
        eprintln!("  {label}: {count}");
    }
    eprintln!("  warnings: {}", generation.warnings().len());
    for warning in generation.warnings() {
        eprintln!("    - {warning}");
    }
}
