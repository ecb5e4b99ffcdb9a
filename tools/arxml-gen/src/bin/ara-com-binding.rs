// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ara::com SOME/IP binding header generator
//!
//! ```bash
//! ara-com-binding --input gen/manifest.arxml --output gen/vehicle_status_binding.h
//! ```

use anyhow::Context;
use arxml_gen::binding::{extract_someip_binding, render_header, DEFAULT_NAMESPACE};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const PREFIX: &str = "[ara-com-codegen]";

/// Generate ara::com SOME/IP binding constants header from ARXML
#[derive(Parser, Debug)]
#[command(name = "ara-com-binding")]
#[command(version)]
struct Args {
    /// Input ARXML file path
    #[arg(long)]
    input: PathBuf,

    /// Output header file path
    #[arg(long)]
    output: PathBuf,

    /// C++ namespace for generated constants
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// SHORT-NAME of the PROVIDED-SOMEIP-SERVICE-INSTANCE to use
    #[arg(long)]
    provided_service_short_name: Option<String>,

    /// SHORT-NAME of the SOMEIP-PROVIDED-EVENT-GROUP to use
    #[arg(long)]
    provided_event_group_short_name: Option<String>,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&args) {
        eprintln!("{PREFIX} error: {err:#}");
        std::process::exit(1);
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve the working directory")?;
    Ok(cwd.join(path))
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = absolute(&args.input)?;
    let output = absolute(&args.output)?;

    if !input.exists() {
        anyhow::bail!("input not found: {}", input.display());
    }

    let xml = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let binding = extract_someip_binding(
        &xml,
        args.provided_service_short_name.as_deref(),
        args.provided_event_group_short_name.as_deref(),
    )?;
    let header = render_header(&binding, &output, &args.namespace)?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, header)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(service = %binding.provided_service_short_name, "rendered binding header");
    println!(
        "{PREFIX} generated service=0x{:04X} instance=0x{:04X} event=0x{:04X} event_group=0x{:04X} -> {}",
        binding.service_interface_id,
        binding.service_instance_id,
        binding.event_id,
        binding.event_group_id,
        output.display()
    );
    Ok(())
}
