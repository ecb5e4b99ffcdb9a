// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AUTOSAR ARXML Generator
//!
//! Builds AUTOSAR communication manifests (Ethernet topology, SOME/IP service
//! instances, DDS bindings) from one or more YAML documents.
//!
//! # Pipeline
//!
//! - **Load**: each input file becomes a [`RawDocument`]
//! - **Merge**: variables are substituted and packages concatenated in input order
//! - **Build**: packages are turned into an [`ElementNode`] tree
//! - **Serialize**: the tree is rendered as indented, deterministic XML
//!
//! # Quick Start
//!
//! ```bash
//! # Generate to stdout
//! arxml-gen -i network.yaml -i services.yaml
//!
//! # Write a file, fail on unknown keys
//! arxml-gen -i manifest.yaml -o out/manifest.arxml --strict --overwrite
//!
//! # Check inputs only
//! arxml-gen -i manifest.yaml --validate-only --print-summary
//! ```
//!
//! # Input Document
//!
//! ```yaml
//! variables:
//!   SOMEIP_MCAST: 239.0.0.1
//!
//! autosar:
//!   packages:
//!     - short_name: VehicleStatus
//!       someip:
//!         provided_service_instances:
//!           - short_name: VehicleStatusProvider
//!             service_interface_id: 0x1234
//!             service_instance_id: 1
//! ```

pub mod binding;
pub mod builder;
pub mod coerce;
pub mod context;
pub mod error;
pub mod loader;
pub mod serializer;
pub mod shape;
pub mod tree;

pub use context::{GenerationContext, GenerationSummary};
pub use error::{ConfigError, Result};
pub use loader::{MergedConfig, RawDocument, VariableTable};
pub use tree::ElementNode;

use std::path::Path;

/// Knobs of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Serializer indent width. Negative values are rejected.
    pub indent: i64,
    /// Unknown keys fail instead of warning.
    pub strict: bool,
    /// Permit zero-copy and custom-element sections.
    pub allow_extensions: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            indent: serializer::DEFAULT_INDENT,
            strict: false,
            allow_extensions: false,
        }
    }
}

/// Result of a successful run: the document text and the run's context.
#[derive(Debug, Clone)]
pub struct Generation {
    pub xml: String,
    pub context: GenerationContext,
}

impl Generation {
    pub fn summary(&self) -> &GenerationSummary {
        &self.context.summary
    }

    pub fn warnings(&self) -> &[String] {
        &self.context.warnings
    }
}

/// Load, merge, build and serialize `inputs`, in order.
pub fn generate_from_files<P: AsRef<Path>>(
    inputs: &[P],
    options: &GenerateOptions,
) -> Result<Generation> {
    if inputs.is_empty() {
        return Err(ConfigError::NoInputs);
    }

    let documents = inputs
        .iter()
        .map(|path| {
            tracing::info!(input = %path.as_ref().display(), "loading");
            RawDocument::load(path.as_ref())
        })
        .collect::<Result<Vec<_>>>()?;

    generate_from_documents(&documents, options)
}

/// Run the pipeline on already-parsed documents.
pub fn generate_from_documents(
    documents: &[RawDocument],
    options: &GenerateOptions,
) -> Result<Generation> {
    if documents.is_empty() {
        return Err(ConfigError::NoInputs);
    }

    let merged = MergedConfig::merge(documents)?;
    tracing::info!(
        documents = documents.len(),
        packages = merged.packages.len(),
        "merged inputs"
    );

    let mut context = GenerationContext::new(options.strict, options.allow_extensions);
    let root = builder::build_tree(&merged, &mut context)?;
    tracing::info!(warnings = context.warnings.len(), "built element tree");

    let xml = serializer::serialize_tree(&root, options.indent)?;
    tracing::info!(bytes = xml.len(), "serialized document");

    Ok(Generation { xml, context })
}

/// Write `xml` to `path`, creating missing parent directories.
///
/// An existing file is only replaced when `overwrite` is set.
pub fn write_output(path: &Path, xml: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(ConfigError::OutputExists {
            path: path.to_path_buf(),
        });
    }

    let write_error = |source| ConfigError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, xml).map_err(write_error)?;

    tracing::info!(output = %path.display(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> RawDocument {
        RawDocument::parse(text, Path::new("inline.yaml")).expect("valid document")
    }

    #[test]
    fn test_default_options() {
        let options = GenerateOptions::default();
        assert_eq!(options.indent, 4);
        assert!(!options.strict);
        assert!(!options.allow_extensions);
    }

    #[test]
    fn test_no_inputs() {
        let none: [&Path; 0] = [];
        assert!(matches!(
            generate_from_files(&none, &GenerateOptions::default()),
            Err(ConfigError::NoInputs)
        ));
        assert!(matches!(
            generate_from_documents(&[], &GenerateOptions::default()),
            Err(ConfigError::NoInputs)
        ));
    }

    #[test]
    fn test_generation_exposes_context() {
        let generation = generate_from_documents(
            &[doc("autosar:\n  package: {short_name: P, foo: 1}\n")],
            &GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(generation.summary().package_count, 1);
        assert_eq!(generation.warnings(), ["autosar.packages[0]: unknown key 'foo'"]);
        assert!(generation.xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    }

    #[test]
    fn test_negative_indent_reaches_serializer() {
        let options = GenerateOptions {
            indent: -2,
            ..Default::default()
        };
        assert!(matches!(
            generate_from_documents(&[doc("package: {short_name: P}")], &options),
            Err(ConfigError::NegativeIndent { indent: -2 })
        ));
    }
}
