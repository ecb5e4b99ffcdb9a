// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator errors.
//!
//! Every failure of the generation pipeline is a [`ConfigError`]. Variants that
//! concern a location inside the input carry the breadcrumb of that location
//! (for example `autosar.packages[2].someip.provided_service_instances[0].service_instance_id`)
//! and render as `"<breadcrumb>: <reason>"`.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the generator.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Configuration errors. Any of them aborts the whole generation run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: value is required")]
    Missing { path: String },

    #[error("{path}: value must not be empty")]
    EmptyValue { path: String },

    #[error("{path}: expected {expected}, got {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: invalid integer literal '{text}'")]
    InvalidInteger { path: String, text: String },

    #[error("{path}: value {value} is smaller than minimum {minimum}")]
    BelowMinimum {
        path: String,
        value: i64,
        minimum: i64,
    },

    #[error("{path}: value {value} is larger than maximum {maximum}")]
    AboveMaximum {
        path: String,
        value: i64,
        maximum: i64,
    },

    #[error("{path}: expected boolean-like value (true/false/1/0/yes/no/on/off)")]
    InvalidBoolean { path: String },

    #[error("{path}: invalid IP address '{text}'")]
    InvalidIpAddress { path: String, text: String },

    #[error("{path}: expected IPv4 address, got '{text}'")]
    NotIpv4 { path: String, text: String },

    #[error("{path}: expected 'udp' or 'tcp', got '{transport}'")]
    InvalidTransport { path: String, transport: String },

    #[error("{path}: '{tag}' is not a valid element name")]
    InvalidTag { path: String, tag: String },

    #[error("{path}: unknown key '{key}'")]
    UnknownKey { path: String, key: String },

    #[error(
        "{path}: non-standard extension sections detected (zerocopy / custom_elements). \
         For AUTOSAR-standard-only output, remove them. \
         If you intentionally need project-specific extensions, run with --allow-extensions."
    )]
    ExtensionNotAllowed { path: String },

    #[error("{path}: at least one {what} is required")]
    EmptyCollection { path: String, what: &'static str },

    #[error("at least one input YAML file is required")]
    NoInputs,

    #[error("failed to read input file '{}': {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("input file '{}' is empty", path.display())]
    EmptyDocument { path: PathBuf },

    #[error("root of YAML file '{}' must be a mapping", path.display())]
    NotMapping { path: PathBuf },

    #[error("output file already exists: {}. Use --overwrite to replace it.", path.display())]
    OutputExists { path: PathBuf },

    #[error("failed to write output file '{}': {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("indent must be zero or positive, got {indent}")]
    NegativeIndent { indent: i64 },

    #[error("failed to render XML: {0}")]
    Xml(String),
}

impl ConfigError {
    /// Breadcrumb of the offending input location, when the error has one.
    pub fn breadcrumb(&self) -> Option<&str> {
        match self {
            Self::Missing { path }
            | Self::EmptyValue { path }
            | Self::WrongType { path, .. }
            | Self::InvalidInteger { path, .. }
            | Self::BelowMinimum { path, .. }
            | Self::AboveMaximum { path, .. }
            | Self::InvalidBoolean { path }
            | Self::InvalidIpAddress { path, .. }
            | Self::NotIpv4 { path, .. }
            | Self::InvalidTransport { path, .. }
            | Self::InvalidTag { path, .. }
            | Self::UnknownKey { path, .. }
            | Self::ExtensionNotAllowed { path }
            | Self::EmptyCollection { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_breadcrumb() {
        let err = ConfigError::AboveMaximum {
            path: "autosar.packages[0].someip.provided_service_instances[0].service_interface_id"
                .into(),
            value: 0x10000,
            maximum: 0xFFFF,
        };
        assert_eq!(
            err.to_string(),
            "autosar.packages[0].someip.provided_service_instances[0].service_interface_id: \
             value 65536 is larger than maximum 65535"
        );
        assert!(err.breadcrumb().is_some());
    }

    #[test]
    fn test_file_errors_have_no_breadcrumb() {
        let err = ConfigError::EmptyDocument {
            path: PathBuf::from("in.yaml"),
        };
        assert_eq!(err.to_string(), "input file 'in.yaml' is empty");
        assert!(err.breadcrumb().is_none());
        assert!(ConfigError::NegativeIndent { indent: -1 }
            .breadcrumb()
            .is_none());
    }
}
