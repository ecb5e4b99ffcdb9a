// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-run generation state.
//!
//! A [`GenerationContext`] is created fresh for every generation run and is
//! passed by `&mut` through every builder call. Nothing here is global.

use crate::error::{ConfigError, Result};

/// Number of elements built, per element kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub package_count: usize,
    pub communication_cluster_count: usize,
    pub connector_count: usize,
    pub provided_someip_count: usize,
    pub required_someip_count: usize,
    pub dds_binding_count: usize,
    pub zerocopy_binding_count: usize,
    pub custom_element_count: usize,
}

impl GenerationSummary {
    /// Human-readable label and count for every element kind, in report order.
    pub fn entries(&self) -> [(&'static str, usize); 8] {
        [
            ("packages", self.package_count),
            ("communication clusters", self.communication_cluster_count),
            ("ethernet connectors", self.connector_count),
            ("provided SOME/IP instances", self.provided_someip_count),
            ("required SOME/IP instances", self.required_someip_count),
            ("DDS bindings", self.dds_binding_count),
            ("ZeroCopy bindings", self.zerocopy_binding_count),
            ("custom elements", self.custom_element_count),
        ]
    }
}

/// Mutable state threaded through one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    /// Promote unknown-key warnings to errors.
    pub strict: bool,
    /// Permit the zero-copy and custom-element extension sections.
    pub allow_extensions: bool,
    /// Lenient-mode warnings, in the order they were raised.
    pub warnings: Vec<String>,
    pub summary: GenerationSummary,
}

impl GenerationContext {
    pub fn new(strict: bool, allow_extensions: bool) -> Self {
        Self {
            strict,
            allow_extensions,
            ..Default::default()
        }
    }

    /// Fail with `error` in strict mode, otherwise record it as a warning.
    pub fn warn_or_fail(&mut self, error: ConfigError) -> Result<()> {
        if self.strict {
            return Err(error);
        }
        let message = error.to_string();
        tracing::warn!("{message}");
        self.warnings.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(key: &str) -> ConfigError {
        ConfigError::UnknownKey {
            path: "autosar.packages[0]".into(),
            key: key.into(),
        }
    }

    #[test]
    fn test_lenient_records_warning() {
        let mut ctx = GenerationContext::new(false, false);
        ctx.warn_or_fail(unknown("foo")).expect("lenient");
        ctx.warn_or_fail(unknown("bar")).expect("lenient");
        assert_eq!(
            ctx.warnings,
            vec![
                "autosar.packages[0]: unknown key 'foo'".to_string(),
                "autosar.packages[0]: unknown key 'bar'".to_string(),
            ]
        );
    }

    #[test]
    fn test_strict_fails_without_recording() {
        let mut ctx = GenerationContext::new(true, false);
        assert!(ctx.warn_or_fail(unknown("foo")).is_err());
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_summary_entries_follow_fields() {
        let summary = GenerationSummary {
            provided_someip_count: 3,
            ..Default::default()
        };
        let entries = summary.entries();
        assert_eq!(entries[0], ("packages", 0));
        assert_eq!(entries[3], ("provided SOME/IP instances", 3));
    }
}
