// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Input document loading, variable substitution and merging.
//!
//! # Example input
//!
//! ```yaml
//! variables:
//!   service_id: "0x1234"
//! autosar:
//!   schema_namespace: http://autosar.org/schema/r4.0
//!   packages:
//!     - short_name: VehicleStatus
//!       someip:
//!         provided_service_instances:
//!           - short_name: StatusProvider
//!             service_interface_id: ${service_id}
//!             service_instance_id: 1
//! ```
//!
//! Every string is expanded in two passes: operating-system environment
//! references first, then `$name`/`${name}` placeholders from the union of
//! all documents' `variables` sections. Unresolved placeholders are left
//! verbatim.

use crate::coerce::parse_str;
use crate::context::GenerationContext;
use crate::error::{ConfigError, Result};
use crate::shape::{as_mapping, field, key_text, listify_keys, optional_mapping, warn_unknown_keys};
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_SCHEMA_NAMESPACE: &str = "http://autosar.org/schema/r4.0";
pub const DEFAULT_SCHEMA_LOCATION: &str = "http://autosar.org/schema/r4.0 autosar_00050.xsd";

/// One parsed input file. Its root is always a mapping.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub origin: PathBuf,
    pub root: Mapping,
}

impl RawDocument {
    /// Read and parse a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse YAML text; `origin` names the source in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(ConfigError::EmptyDocument {
                path: origin.to_path_buf(),
            });
        }

        let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        match value {
            Value::Mapping(root) => Ok(Self {
                origin: origin.to_path_buf(),
                root,
            }),
            Value::Null => Err(ConfigError::EmptyDocument {
                path: origin.to_path_buf(),
            }),
            _ => Err(ConfigError::NotMapping {
                path: origin.to_path_buf(),
            }),
        }
    }
}

/// Named substitution values collected from every document's `variables`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
            .expect("placeholder pattern is a valid regex")
    })
}

fn environment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(\w+|\{([^}]*)\})").expect("environment pattern is a valid regex")
    })
}

/// Value of an environment variable, if `name` is a name the environment can hold.
fn environment_value(name: &str) -> Option<String> {
    if name.is_empty() || name.contains(|c: char| c == '=' || c == '\0') {
        return None;
    }
    std::env::var(name).ok()
}

/// Replace `$NAME` and `${NAME}` with environment values; anything else is kept.
fn expand_environment(text: &str) -> String {
    environment_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = caps.get(2).or_else(|| caps.get(1)).map_or("", |m| m.as_str());
            environment_value(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

impl VariableTable {
    /// Union of the `variables` sections, later documents overriding earlier ones.
    pub fn collect(documents: &[RawDocument]) -> Result<Self> {
        let mut values = HashMap::new();
        for (idx, doc) in documents.iter().enumerate() {
            let path = format!("document[{idx}].variables");
            let Some(vars) = optional_mapping(doc.root.get("variables"), &path)? else {
                continue;
            };
            for (key, value) in vars {
                values.insert(key_text(key), key_text(value));
            }
        }
        tracing::debug!(count = values.len(), "collected substitution variables");
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Expand environment references, then named placeholders.
    pub fn expand(&self, text: &str) -> String {
        let env_expanded = expand_environment(text);

        placeholder_pattern()
            .replace_all(&env_expanded, |caps: &Captures<'_>| {
                if caps.get(1).is_some() {
                    return "$".to_string();
                }
                let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match self.get(name) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Substitute every string scalar of `value`. Mapping keys are left as-is.
    pub fn substitute(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.expand(s)),
            Value::Sequence(items) => {
                Value::Sequence(items.iter().map(|v| self.substitute(v)).collect())
            }
            Value::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.substitute(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => {
                let mut tagged = tagged.clone();
                tagged.value = self.substitute(&tagged.value);
                Value::Tagged(tagged)
            }
            other => other.clone(),
        }
    }
}

/// The single logical configuration built from all input documents.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub schema_namespace: String,
    pub schema_location: String,
    /// Package entries in input order; still untyped, the builders validate them.
    pub packages: Vec<Value>,
}

const AUTOSAR_KEYS: &[&str] = &["schema_namespace", "schema_location", "packages", "package"];

impl MergedConfig {
    /// Substitute variables in every document and merge their `autosar` sections.
    ///
    /// The last non-empty schema namespace/location wins. Packages are
    /// concatenated in input order; every document must contribute at least one.
    pub fn merge(documents: &[RawDocument]) -> Result<Self> {
        let variables = VariableTable::collect(documents)?;

        let mut merged = Self {
            schema_namespace: DEFAULT_SCHEMA_NAMESPACE.to_string(),
            schema_location: DEFAULT_SCHEMA_LOCATION.to_string(),
            packages: Vec::new(),
        };

        for (idx, doc) in documents.iter().enumerate() {
            let path = format!("document[{idx}]");
            let substituted = variables.substitute(&Value::Mapping(doc.root.clone()));
            let root = as_mapping(Some(&substituted), &path)?;

            let autosar = match root.get("autosar") {
                Some(section) => as_mapping(Some(section), &format!("{path}.autosar"))?,
                None => root,
            };

            if let Some(ns) = field(autosar, "schema_namespace") {
                let ns = parse_str(Some(ns), &format!("{path}.schema_namespace"), false)?;
                if !ns.is_empty() {
                    merged.schema_namespace = ns;
                }
            }
            if let Some(loc) = field(autosar, "schema_location") {
                let loc = parse_str(Some(loc), &format!("{path}.schema_location"), false)?;
                if !loc.is_empty() {
                    merged.schema_location = loc;
                }
            }

            let packages = listify_keys(autosar, &["packages", "package"], &path)?;
            if packages.is_empty() {
                return Err(ConfigError::EmptyCollection {
                    path: format!("{path} ({})", doc.origin.display()),
                    what: "package ('autosar.packages' or 'autosar.package')",
                });
            }

            tracing::debug!(
                document = %doc.origin.display(),
                packages = packages.len(),
                "merged document"
            );
            merged.packages.extend(packages.into_iter().cloned());
        }

        if merged.packages.is_empty() {
            return Err(ConfigError::EmptyCollection {
                path: "autosar.packages".into(),
                what: "package",
            });
        }

        Ok(merged)
    }

    /// Build a merged configuration from an in-memory `autosar` mapping.
    ///
    /// This is the library entry point for callers that assemble the
    /// configuration themselves instead of reading YAML files. No variable
    /// substitution happens here. Top-level keys are checked against the known
    /// set; namespace and location fall back to the AUTOSAR R4.0 defaults.
    pub fn from_autosar(value: &Value, ctx: &mut GenerationContext) -> Result<Self> {
        let autosar = as_mapping(Some(value), "autosar")?;
        warn_unknown_keys(autosar, AUTOSAR_KEYS, "autosar", ctx)?;

        let schema_namespace = match field(autosar, "schema_namespace") {
            Some(v) => parse_str(Some(v), "autosar.schema_namespace", true)?,
            None => DEFAULT_SCHEMA_NAMESPACE.to_string(),
        };
        let schema_location = match field(autosar, "schema_location") {
            Some(v) => parse_str(Some(v), "autosar.schema_location", true)?,
            None => DEFAULT_SCHEMA_LOCATION.to_string(),
        };

        let packages = listify_keys(autosar, &["packages", "package"], "autosar")?
            .into_iter()
            .cloned()
            .collect();

        Ok(Self {
            schema_namespace,
            schema_location,
            packages,
        })
    }
}
