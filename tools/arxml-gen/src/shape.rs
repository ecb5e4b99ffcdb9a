// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural helpers: list and mapping normalization, unknown-key policy.

use crate::coerce::{scalar_text, type_name};
use crate::context::GenerationContext;
use crate::error::{ConfigError, Result};
use serde_yaml::{Mapping, Value};

/// Look up `key`, treating an explicit `null` like an absent key.
pub fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

/// Normalize "one item or a list of items" into an ordered list.
///
/// `null`/absent yields an empty list, a sequence passes through and a single
/// mapping becomes a one-element list.
pub fn listify<'a>(value: Option<&'a Value>, path: &str) -> Result<Vec<&'a Value>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => Ok(items.iter().collect()),
        Some(v @ Value::Mapping(_)) => Ok(vec![v]),
        Some(other) => Err(ConfigError::WrongType {
            path: path.into(),
            expected: "list or mapping",
            found: type_name(other),
        }),
    }
}

/// Concatenate the list forms of several keys of `map`, in key order.
///
/// Used for the singular/plural aliases (`package`/`packages`, ...). Each key
/// is reported under `<path>.<key>` on error.
pub fn listify_keys<'a>(map: &'a Mapping, keys: &[&str], path: &str) -> Result<Vec<&'a Value>> {
    let mut items = Vec::new();
    for key in keys {
        items.extend(listify(map.get(*key), &format!("{path}.{key}"))?);
    }
    Ok(items)
}

/// Require a mapping.
pub fn as_mapping<'a>(value: Option<&'a Value>, path: &str) -> Result<&'a Mapping> {
    match value {
        Some(Value::Mapping(map)) => Ok(map),
        None | Some(Value::Null) => Err(ConfigError::Missing { path: path.into() }),
        Some(other) => Err(ConfigError::WrongType {
            path: path.into(),
            expected: "mapping",
            found: type_name(other),
        }),
    }
}

/// Accept an optional mapping: absent or `null` yields `None`.
pub fn optional_mapping<'a>(value: Option<&'a Value>, path: &str) -> Result<Option<&'a Mapping>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_mapping(Some(v), path).map(Some),
    }
}

/// Textual form of a mapping key or attribute value.
pub fn key_text(key: &Value) -> String {
    scalar_text(key).unwrap_or_else(|| {
        serde_yaml::to_string(key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default()
    })
}

/// Report keys of `map` that are not in `known`, sorted.
///
/// In lenient mode each one becomes a warning in `ctx`; in strict mode the
/// first one aborts generation.
pub fn warn_unknown_keys(
    map: &Mapping,
    known: &[&str],
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<()> {
    let mut unknown: Vec<String> = map
        .keys()
        .map(key_text)
        .filter(|key| !known.contains(&key.as_str()))
        .collect();
    unknown.sort();
    unknown.dedup();

    for key in unknown {
        ctx.warn_or_fail(ConfigError::UnknownKey {
            path: path.into(),
            key,
        })?;
    }
    Ok(())
}
