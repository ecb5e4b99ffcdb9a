// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar coercion.
//!
//! These functions are the only place where loosely-typed YAML values turn into
//! typed data. Each one fails with a [`ConfigError`] naming the input location
//! instead of falling back to a silent default.

use crate::error::{ConfigError, Result};
use serde_yaml::Value;
use std::net::IpAddr;

/// Short name of the YAML type of `value`, used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Textual form of a scalar. Returns `None` for sequences, mappings and tagged values.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

/// Parse an integer, optionally bounded to `[minimum, maximum]`.
///
/// Accepts native integers and strings in decimal, `0x` hexadecimal or `0b`
/// binary notation. Underscores are digit-group separators. Booleans are
/// rejected even though YAML 1.1 readers would coerce them.
pub fn parse_int(
    value: Option<&Value>,
    path: &str,
    minimum: Option<i64>,
    maximum: Option<i64>,
) -> Result<i64> {
    let value = value.ok_or_else(|| ConfigError::Missing { path: path.into() })?;

    let parsed = match value {
        Value::Bool(_) => {
            return Err(ConfigError::WrongType {
                path: path.into(),
                expected: "integer (boolean is not a valid integer)",
                found: "boolean",
            })
        }
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(v), _) => v,
            (None, Some(_)) => {
                return Err(ConfigError::InvalidInteger {
                    path: path.into(),
                    text: n.to_string(),
                })
            }
            (None, None) => {
                return Err(ConfigError::WrongType {
                    path: path.into(),
                    expected: "integer-like value",
                    found: "float",
                })
            }
        },
        Value::String(s) => parse_int_literal(s, path)?,
        other => {
            return Err(ConfigError::WrongType {
                path: path.into(),
                expected: "integer-like value",
                found: type_name(other),
            })
        }
    };

    if let Some(minimum) = minimum {
        if parsed < minimum {
            return Err(ConfigError::BelowMinimum {
                path: path.into(),
                value: parsed,
                minimum,
            });
        }
    }
    if let Some(maximum) = maximum {
        if parsed > maximum {
            return Err(ConfigError::AboveMaximum {
                path: path.into(),
                value: parsed,
                maximum,
            });
        }
    }

    Ok(parsed)
}

fn parse_int_literal(raw: &str, path: &str) -> Result<i64> {
    let text = raw.trim().replace('_', "");
    let invalid = || ConfigError::InvalidInteger {
        path: path.into(),
        text: raw.trim().to_string(),
    };
    if text.is_empty() {
        return Err(invalid());
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text.as_str()),
    };

    let lower = unsigned.to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else {
        (lower.as_str(), 10)
    };

    // from_str_radix would accept a second sign after the prefix.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }

    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse a boolean. An absent or null value yields `default`.
pub fn parse_bool(value: Option<&Value>, path: &str, default: bool) -> Result<bool> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) if n.as_i64().is_some() || n.as_u64().is_some() => {
            Ok(n.as_i64() != Some(0))
        }
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBoolean { path: path.into() }),
        },
        Some(_) => Err(ConfigError::InvalidBoolean { path: path.into() }),
    }
}

/// Read a trimmed string.
///
/// Numbers and booleans are accepted and stringified. When `required` is set,
/// an absent value or one that trims to nothing fails; otherwise an absent
/// value yields an empty string.
pub fn parse_str(value: Option<&Value>, path: &str, required: bool) -> Result<String> {
    let value = match value {
        None | Some(Value::Null) if required => {
            return Err(ConfigError::Missing { path: path.into() })
        }
        None | Some(Value::Null) => return Ok(String::new()),
        Some(value) => value,
    };

    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Bool(_) | Value::Number(_) => scalar_text(value).unwrap_or_default(),
        other => {
            return Err(ConfigError::WrongType {
                path: path.into(),
                expected: "string",
                found: type_name(other),
            })
        }
    };

    if required && text.is_empty() {
        return Err(ConfigError::EmptyValue { path: path.into() });
    }
    Ok(text)
}

/// Read a required string, falling back to `default` when the key is absent.
pub fn parse_str_or(value: Option<&Value>, path: &str, default: &str) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(_) => parse_str(value, path, true),
    }
}

/// Validate an IPv4 address and return its canonical textual form.
pub fn parse_ipv4(value: Option<&Value>, path: &str) -> Result<String> {
    let text = parse_str(value, path, true)?;
    let ip: IpAddr = text.parse().map_err(|_| ConfigError::InvalidIpAddress {
        path: path.into(),
        text: text.clone(),
    })?;
    match ip {
        IpAddr::V4(v4) => Ok(v4.to_string()),
        IpAddr::V6(_) => Err(ConfigError::NotIpv4 {
            path: path.into(),
            text,
        }),
    }
}
