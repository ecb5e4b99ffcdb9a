// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SOME/IP binding constants from a generated ARXML document.
//!
//! Reads one provided service instance (and one of its event groups) back out
//! of an ARXML file and renders them as a C++ header of `constexpr` constants
//! for ara::com bindings. Element lookup ignores XML namespaces.

use roxmltree::{Document, Node};
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;

/// Default C++ namespace of the generated constants.
pub const DEFAULT_NAMESPACE: &str = "sample::vehicle_status::generated";

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("failed to parse ARXML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    #[error("Tag has empty value: {0}")]
    EmptyTag(&'static str),

    #[error("Invalid integer in {field}: {text}")]
    InvalidInteger { field: &'static str, text: String },

    #[error("No PROVIDED-SOMEIP-SERVICE-INSTANCE found in ARXML.")]
    NoServiceInstance,

    #[error("Could not find PROVIDED-SOMEIP-SERVICE-INSTANCE with SHORT-NAME='{0}'.")]
    ServiceInstanceNotFound(String),

    #[error("No SOMEIP-PROVIDED-EVENT-GROUP found under PROVIDED-EVENT-GROUPS.")]
    NoEventGroup,

    #[error("Could not find SOMEIP-PROVIDED-EVENT-GROUP with SHORT-NAME='{0}'.")]
    EventGroupNotFound(String),

    #[error("Namespace must not be empty.")]
    EmptyNamespace,
}

/// Identifiers of one provided SOME/IP service instance and event group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeIpBinding {
    pub provided_service_short_name: String,
    pub provided_event_group_short_name: String,
    pub service_interface_id: u64,
    pub service_instance_id: u64,
    pub major_version: u64,
    pub minor_version: u64,
    pub event_group_id: u64,
    pub event_id: u64,
}

fn is_element(node: &Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, tag))
}

fn optional_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn required_text<'a>(node: Node<'a, '_>, tag: &'static str) -> Result<&'a str, BindingError> {
    let text = child(node, tag)
        .and_then(|n| n.text())
        .ok_or(BindingError::MissingTag(tag))?
        .trim();
    if text.is_empty() {
        return Err(BindingError::EmptyTag(tag));
    }
    Ok(text)
}

/// Parse an integer literal in decimal or `0x`/`0o`/`0b` notation.
fn parse_literal(text: &str) -> Option<u64> {
    let text = text.trim().strip_prefix('+').unwrap_or(text.trim());
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = match lower.get(..2) {
        Some("0x") => (&lower[2..], 16),
        Some("0o") => (&lower[2..], 8),
        Some("0b") => (&lower[2..], 2),
        _ => (lower.as_str(), 10),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    // Decimal literals other than zero may not carry leading zeros.
    if radix == 10 && digits.len() > 1 && digits.starts_with('0') && !digits.trim_start_matches(['0', '_']).is_empty() {
        return None;
    }
    u64::from_str_radix(&digits.replace('_', ""), radix).ok()
}

fn integer(node: Node, tag: &'static str) -> Result<u64, BindingError> {
    let text = required_text(node, tag)?;
    parse_literal(text).ok_or_else(|| BindingError::InvalidInteger {
        field: tag,
        text: text.to_string(),
    })
}

/// Select a node by `SHORT-NAME`, or the first one when no name is given.
fn select<'a, 'input>(
    mut candidates: impl Iterator<Item = Node<'a, 'input>>,
    short_name: Option<&str>,
) -> Option<Node<'a, 'input>> {
    match short_name {
        None => candidates.next(),
        Some(name) => candidates.find(|n| optional_text(*n, "SHORT-NAME") == Some(name)),
    }
}

/// Extract the binding of a provided service instance from ARXML text.
///
/// The first `PROVIDED-SOMEIP-SERVICE-INSTANCE` (or the one whose `SHORT-NAME`
/// matches `service_short_name`) is used, together with its first (or named)
/// `SOMEIP-PROVIDED-EVENT-GROUP`.
pub fn extract_someip_binding(
    xml: &str,
    service_short_name: Option<&str>,
    event_group_short_name: Option<&str>,
) -> Result<SomeIpBinding, BindingError> {
    let doc = Document::parse(xml)?;

    let mut instances = doc
        .descendants()
        .filter(|n| is_element(n, "PROVIDED-SOMEIP-SERVICE-INSTANCE"))
        .peekable();
    if instances.peek().is_none() {
        return Err(BindingError::NoServiceInstance);
    }
    let instance = select(instances, service_short_name).ok_or_else(|| {
        BindingError::ServiceInstanceNotFound(service_short_name.unwrap_or_default().to_string())
    })?;

    let provided_service_short_name = required_text(instance, "SHORT-NAME")?.to_string();
    let deployment = child(instance, "SERVICE-INTERFACE-DEPLOYMENT")
        .ok_or(BindingError::MissingTag("SERVICE-INTERFACE-DEPLOYMENT"))?;
    let version = child(deployment, "SERVICE-INTERFACE-VERSION")
        .ok_or(BindingError::MissingTag("SERVICE-INTERFACE-VERSION"))?;

    let service_interface_id = integer(deployment, "SERVICE-INTERFACE-ID")?;
    let major_version = integer(version, "MAJOR-VERSION")?;
    let minor_version = integer(version, "MINOR-VERSION")?;
    let service_instance_id = integer(instance, "SERVICE-INSTANCE-ID")?;

    let mut groups = child(instance, "PROVIDED-EVENT-GROUPS")
        .into_iter()
        .flat_map(|n| n.children())
        .filter(|n| is_element(n, "SOMEIP-PROVIDED-EVENT-GROUP"))
        .peekable();
    if groups.peek().is_none() {
        return Err(BindingError::NoEventGroup);
    }
    let group = select(groups, event_group_short_name).ok_or_else(|| {
        BindingError::EventGroupNotFound(event_group_short_name.unwrap_or_default().to_string())
    })?;

    Ok(SomeIpBinding {
        provided_service_short_name,
        provided_event_group_short_name: required_text(group, "SHORT-NAME")?.to_string(),
        service_interface_id,
        service_instance_id,
        major_version,
        minor_version,
        event_group_id: integer(group, "EVENT-GROUP-ID")?,
        event_id: integer(group, "EVENT-ID")?,
    })
}

/// Include guard for a header written to `output`.
pub fn header_guard(output: &Path) -> String {
    let guard: String = output
        .to_string_lossy()
        .to_uppercase()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '.' | '-' | ' ' | ':' => '_',
            other => other,
        })
        .collect();
    format!("GEN_{guard}_INCLUDED")
}

fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the C++ constants header for `binding`.
pub fn render_header(
    binding: &SomeIpBinding,
    output: &Path,
    namespace: &str,
) -> Result<String, BindingError> {
    let parts: Vec<&str> = namespace
        .split("::")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(BindingError::EmptyNamespace);
    }

    let guard = header_guard(output);
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(out, "#define {guard}");
    out.push('\n');
    out.push_str("#include <cstdint>\n\n");
    out.push_str("// Auto-generated from ARXML. Do not edit manually.\n");
    for part in &parts {
        let _ = writeln!(out, "namespace {part} {{");
    }
    let _ = writeln!(out, "constexpr std::uint16_t kServiceId{{0x{:04X}U}};", binding.service_interface_id);
    let _ = writeln!(out, "constexpr std::uint16_t kInstanceId{{0x{:04X}U}};", binding.service_instance_id);
    let _ = writeln!(out, "constexpr std::uint16_t kStatusEventId{{0x{:04X}U}};", binding.event_id);
    let _ = writeln!(out, "constexpr std::uint16_t kStatusEventGroupId{{0x{:04X}U}};", binding.event_group_id);
    let _ = writeln!(out, "constexpr std::uint8_t kMajorVersion{{0x{:02X}U}};", binding.major_version);
    let _ = writeln!(out, "constexpr std::uint8_t kMinorVersion{{0x{:02X}U}};", binding.minor_version);
    let _ = writeln!(
        out,
        "constexpr const char *kProvidedServiceShortName{{\"{}\"}};",
        escape_literal(&binding.provided_service_short_name)
    );
    let _ = writeln!(
        out,
        "constexpr const char *kProvidedEventGroupShortName{{\"{}\"}};",
        escape_literal(&binding.provided_event_group_short_name)
    );
    for _ in &parts {
        out.push_str("}\n");
    }
    out.push_str("\n#endif\n");
    Ok(out)
}
