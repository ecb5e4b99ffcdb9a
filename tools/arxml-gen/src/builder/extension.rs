// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Non-standard extension sections: zero-copy bindings and custom elements.
//!
//! Both are only built when the run allows extensions; the package builder
//! enforces that gate before calling in here.

use super::hex16;
use crate::coerce::{parse_bool, parse_int, parse_str, parse_str_or};
use crate::context::GenerationContext;
use crate::error::{ConfigError, Result};
use crate::shape::{as_mapping, field, key_text, listify, listify_keys, optional_mapping, warn_unknown_keys};
use crate::tree::ElementNode;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;

const DEFAULT_QUEUE_DEPTH: i64 = 16;
const DEFAULT_MAX_SAMPLE_SIZE: i64 = 1024;

const CHANNEL_KEYS: &[&str] = &[
    "short_name",
    "service_id",
    "instance_id",
    "event_id",
    "publisher_history",
    "subscriber_queue",
    "max_sample_size",
    "max_publishers",
    "max_subscribers",
];

/// Build an `EXT-ZEROCOPY-BINDING`, or nothing when the section is absent or empty.
pub fn build_zerocopy_binding(
    zerocopy: Option<&Value>,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<Option<ElementNode>> {
    let Some(map) = optional_mapping(zerocopy, path)? else {
        return Ok(None);
    };
    if map.is_empty() {
        return Ok(None);
    }
    warn_unknown_keys(
        map,
        &["short_name", "runtime", "enabled", "service_channels", "service_instances"],
        path,
        ctx,
    )?;

    let mut binding = ElementNode::new("EXT-ZEROCOPY-BINDING");
    let short_name = parse_str_or(
        field(map, "short_name"),
        &format!("{path}.short_name"),
        "ZeroCopyBinding",
    )?;
    binding.push_text("SHORT-NAME", &short_name);
    binding.push_text(
        "RUNTIME",
        parse_str_or(field(map, "runtime"), &format!("{path}.runtime"), "iceoryx")?,
    );
    binding.push_text(
        "ENABLED",
        parse_bool(field(map, "enabled"), &format!("{path}.enabled"), true)?,
    );

    let channels = listify_keys(map, &["service_channels", "service_instances"], path)?;
    if !channels.is_empty() {
        let mut container = ElementNode::new("SERVICE-CHANNELS");
        for (idx, channel) in channels.into_iter().enumerate() {
            let channel_path = format!("{path}.service_channels[{idx}]");
            container.push(build_channel(channel, idx, &channel_path, ctx)?);
        }
        binding.push(container);
    }

    tracing::debug!(short_name = %short_name, "built zero-copy binding");
    ctx.summary.zerocopy_binding_count += 1;
    Ok(Some(binding))
}

fn build_channel(
    channel: &Value,
    index: usize,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(channel), path)?;
    warn_unknown_keys(map, CHANNEL_KEYS, path, ctx)?;

    let mut element = ElementNode::new("EXT-ZEROCOPY-SERVICE-CHANNEL");
    element.push_text(
        "SHORT-NAME",
        parse_str_or(
            field(map, "short_name"),
            &format!("{path}.short_name"),
            &format!("ZeroCopyChannel{}", index + 1),
        )?,
    );

    for (key, tag) in [
        ("service_id", "SERVICE-ID"),
        ("instance_id", "INSTANCE-ID"),
        ("event_id", "EVENT-ID"),
    ] {
        let id = parse_int(field(map, key), &format!("{path}.{key}"), Some(0), Some(0xFFFF))?;
        element.push_text(tag, hex16(id));
    }

    for (key, tag, default) in [
        ("publisher_history", "PUBLISHER-HISTORY", DEFAULT_QUEUE_DEPTH),
        ("subscriber_queue", "SUBSCRIBER-QUEUE", DEFAULT_QUEUE_DEPTH),
        ("max_sample_size", "MAX-SAMPLE-SIZE", DEFAULT_MAX_SAMPLE_SIZE),
    ] {
        let value = match field(map, key) {
            Some(v) => parse_int(Some(v), &format!("{path}.{key}"), Some(1), None)?,
            None => default,
        };
        element.push_text(tag, value);
    }

    for (key, tag) in [
        ("max_publishers", "MAX-PUBLISHERS"),
        ("max_subscribers", "MAX-SUBSCRIBERS"),
    ] {
        if let Some(v) = field(map, key) {
            element.push_text(tag, parse_int(Some(v), &format!("{path}.{key}"), Some(1), None)?);
        }
    }

    Ok(element)
}

fn xml_name() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| {
        Regex::new(r"^[\p{L}_:][\p{L}\p{N}_.:\-]*$").expect("element name pattern is valid")
    })
}

fn check_name(name: &str, path: &str) -> Result<()> {
    if xml_name().is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTag {
            path: path.into(),
            tag: name.into(),
        })
    }
}

fn build_attributes(map: &Mapping, node: &mut ElementNode, path: &str) -> Result<()> {
    let Some(attributes) = optional_mapping(map.get("attributes"), path)? else {
        return Ok(());
    };
    for (name, value) in attributes {
        let name = key_text(name);
        check_name(&name, path)?;
        let value = match value {
            Value::Null => String::new(),
            other => key_text(other),
        };
        node.set_attribute(name, value);
    }
    Ok(())
}

/// Build one custom element and, depth-first in input order, its children.
///
/// Each node built counts once toward the custom element summary.
pub fn build_custom_element(
    spec: &Value,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(spec), path)?;
    warn_unknown_keys(
        map,
        &["tag", "attributes", "text", "short_name", "children"],
        path,
        ctx,
    )?;

    let tag_path = format!("{path}.tag");
    let tag = parse_str(field(map, "tag"), &tag_path, true)?;
    check_name(&tag, &tag_path)?;

    let mut element = ElementNode::new(tag);
    build_attributes(map, &mut element, &format!("{path}.attributes"))?;

    if let Some(short_name) = field(map, "short_name") {
        element.push_text(
            "SHORT-NAME",
            parse_str(Some(short_name), &format!("{path}.short_name"), true)?,
        );
    }
    if let Some(text) = field(map, "text") {
        element.set_text(key_text(text));
    }

    let children = listify(map.get("children"), &format!("{path}.children"))?;
    for (idx, child) in children.into_iter().enumerate() {
        let child_path = format!("{path}.children[{idx}]");
        element.push(build_custom_element(child, &child_path, ctx)?);
    }

    ctx.summary.custom_element_count += 1;
    Ok(element)
}
