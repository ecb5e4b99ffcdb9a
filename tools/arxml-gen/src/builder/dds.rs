// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DDS binding with its provided and required topics.

use crate::coerce::{parse_int, parse_str, parse_str_or};
use crate::context::GenerationContext;
use crate::error::Result;
use crate::shape::{as_mapping, field, listify_keys, optional_mapping, warn_unknown_keys};
use crate::tree::ElementNode;
use serde_yaml::Value;

const TOPIC_KEYS: &[&str] = &["short_name", "topic_name", "type_name", "qos_profile", "domain_id"];

#[derive(Debug, Clone, Copy)]
enum Direction {
    Provided,
    Required,
}

impl Direction {
    fn keys(self) -> [&'static str; 2] {
        match self {
            Self::Provided => ["provided_topics", "publish_topics"],
            Self::Required => ["required_topics", "subscribe_topics"],
        }
    }

    fn container(self) -> &'static str {
        match self {
            Self::Provided => "PROVIDED-TOPICS",
            Self::Required => "REQUIRED-TOPICS",
        }
    }

    fn element(self) -> &'static str {
        match self {
            Self::Provided => "DDS-PROVIDED-TOPIC",
            Self::Required => "DDS-REQUIRED-TOPIC",
        }
    }

    fn default_name(self, index: usize) -> String {
        match self {
            Self::Provided => format!("ProvidedTopic{}", index + 1),
            Self::Required => format!("RequiredTopic{}", index + 1),
        }
    }
}

/// Build a `DDS-BINDING`, or nothing when the section is absent or empty.
pub fn build_dds_binding(
    dds: Option<&Value>,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<Option<ElementNode>> {
    let Some(map) = optional_mapping(dds, path)? else {
        return Ok(None);
    };
    if map.is_empty() {
        return Ok(None);
    }
    warn_unknown_keys(
        map,
        &[
            "short_name",
            "domain_id",
            "provided_topics",
            "publish_topics",
            "required_topics",
            "subscribe_topics",
        ],
        path,
        ctx,
    )?;

    let mut binding = ElementNode::new("DDS-BINDING");
    let short_name = parse_str_or(field(map, "short_name"), &format!("{path}.short_name"), "DdsBinding")?;
    binding.push_text("SHORT-NAME", &short_name);
    let domain_id = match field(map, "domain_id") {
        Some(v) => parse_int(Some(v), &format!("{path}.domain_id"), Some(0), None)?,
        None => 0,
    };
    binding.push_text("DOMAIN-ID", domain_id);

    for direction in [Direction::Provided, Direction::Required] {
        let topics = listify_keys(map, &direction.keys(), path)?;
        if topics.is_empty() {
            continue;
        }

        let mut container = ElementNode::new(direction.container());
        for (idx, topic) in topics.into_iter().enumerate() {
            let topic_path = format!("{path}.{}[{idx}]", direction.keys()[0]);
            container.push(build_topic(topic, direction, idx, &topic_path, ctx)?);
        }
        binding.push(container);
    }

    tracing::debug!(short_name = %short_name, domain_id, "built DDS binding");
    ctx.summary.dds_binding_count += 1;
    Ok(Some(binding))
}

fn build_topic(
    topic: &Value,
    direction: Direction,
    index: usize,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(topic), path)?;
    warn_unknown_keys(map, TOPIC_KEYS, path, ctx)?;

    let mut element = ElementNode::new(direction.element());
    element.push_text(
        "SHORT-NAME",
        parse_str_or(
            field(map, "short_name"),
            &format!("{path}.short_name"),
            &direction.default_name(index),
        )?,
    );
    element.push_text(
        "TOPIC-NAME",
        parse_str(field(map, "topic_name"), &format!("{path}.topic_name"), true)?,
    );
    element.push_text(
        "TYPE-NAME",
        parse_str(field(map, "type_name"), &format!("{path}.type_name"), true)?,
    );

    if let Some(domain) = field(map, "domain_id") {
        element.push_text(
            "DOMAIN-ID",
            parse_int(Some(domain), &format!("{path}.domain_id"), Some(0), None)?,
        );
    }
    if let Some(qos) = field(map, "qos_profile") {
        element.push_text(
            "QOS-PROFILE",
            parse_str(Some(qos), &format!("{path}.qos_profile"), true)?,
        );
    }

    Ok(element)
}
