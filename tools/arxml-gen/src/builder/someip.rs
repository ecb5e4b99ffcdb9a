// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Provided and required SOME/IP service instances.

use super::hex16;
use crate::coerce::{parse_int, parse_ipv4, parse_str};
use crate::context::GenerationContext;
use crate::error::{ConfigError, Result};
use crate::shape::{as_mapping, field, listify, listify_keys, optional_mapping, warn_unknown_keys};
use crate::tree::ElementNode;
use serde_yaml::{Mapping, Value};

const U16_MAX: i64 = 0xFFFF;
const U8_MAX: i64 = 0xFF;
const U32_MAX: i64 = 0xFFFF_FFFF;

const DEFAULT_INITIAL_DELAY_MIN: i64 = 20;
const DEFAULT_INITIAL_DELAY_MAX: i64 = 200;

/// Service interface identity shared by provided and required instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InterfaceDeployment {
    id: i64,
    major: i64,
    minor: i64,
}

impl InterfaceDeployment {
    /// Resolve the identity field by field: a flat `service_interface_id`,
    /// `major_version` or `minor_version` key wins over the matching `id`,
    /// `major` or `minor` key of a nested `service_interface` mapping.
    fn parse(instance: &Mapping, path: &str) -> Result<Self> {
        let nested = optional_mapping(
            instance.get("service_interface"),
            &format!("{path}.service_interface"),
        )?;
        let pick = |flat: &str, nested_key: &str| {
            field(instance, flat).or_else(|| nested.and_then(|n| field(n, nested_key)))
        };

        let id_path = format!("{path}.service_interface_id");
        let id = match pick("service_interface_id", "id") {
            Some(v) => parse_int(Some(v), &id_path, Some(0), Some(U16_MAX))?,
            None => return Err(ConfigError::Missing { path: id_path }),
        };
        let major = match pick("major_version", "major") {
            Some(v) => parse_int(Some(v), &format!("{path}.major_version"), Some(0), Some(U8_MAX))?,
            None => 1,
        };
        let minor = match pick("minor_version", "minor") {
            Some(v) => parse_int(Some(v), &format!("{path}.minor_version"), Some(0), Some(U32_MAX))?,
            None => 0,
        };

        Ok(Self { id, major, minor })
    }

    fn to_element(self) -> ElementNode {
        let mut version = ElementNode::new("SERVICE-INTERFACE-VERSION");
        version.push_text("MAJOR-VERSION", self.major);
        version.push_text("MINOR-VERSION", self.minor);

        let mut deployment = ElementNode::new("SERVICE-INTERFACE-DEPLOYMENT");
        deployment.push_text("SERVICE-INTERFACE-ID", hex16(self.id));
        deployment.push(version);
        deployment
    }
}

fn parse_u16(map: &Mapping, key: &str, path: &str) -> Result<i64> {
    parse_int(field(map, key), &format!("{path}.{key}"), Some(0), Some(U16_MAX))
}

/// Service discovery timing shared by server and client configs.
fn sd_timing(
    config: Option<&Value>,
    path: &str,
    container: &str,
    behavior: &str,
    ctx: &mut GenerationContext,
) -> Result<Option<ElementNode>> {
    let Some(config) = optional_mapping(config, path)? else {
        return Ok(None);
    };
    if config.is_empty() {
        return Ok(None);
    }
    warn_unknown_keys(config, &["initial_delay_min", "initial_delay_max"], path, ctx)?;

    let delay = |key: &str, default: i64| -> Result<i64> {
        match field(config, key) {
            Some(v) => parse_int(Some(v), &format!("{path}.{key}"), Some(0), None),
            None => Ok(default),
        }
    };

    let mut behavior_node = ElementNode::new(behavior);
    behavior_node.push_text(
        "INITIAL-DELAY-MIN-VALUE",
        delay("initial_delay_min", DEFAULT_INITIAL_DELAY_MIN)?,
    );
    behavior_node.push_text(
        "INITIAL-DELAY-MAX-VALUE",
        delay("initial_delay_max", DEFAULT_INITIAL_DELAY_MAX)?,
    );

    let mut container_node = ElementNode::new(container);
    container_node.push(behavior_node);
    Ok(Some(container_node))
}

const PROVIDED_KEYS: &[&str] = &[
    "short_name",
    "service_interface",
    "service_interface_id",
    "major_version",
    "minor_version",
    "service_instance_id",
    "event_groups",
    "sd_server",
];

/// Build a `PROVIDED-SOMEIP-SERVICE-INSTANCE`.
pub fn build_provided_instance(
    instance: &Value,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(instance), path)?;
    warn_unknown_keys(map, PROVIDED_KEYS, path, ctx)?;

    let short_name = parse_str(field(map, "short_name"), &format!("{path}.short_name"), true)?;
    let deployment = InterfaceDeployment::parse(map, path)?;

    let mut element = ElementNode::new("PROVIDED-SOMEIP-SERVICE-INSTANCE");
    element.push_text("SHORT-NAME", &short_name);
    element.push(deployment.to_element());

    let groups = listify(map.get("event_groups"), &format!("{path}.event_groups"))?;
    if !groups.is_empty() {
        let mut groups_node = ElementNode::new("PROVIDED-EVENT-GROUPS");
        for (idx, group) in groups.into_iter().enumerate() {
            let group_path = format!("{path}.event_groups[{idx}]");
            groups_node.push(build_provided_event_group(group, &group_path, ctx)?);
        }
        element.push(groups_node);
    }

    if let Some(sd) = sd_timing(
        map.get("sd_server"),
        &format!("{path}.sd_server"),
        "SD-SERVER-CONFIG",
        "INITIAL-OFFER-BEHAVIOR",
        ctx,
    )? {
        element.push(sd);
    }

    element.push_text(
        "SERVICE-INSTANCE-ID",
        hex16(parse_u16(map, "service_instance_id", path)?),
    );

    tracing::debug!(short_name = %short_name, "built provided SOME/IP instance");
    ctx.summary.provided_someip_count += 1;
    Ok(element)
}

fn build_provided_event_group(
    group: &Value,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(group), path)?;
    warn_unknown_keys(
        map,
        &[
            "short_name",
            "event_group_id",
            "event_id",
            "multicast_udp_port",
            "ipv4_multicast_ip_address",
        ],
        path,
        ctx,
    )?;

    let mut element = ElementNode::new("SOMEIP-PROVIDED-EVENT-GROUP");
    element.push_text(
        "SHORT-NAME",
        parse_str(field(map, "short_name"), &format!("{path}.short_name"), true)?,
    );
    element.push_text("EVENT-GROUP-ID", hex16(parse_u16(map, "event_group_id", path)?));
    element.push_text("EVENT-ID", hex16(parse_u16(map, "event_id", path)?));

    if let Some(port) = field(map, "multicast_udp_port") {
        let port = parse_int(
            Some(port),
            &format!("{path}.multicast_udp_port"),
            Some(1),
            Some(65535),
        )?;
        element.push_text("EVENT-MULTICAST-UDP-PORT", port);
    }
    if let Some(address) = field(map, "ipv4_multicast_ip_address") {
        element.push_text(
            "IPV-4-MULTICAST-IP-ADDRESS",
            parse_ipv4(Some(address), &format!("{path}.ipv4_multicast_ip_address"))?,
        );
    }

    Ok(element)
}

const REQUIRED_KEYS: &[&str] = &[
    "short_name",
    "service_interface",
    "service_interface_id",
    "major_version",
    "minor_version",
    "required_event_groups",
    "event_groups",
    "sd_client",
];

/// Build a `REQUIRED-SOMEIP-SERVICE-INSTANCE`.
///
/// Event groups come from `required_event_groups` followed by `event_groups`.
pub fn build_required_instance(
    instance: &Value,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(instance), path)?;
    warn_unknown_keys(map, REQUIRED_KEYS, path, ctx)?;

    let short_name = parse_str(field(map, "short_name"), &format!("{path}.short_name"), true)?;
    let deployment = InterfaceDeployment::parse(map, path)?;

    let mut element = ElementNode::new("REQUIRED-SOMEIP-SERVICE-INSTANCE");
    element.push_text("SHORT-NAME", &short_name);
    element.push(deployment.to_element());

    let groups = listify_keys(map, &["required_event_groups", "event_groups"], path)?;
    if !groups.is_empty() {
        let mut groups_node = ElementNode::new("REQUIRED-EVENT-GROUPS");
        for (idx, group) in groups.into_iter().enumerate() {
            let group_path = format!("{path}.event_groups[{idx}]");
            let group = as_mapping(Some(group), &group_path)?;
            warn_unknown_keys(
                group,
                &["short_name", "event_group_id", "event_id"],
                &group_path,
                ctx,
            )?;

            let mut group_node = ElementNode::new("SOMEIP-REQUIRED-EVENT-GROUP");
            group_node.push_text(
                "SHORT-NAME",
                parse_str(field(group, "short_name"), &format!("{group_path}.short_name"), true)?,
            );
            group_node.push_text(
                "EVENT-GROUP-ID",
                hex16(parse_u16(group, "event_group_id", &group_path)?),
            );
            group_node.push_text("EVENT-ID", hex16(parse_u16(group, "event_id", &group_path)?));
            groups_node.push(group_node);
        }
        element.push(groups_node);
    }

    if let Some(sd) = sd_timing(
        map.get("sd_client"),
        &format!("{path}.sd_client"),
        "SD-CLIENT-CONFIG",
        "INITIAL-FIND-BEHAVIOR",
        ctx,
    )? {
        element.push(sd);
    }

    tracing::debug!(short_name = %short_name, "built required SOME/IP instance");
    ctx.summary.required_someip_count += 1;
    Ok(element)
}
