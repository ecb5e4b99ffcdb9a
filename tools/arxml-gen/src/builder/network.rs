// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ethernet topology: communication clusters and communication connectors.

use crate::coerce::{parse_int, parse_ipv4, parse_str, parse_str_or};
use crate::context::GenerationContext;
use crate::error::{ConfigError, Result};
use crate::shape::{as_mapping, field, listify, listify_keys, warn_unknown_keys};
use crate::tree::ElementNode;
use serde_yaml::Value;

const DEFAULT_IPV4_ADDRESS: &str = "127.0.0.1";

/// Build a `COMMUNICATION-CLUSTER` with its physical channels and endpoints.
pub fn build_communication_cluster(
    cluster: &Value,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(cluster), path)?;
    warn_unknown_keys(
        map,
        &[
            "short_name",
            "protocol_version",
            "ethernet_physical_channels",
            "ethernet_physical_channel",
        ],
        path,
        ctx,
    )?;

    let short_name = parse_str_or(
        field(map, "short_name"),
        &format!("{path}.short_name"),
        "CommunicationCluster",
    )?;
    let protocol_version = match field(map, "protocol_version") {
        Some(v) => parse_int(Some(v), &format!("{path}.protocol_version"), Some(0), None)?,
        None => 1,
    };

    let channels = listify_keys(
        map,
        &["ethernet_physical_channels", "ethernet_physical_channel"],
        path,
    )?;
    if channels.is_empty() {
        return Err(ConfigError::EmptyCollection {
            path: path.into(),
            what: "ethernet physical channel",
        });
    }

    let mut element = ElementNode::new("COMMUNICATION-CLUSTER");
    element.push_text("SHORT-NAME", &short_name);

    for (idx, channel) in channels.into_iter().enumerate() {
        let channel_path = format!("{path}.ethernet_physical_channels[{idx}]");
        element.push(build_physical_channel(
            channel,
            &short_name,
            idx,
            &channel_path,
            ctx,
        )?);
    }

    element.push_text("PROTOCOL-VERSION", protocol_version);

    tracing::debug!(short_name = %short_name, "built communication cluster");
    ctx.summary.communication_cluster_count += 1;
    Ok(element)
}

fn build_physical_channel(
    channel: &Value,
    cluster_name: &str,
    index: usize,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(channel), path)?;
    warn_unknown_keys(map, &["short_name", "network_endpoints"], path, ctx)?;

    let mut element = ElementNode::new("ETHERNET-PHYSICAL-CHANNEL");
    let default_name = format!("{cluster_name}Channel{}", index + 1);
    element.push_text(
        "SHORT-NAME",
        parse_str_or(field(map, "short_name"), &format!("{path}.short_name"), &default_name)?,
    );

    let endpoints = listify(map.get("network_endpoints"), &format!("{path}.network_endpoints"))?;
    if endpoints.is_empty() {
        return Err(ConfigError::EmptyCollection {
            path: path.into(),
            what: "network endpoint",
        });
    }

    let mut endpoints_node = ElementNode::new("NETWORK-ENDPOINTS");
    for (idx, endpoint) in endpoints.into_iter().enumerate() {
        let endpoint_path = format!("{path}.network_endpoints[{idx}]");
        let map = as_mapping(Some(endpoint), &endpoint_path)?;
        warn_unknown_keys(map, &["short_name", "ipv4_address"], &endpoint_path, ctx)?;

        let mut endpoint_node = ElementNode::new("NETWORK-ENDPOINT");
        endpoint_node.push_text(
            "SHORT-NAME",
            parse_str_or(
                field(map, "short_name"),
                &format!("{endpoint_path}.short_name"),
                &format!("Endpoint{}", idx + 1),
            )?,
        );

        let address_path = format!("{endpoint_path}.ipv4_address");
        let address = match field(map, "ipv4_address") {
            Some(v) => parse_ipv4(Some(v), &address_path)?,
            None => DEFAULT_IPV4_ADDRESS.to_string(),
        };

        let mut ipv4_config = ElementNode::new("IPV-4-CONFIGURATION");
        ipv4_config.push_text("IPV-4-ADDRESS", address);
        let mut addresses = ElementNode::new("NETWORK-ENDPOINT-ADDRESSES");
        addresses.push(ipv4_config);
        endpoint_node.push(addresses);

        endpoints_node.push(endpoint_node);
    }
    element.push(endpoints_node);

    Ok(element)
}

/// Transport protocol of an application endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    /// Case-insensitive parse of `udp`/`tcp`.
    pub fn parse(value: Option<&Value>, path: &str) -> Result<Self> {
        let text = parse_str(value, path, true)?.to_ascii_lowercase();
        match text.as_str() {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            _ => Err(ConfigError::InvalidTransport {
                path: path.into(),
                transport: text,
            }),
        }
    }

    fn tags(self) -> (&'static str, &'static str) {
        match self {
            Self::Udp => ("UDP-TP", "UDP-TP-PORT"),
            Self::Tcp => ("TCP-TP", "TCP-TP-PORT"),
        }
    }
}

/// Build an `ETHERNET-COMMUNICATION-CONNECTOR` with its application endpoints.
pub fn build_ethernet_connector(
    connector: &Value,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let map = as_mapping(Some(connector), path)?;
    warn_unknown_keys(
        map,
        &["short_name", "ap_application_endpoints", "ap_application_endpoint"],
        path,
        ctx,
    )?;

    let mut element = ElementNode::new("ETHERNET-COMMUNICATION-CONNECTOR");
    let short_name = parse_str(field(map, "short_name"), &format!("{path}.short_name"), true)?;
    element.push_text("SHORT-NAME", &short_name);

    let endpoints = listify_keys(
        map,
        &["ap_application_endpoints", "ap_application_endpoint"],
        path,
    )?;
    if endpoints.is_empty() {
        return Err(ConfigError::EmptyCollection {
            path: path.into(),
            what: "ap_application_endpoint",
        });
    }

    let mut endpoints_node = ElementNode::new("AP-APPLICATION-ENDPOINTS");
    for (idx, endpoint) in endpoints.into_iter().enumerate() {
        let endpoint_path = format!("{path}.ap_application_endpoints[{idx}]");
        let map = as_mapping(Some(endpoint), &endpoint_path)?;
        warn_unknown_keys(map, &["short_name", "transport", "port"], &endpoint_path, ctx)?;

        let mut endpoint_node = ElementNode::new("AP-APPLICATION-ENDPOINT");
        endpoint_node.push_text(
            "SHORT-NAME",
            parse_str(field(map, "short_name"), &format!("{endpoint_path}.short_name"), true)?,
        );

        let transport = Transport::parse(field(map, "transport"), &format!("{endpoint_path}.transport"))?;
        let port = parse_int(
            field(map, "port"),
            &format!("{endpoint_path}.port"),
            Some(1),
            Some(65535),
        )?;

        let (tp_tag, port_tag) = transport.tags();
        let mut port_node = ElementNode::new(port_tag);
        port_node.push_text("PORT-NUMBER", port);
        let mut tp_node = ElementNode::new(tp_tag);
        tp_node.push(port_node);
        let mut tp_config = ElementNode::new("TP-CONFIGURATION");
        tp_config.push(tp_node);
        endpoint_node.push(tp_config);

        endpoints_node.push(endpoint_node);
    }
    element.push(endpoints_node);

    tracing::debug!(short_name = %short_name, "built ethernet connector");
    ctx.summary.connector_count += 1;
    Ok(element)
}
