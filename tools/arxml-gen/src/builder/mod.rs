// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Element tree construction.
//!
//! [`build_tree`] turns a [`MergedConfig`] into the `AUTOSAR` root element.
//! Packages are built in input order and, inside a package, elements follow a
//! fixed order:
//!
//! 1. communication clusters
//! 2. ethernet communication connectors
//! 3. provided SOME/IP service instances
//! 4. required SOME/IP service instances
//! 5. DDS binding
//! 6. zero-copy binding (extension)
//! 7. custom elements (extension)
//!
//! Every builder reports errors under the breadcrumb of the input it reads and
//! bumps the matching [`GenerationSummary`](crate::context::GenerationSummary)
//! counter once its element is complete.

mod dds;
mod extension;
mod network;
mod someip;

pub use dds::build_dds_binding;
pub use extension::{build_custom_element, build_zerocopy_binding};
pub use network::{build_communication_cluster, build_ethernet_connector, Transport};
pub use someip::{build_provided_instance, build_required_instance};

use crate::coerce::parse_str;
use crate::context::GenerationContext;
use crate::error::{ConfigError, Result};
use crate::loader::MergedConfig;
use crate::shape::{as_mapping, field, listify, listify_keys, optional_mapping, warn_unknown_keys};
use crate::tree::ElementNode;
use serde_yaml::{Mapping, Value};

/// XML Schema instance namespace bound to the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const PACKAGE_KEYS: &[&str] = &[
    "short_name",
    "communication_cluster",
    "communication_clusters",
    "ethernet_communication_connector",
    "ethernet_communication_connectors",
    "someip",
    "dds",
    "zerocopy",
    "provided_someip_service_instances",
    "required_someip_service_instances",
    "custom_elements",
    "runtime",
];

const SOMEIP_KEYS: &[&str] = &[
    "provided_service_instances",
    "provided_someip_service_instances",
    "required_service_instances",
    "required_someip_service_instances",
];

/// Render a 16-bit identifier as `0xHHHH`.
pub(crate) fn hex16(value: i64) -> String {
    format!("0x{value:04X}")
}

/// Build the `AUTOSAR` root for a merged configuration.
pub fn build_tree(config: &MergedConfig, ctx: &mut GenerationContext) -> Result<ElementNode> {
    if config.packages.is_empty() {
        return Err(ConfigError::EmptyCollection {
            path: "autosar.packages".into(),
            what: "package",
        });
    }

    let mut root = ElementNode::new("AUTOSAR");
    root.set_attribute("xmlns", config.schema_namespace.as_str());
    root.set_attribute("xmlns:xsi", XSI_NAMESPACE);
    root.set_attribute("xsi:schemaLocation", config.schema_location.as_str());

    let mut packages = ElementNode::new("AR-PACKAGES");
    for (idx, package) in config.packages.iter().enumerate() {
        packages.push(build_package(package, idx, ctx)?);
    }
    root.push(packages);

    tracing::debug!(
        packages = ctx.summary.package_count,
        warnings = ctx.warnings.len(),
        "element tree complete"
    );
    Ok(root)
}

/// Build one `AR-PACKAGE` found at `autosar.packages[index]`.
pub fn build_package(
    package: &Value,
    index: usize,
    ctx: &mut GenerationContext,
) -> Result<ElementNode> {
    let path = format!("autosar.packages[{index}]");
    let map = as_mapping(Some(package), &path)?;
    warn_unknown_keys(map, PACKAGE_KEYS, &path, ctx)?;

    let short_name = parse_str(field(map, "short_name"), &format!("{path}.short_name"), true)?;
    let mut elements = ElementNode::new("ELEMENTS");

    let clusters = listify_keys(map, &["communication_clusters", "communication_cluster"], &path)?;
    for (idx, cluster) in clusters.into_iter().enumerate() {
        let cluster_path = format!("{path}.communication_clusters[{idx}]");
        elements.push(build_communication_cluster(cluster, &cluster_path, ctx)?);
    }

    let connectors = listify_keys(
        map,
        &["ethernet_communication_connectors", "ethernet_communication_connector"],
        &path,
    )?;
    for (idx, connector) in connectors.into_iter().enumerate() {
        let connector_path = format!("{path}.ethernet_communication_connectors[{idx}]");
        elements.push(build_ethernet_connector(connector, &connector_path, ctx)?);
    }

    let (provided, required) = someip_instances(map, &path, ctx)?;
    for (idx, instance) in provided.into_iter().enumerate() {
        let instance_path = format!("{path}.provided_someip_service_instances[{idx}]");
        elements.push(build_provided_instance(instance, &instance_path, ctx)?);
    }
    for (idx, instance) in required.into_iter().enumerate() {
        let instance_path = format!("{path}.required_someip_service_instances[{idx}]");
        elements.push(build_required_instance(instance, &instance_path, ctx)?);
    }

    let custom_elements = listify(map.get("custom_elements"), &format!("{path}.custom_elements"))?;

    if let Some(binding) = build_dds_binding(map.get("dds"), &format!("{path}.dds"), ctx)? {
        elements.push(binding);
    }

    let has_extension = field(map, "zerocopy").is_some() || !custom_elements.is_empty();
    if has_extension && !ctx.allow_extensions {
        return Err(ConfigError::ExtensionNotAllowed { path });
    }

    if ctx.allow_extensions {
        if let Some(binding) =
            build_zerocopy_binding(map.get("zerocopy"), &format!("{path}.zerocopy"), ctx)?
        {
            elements.push(binding);
        }
    }

    for (idx, spec) in custom_elements.into_iter().enumerate() {
        let spec_path = format!("{path}.custom_elements[{idx}]");
        elements.push(build_custom_element(spec, &spec_path, ctx)?);
    }

    let mut element = ElementNode::new("AR-PACKAGE");
    element.push_text("SHORT-NAME", &short_name);
    element.push(elements);

    tracing::debug!(short_name = %short_name, "built package");
    ctx.summary.package_count += 1;
    Ok(element)
}

/// Gather provided and required instances from the `someip` section and the
/// flat package keys, in that order.
fn someip_instances<'a>(
    package: &'a Mapping,
    path: &str,
    ctx: &mut GenerationContext,
) -> Result<(Vec<&'a Value>, Vec<&'a Value>)> {
    let someip_path = format!("{path}.someip");
    let mut provided = Vec::new();
    let mut required = Vec::new();

    if let Some(someip) = optional_mapping(package.get("someip"), &someip_path)? {
        warn_unknown_keys(someip, SOMEIP_KEYS, &someip_path, ctx)?;
        provided = listify_keys(
            someip,
            &["provided_service_instances", "provided_someip_service_instances"],
            &someip_path,
        )?;
        required = listify_keys(
            someip,
            &["required_service_instances", "required_someip_service_instances"],
            &someip_path,
        )?;
    }

    provided.extend(listify_keys(package, &["provided_someip_service_instances"], path)?);
    required.extend(listify_keys(package, &["required_someip_service_instances"], path)?);
    Ok((provided, required))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(packages: &str) -> MergedConfig {
        let autosar: Value = serde_yaml::from_str(packages).expect("valid yaml");
        MergedConfig::from_autosar(&autosar, &mut GenerationContext::default())
            .expect("valid autosar section")
    }

    fn package(text: &str) -> Value {
        serde_yaml::from_str(text).expect("valid yaml")
    }

    #[test]
    fn test_hex16() {
        assert_eq!(hex16(0), "0x0000");
        assert_eq!(hex16(0x1234), "0x1234");
        assert_eq!(hex16(0xabc), "0x0ABC");
    }

    #[test]
    fn test_root_attributes_and_packages() {
        let merged = config("packages: [{short_name: A}, {short_name: B}]");
        let mut ctx = GenerationContext::default();
        let root = build_tree(&merged, &mut ctx).unwrap();

        assert_eq!(root.tag(), "AUTOSAR");
        let names: Vec<_> = root
            .attributes()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, ["xmlns", "xmlns:xsi", "xsi:schemaLocation"]);
        assert_eq!(root.attribute("xmlns"), Some("http://autosar.org/schema/r4.0"));

        let packages: Vec<_> = root
            .find(&["AR-PACKAGES"])
            .unwrap()
            .children()
            .iter()
            .filter_map(|p| p.find_text(&["SHORT-NAME"]))
            .collect();
        assert_eq!(packages, ["A", "B"]);
        assert!(root.find(&["AR-PACKAGES", "AR-PACKAGE", "ELEMENTS"]).is_some());
        assert_eq!(ctx.summary.package_count, 2);
    }

    #[test]
    fn test_empty_packages_fail() {
        let merged = config("schema_namespace: urn:x");
        let err = build_tree(&merged, &mut GenerationContext::default()).unwrap_err();
        assert_eq!(err.breadcrumb(), Some("autosar.packages"));
    }

    #[test]
    fn test_element_order_within_package() {
        let pkg = package(
            "
short_name: Pkg
dds: {provided_topics: [{topic_name: t, type_name: T}]}
required_someip_service_instances: [{short_name: R, service_interface_id: 1}]
someip:
  provided_service_instances: [{short_name: P1, service_interface_id: 1, service_instance_id: 1}]
provided_someip_service_instances: {short_name: P2, service_interface_id: 2, service_instance_id: 1}
ethernet_communication_connector:
  short_name: Conn
  ap_application_endpoint: {short_name: E, transport: udp, port: 30490}
communication_cluster:
  ethernet_physical_channel: {network_endpoints: {ipv4_address: 10.0.0.1}}
",
        );
        let mut ctx = GenerationContext::default();
        let node = build_package(&pkg, 0, &mut ctx).unwrap();

        let order: Vec<_> = node
            .find(&["ELEMENTS"])
            .unwrap()
            .children()
            .iter()
            .map(|e| (e.tag(), e.find_text(&["SHORT-NAME"]).unwrap_or_default()))
            .collect();
        assert_eq!(
            order,
            [
                ("COMMUNICATION-CLUSTER", "CommunicationCluster"),
                ("ETHERNET-COMMUNICATION-CONNECTOR", "Conn"),
                ("PROVIDED-SOMEIP-SERVICE-INSTANCE", "P1"),
                ("PROVIDED-SOMEIP-SERVICE-INSTANCE", "P2"),
                ("REQUIRED-SOMEIP-SERVICE-INSTANCE", "R"),
                ("DDS-BINDING", "DdsBinding"),
            ]
        );
        assert_eq!(ctx.summary.provided_someip_count, 2);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_extensions_are_gated() {
        let pkg = package(
            "short_name: Ext\nzerocopy: {service_channels: [{service_id: 1, instance_id: 1, event_id: 1}]}\n",
        );

        let mut denied = GenerationContext::new(false, false);
        let err = build_package(&pkg, 3, &mut denied).unwrap_err();
        assert!(matches!(err, ConfigError::ExtensionNotAllowed { ref path } if path == "autosar.packages[3]"));
        assert!(err.to_string().contains("--allow-extensions"));

        let mut allowed = GenerationContext::new(false, true);
        let node = build_package(&pkg, 3, &mut allowed).unwrap();
        assert!(node.find(&["ELEMENTS", "EXT-ZEROCOPY-BINDING"]).is_some());
        assert_eq!(allowed.summary.zerocopy_binding_count, 1);

        let custom = package("short_name: C\ncustom_elements: [{tag: X-NOTE}]");
        assert!(build_package(&custom, 0, &mut GenerationContext::new(false, false)).is_err());
        let node = build_package(&custom, 0, &mut GenerationContext::new(false, true)).unwrap();
        assert!(node.find(&["ELEMENTS", "X-NOTE"]).is_some());
    }

    #[test]
    fn test_unknown_package_key() {
        let pkg = package("short_name: P\nfoo: 1");

        let mut lenient = GenerationContext::new(false, false);
        build_package(&pkg, 0, &mut lenient).unwrap();
        assert_eq!(lenient.warnings, ["autosar.packages[0]: unknown key 'foo'"]);

        let mut strict = GenerationContext::new(true, false);
        assert!(matches!(
            build_package(&pkg, 0, &mut strict),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_package_requires_short_name() {
        let err = build_package(&package("dds: {}"), 1, &mut GenerationContext::default())
            .unwrap_err();
        assert_eq!(err.breadcrumb(), Some("autosar.packages[1].short_name"));
    }
}
