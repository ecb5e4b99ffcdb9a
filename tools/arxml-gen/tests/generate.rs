// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests for the YAML to ARXML pipeline
//!
//! # Test Coverage
//!
//! - End-to-end generation of a provided SOME/IP instance
//! - Byte-identical output across runs
//! - Variable precedence and package order across several inputs
//! - Range and IPv4 validation through the whole pipeline
//! - Extension gating and strict/lenient unknown-key policy
//! - Output file handling (overwrite, parent directories)
//! - Reading the generated document back as a binding header

use arxml_gen::binding::{extract_someip_binding, render_header};
use arxml_gen::{generate_from_files, write_output, ConfigError, GenerateOptions, Generation};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write input");
    path
}

fn generate(content: &str, options: &GenerateOptions) -> Result<Generation, ConfigError> {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "input.yaml", content);
    generate_from_files(&[input], options)
}

const VEHICLE_STATUS: &str = r#"
autosar:
  packages:
    - short_name: Pkg
      someip:
        provided_service_instances:
          - short_name: Svc
            service_interface_id: "0x1234"
            major_version: 1
            minor_version: 0
            service_instance_id: 1
"#;

#[test]
fn test_end_to_end_provided_instance() {
    let generation = generate(VEHICLE_STATUS, &GenerateOptions::default()).unwrap();

    let xml = &generation.xml;
    assert!(xml.contains("<SHORT-NAME>Pkg</SHORT-NAME>"));
    assert!(xml.contains("<PROVIDED-SOMEIP-SERVICE-INSTANCE>"));
    assert!(xml.contains("<SERVICE-INTERFACE-ID>0x1234</SERVICE-INTERFACE-ID>"));
    assert!(xml.contains("<MAJOR-VERSION>1</MAJOR-VERSION>"));
    assert!(xml.contains("<MINOR-VERSION>0</MINOR-VERSION>"));
    assert!(xml.contains("<SERVICE-INSTANCE-ID>0x0001</SERVICE-INSTANCE-ID>"));
    assert_eq!(xml.matches("<AR-PACKAGE>").count(), 1);

    let summary = generation.summary();
    assert_eq!(summary.package_count, 1);
    assert_eq!(summary.provided_someip_count, 1);
    assert_eq!(summary.required_someip_count, 0);
    assert!(generation.warnings().is_empty());
}

#[test]
fn test_exact_minimal_document() {
    let options = GenerateOptions {
        indent: 2,
        ..Default::default()
    };
    let generation = generate("package: {short_name: P}\n", &options).unwrap();
    assert_eq!(
        generation.xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <AUTOSAR xmlns=\"http://autosar.org/schema/r4.0\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"http://autosar.org/schema/r4.0 autosar_00050.xsd\">\n\
         \x20 <AR-PACKAGES>\n\
         \x20   <AR-PACKAGE>\n\
         \x20     <SHORT-NAME>P</SHORT-NAME>\n\
         \x20     <ELEMENTS/>\n\
         \x20   </AR-PACKAGE>\n\
         \x20 </AR-PACKAGES>\n\
         </AUTOSAR>\n"
    );
}

#[test]
fn test_output_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "input.yaml", VEHICLE_STATUS);
    let options = GenerateOptions::default();

    let first = generate_from_files(&[&input], &options).unwrap();
    let second = generate_from_files(&[&input], &options).unwrap();
    assert_eq!(first.xml, second.xml);
    assert!(first.xml.ends_with("</AUTOSAR>\n"));
    assert!(!first.xml.contains("\n\n"));
}

#[test]
fn test_merge_order_and_variable_precedence() {
    let dir = TempDir::new().unwrap();
    let first = write_input(
        &dir,
        "first.yaml",
        "variables: {ARXML_IT_SUFFIX: a}\nautosar:\n  package: {short_name: 'Pkg_${ARXML_IT_SUFFIX}'}\n",
    );
    let second = write_input(
        &dir,
        "second.yaml",
        "variables: {ARXML_IT_SUFFIX: b}\nautosar:\n  schema_namespace: urn:custom\n  packages: [{short_name: Second}]\n",
    );

    let generation = generate_from_files(&[first, second], &GenerateOptions::default()).unwrap();
    let xml = &generation.xml;

    let pkg_b = xml.find("<SHORT-NAME>Pkg_b</SHORT-NAME>").expect("later variable wins");
    let second_pkg = xml.find("<SHORT-NAME>Second</SHORT-NAME>").expect("second package");
    assert!(pkg_b < second_pkg, "packages keep input order");
    assert!(xml.contains("<AUTOSAR xmlns=\"urn:custom\""));
    assert_eq!(generation.summary().package_count, 2);
}

#[test]
fn test_document_without_packages_fails() {
    let dir = TempDir::new().unwrap();
    let good = write_input(&dir, "good.yaml", "package: {short_name: P}\n");
    let empty = write_input(&dir, "empty.yaml", "variables: {X: 1}\n");

    let err = generate_from_files(&[good, empty], &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyCollection { .. }));
    assert!(err.to_string().contains("document[1]"));
}

#[test]
fn test_malformed_inputs() {
    let dir = TempDir::new().unwrap();
    let blank = write_input(&dir, "blank.yaml", "\n\n");
    let list = write_input(&dir, "list.yaml", "- a\n- b\n");
    let broken = write_input(&dir, "broken.yaml", "autosar: [unclosed\n");
    let missing = dir.path().join("missing.yaml");
    let options = GenerateOptions::default();

    assert!(matches!(
        generate_from_files(&[blank], &options),
        Err(ConfigError::EmptyDocument { .. })
    ));
    assert!(matches!(
        generate_from_files(&[list], &options),
        Err(ConfigError::NotMapping { .. })
    ));
    assert!(matches!(
        generate_from_files(&[broken], &options),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        generate_from_files(&[missing], &options),
        Err(ConfigError::ReadInput { .. })
    ));
}

fn service_with_id(id: &str) -> String {
    format!(
        "package:\n  short_name: P\n  provided_someip_service_instances:\n    - {{short_name: S, service_interface_id: {id}, service_instance_id: 1}}\n"
    )
}

#[test]
fn test_service_interface_id_range() {
    let options = GenerateOptions::default();

    let err = generate(&service_with_id("0x10000"), &options).unwrap_err();
    assert!(matches!(err, ConfigError::AboveMaximum { value: 0x10000, maximum: 0xFFFF, .. }));
    assert_eq!(
        err.breadcrumb(),
        Some("autosar.packages[0].provided_someip_service_instances[0].service_interface_id")
    );

    let ok = generate(&service_with_id("0xFFFF"), &options).unwrap();
    assert!(ok.xml.contains("<SERVICE-INTERFACE-ID>0xFFFF</SERVICE-INTERFACE-ID>"));
}

fn cluster_with_address(address: &str) -> String {
    format!(
        "package:\n  short_name: P\n  communication_cluster:\n    ethernet_physical_channel:\n      network_endpoints: [{{ipv4_address: '{address}'}}]\n"
    )
}

#[test]
fn test_ipv4_validation() {
    let options = GenerateOptions::default();

    assert!(matches!(
        generate(&cluster_with_address("999.1.1.1"), &options),
        Err(ConfigError::InvalidIpAddress { .. })
    ));
    assert!(matches!(
        generate(&cluster_with_address("::1"), &options),
        Err(ConfigError::NotIpv4 { .. })
    ));

    let ok = generate(&cluster_with_address("10.0.0.5"), &options).unwrap();
    assert!(ok.xml.contains("<IPV-4-ADDRESS>10.0.0.5</IPV-4-ADDRESS>"));
    assert_eq!(ok.summary().communication_cluster_count, 1);
}

#[test]
fn test_extension_gate() {
    let content = "package:\n  short_name: P\n  custom_elements:\n    - {tag: X-VENDOR, text: hello}\n";

    let err = generate(content, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigError::ExtensionNotAllowed { .. }));
    assert!(err.to_string().starts_with("autosar.packages[0]:"));

    let options = GenerateOptions {
        allow_extensions: true,
        ..Default::default()
    };
    let generation = generate(content, &options).unwrap();
    assert!(generation.xml.contains("<X-VENDOR>hello</X-VENDOR>"));
    assert_eq!(generation.summary().custom_element_count, 1);
}

#[test]
fn test_unknown_key_policy() {
    let content = "package: {short_name: P, foo: 1}\n";

    let lenient = generate(content, &GenerateOptions::default()).unwrap();
    assert_eq!(lenient.warnings(), ["autosar.packages[0]: unknown key 'foo'"]);

    let strict = GenerateOptions {
        strict: true,
        ..Default::default()
    };
    let err = generate(content, &strict).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey { ref key, .. } if key == "foo"));
}

#[test]
fn test_write_output_policy() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("nested/out/manifest.arxml");

    write_output(&target, "first\n", false).unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "first\n");

    let err = write_output(&target, "second\n", false).unwrap_err();
    assert!(matches!(err, ConfigError::OutputExists { .. }));
    assert!(err.to_string().contains("--overwrite"));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "first\n");

    write_output(&target, "second\n", true).unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "second\n");
}

#[test]
fn test_binding_header_from_generated_document() {
    let content = r#"
variables:
  ARXML_IT_MCAST: 239.0.0.1
package:
  short_name: VehicleStatus
  someip:
    provided_service_instances:
      - short_name: VehicleStatusProvider
        service_interface: {id: 0x1234, major: 1, minor: 0}
        service_instance_id: 1
        event_groups:
          - short_name: StatusGroup
            event_group_id: 1
            event_id: 0x8001
            ipv4_multicast_ip_address: ${ARXML_IT_MCAST}
"#;
    let generation = generate(content, &GenerateOptions::default()).unwrap();
    assert!(generation
        .xml
        .contains("<IPV-4-MULTICAST-IP-ADDRESS>239.0.0.1</IPV-4-MULTICAST-IP-ADDRESS>"));

    let binding = extract_someip_binding(&generation.xml, None, Some("StatusGroup")).unwrap();
    assert_eq!(binding.provided_service_short_name, "VehicleStatusProvider");
    assert_eq!(binding.service_interface_id, 0x1234);
    assert_eq!(binding.service_instance_id, 1);
    assert_eq!(binding.event_group_id, 1);
    assert_eq!(binding.event_id, 0x8001);

    let header = render_header(&binding, Path::new("vehicle_status.h"), "sample::generated").unwrap();
    assert!(header.contains("#ifndef GEN_VEHICLE_STATUS_H_INCLUDED"));
    assert!(header.contains("kStatusEventId{0x8001U}"));
    assert!(header.contains("kStatusEventGroupId{0x0001U}"));
}
