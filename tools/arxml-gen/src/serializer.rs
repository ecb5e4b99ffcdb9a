// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical text rendering of an [`ElementNode`] tree.
//!
//! Output is a pure function of the tree and the indent width: an XML
//! declaration, one element per line, text-only elements inline, blank lines
//! dropped and a single trailing newline.

use crate::error::{ConfigError, Result};
use crate::tree::ElementNode;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

/// Default indent width used by the CLI.
pub const DEFAULT_INDENT: i64 = 4;

fn xml_error(err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Xml(err.to_string())
}

/// Render `root` as an UTF-8 XML document indented by `indent` spaces.
pub fn serialize_tree(root: &ElementNode, indent: i64) -> Result<String> {
    let width = usize::try_from(indent).map_err(|_| ConfigError::NegativeIndent { indent })?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', width);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    write_node(&mut writer, root)?;

    let raw = String::from_utf8(writer.into_inner()).map_err(xml_error)?;
    let mut out = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    Ok(out)
}

/// Escape an attribute value; line breaks and tabs become character references
/// so a value never spans several output lines.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &ElementNode) -> Result<()> {
    let mut start = BytesStart::new(node.tag());
    for (name, value) in node.attributes() {
        start.push_attribute(Attribute {
            key: QName(name.as_bytes()),
            value: escape_attribute(value).into_bytes().into(),
        });
    }

    let text = node.text().filter(|t| !t.is_empty());
    let has_children = !node.children().is_empty();

    if text.is_none() && !has_children {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;

    if let Some(text) = text {
        // Mixed content: text gets its own line like the child elements.
        if has_children {
            writer.write_indent().map_err(xml_error)?;
        }
        writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(xml_error)?;
        if has_children {
            writer.write_indent().map_err(xml_error)?;
        }
    }

    for child in node.children() {
        write_node(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(node.tag())))
        .map_err(xml_error)
}
