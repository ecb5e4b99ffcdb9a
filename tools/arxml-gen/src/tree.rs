// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Output element tree.
//!
//! Nodes own their children outright; the tree is built bottom-up and handed
//! to the serializer once complete.

/// One element of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<ElementNode>,
    text: Option<String>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Leaf element holding only text.
    pub fn with_text(tag: impl Into<String>, text: impl ToString) -> Self {
        let mut node = Self::new(tag);
        node.text = Some(text.to_string());
        node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[ElementNode] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping the position of an existing one.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn push(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Append a text-only child element.
    pub fn push_text(&mut self, tag: &str, text: impl ToString) {
        self.children.push(Self::with_text(tag, text));
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&ElementNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All direct children with the given tag.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ElementNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Follow a path of tags, taking the first match at each level.
    pub fn find(&self, path: &[&str]) -> Option<&ElementNode> {
        path.iter().try_fold(self, |node, tag| node.child(tag))
    }

    /// Text of the child at `path`.
    pub fn find_text(&self, path: &[&str]) -> Option<&str> {
        self.find(path).and_then(ElementNode::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_keep_insertion_order() {
        let mut parent = ElementNode::new("ELEMENTS");
        parent.push_text("SHORT-NAME", "B");
        parent.push_text("SHORT-NAME", "A");
        parent.push_text("SHORT-NAME", "B");

        let names: Vec<_> = parent
            .children_named("SHORT-NAME")
            .filter_map(ElementNode::text)
            .collect();
        assert_eq!(names, ["B", "A", "B"]);
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut node = ElementNode::new("X");
        node.set_attribute("a", "1");
        node.set_attribute("b", "2");
        node.set_attribute("a", "3");
        assert_eq!(
            node.attributes(),
            &[("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert_eq!(node.attribute("b"), Some("2"));
    }

    #[test]
    fn test_find_path() {
        let mut leaf = ElementNode::new("VERSION");
        leaf.push_text("MAJOR-VERSION", 1);
        let mut root = ElementNode::new("DEPLOYMENT");
        root.push(leaf);

        assert_eq!(root.find_text(&["VERSION", "MAJOR-VERSION"]), Some("1"));
        assert!(root.find(&["VERSION", "MISSING"]).is_none());
        assert_eq!(root.find(&[]).map(ElementNode::tag), Some("DEPLOYMENT"));
    }
}
