//! Schema-less `<detail>` tree
//!
//! A [`DetailNode`] mirrors one XML element of the detail subtree: its name,
//! its attributes in wire order, its child elements in document order, and
//! the text it encloses when it has no children. Values are kept as strings;
//! typed interpretation is left to detail handlers.
//!
//! Lookups are linear scans. Detail trees in practice hold tens of nodes at
//! most, so no index is kept.

use serde::{Deserialize, Serialize};

/// A single named string value attached to a detail node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One element of a detail tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailNode {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<DetailNode>,
    inner_text: Option<String>,
}

impl DetailNode {
    /// Create an empty node named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a node from attributes already in wire order.
    ///
    /// Later duplicates of a name overwrite the earlier value in place.
    pub fn with_attributes(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        let mut node = Self::new(name);
        node.attributes.reserve(attributes.len());
        for attr in attributes {
            node.set_attribute(attr.name, attr.value);
        }
        node
    }

    /// Builder form of [`DetailNode::set_attribute`]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`DetailNode::set_inner_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_inner_text(text);
        self
    }

    /// Builder form of [`DetailNode::add_child`]
    pub fn with_child(mut self, child: DetailNode) -> Self {
        self.add_child(child);
        self
    }

    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of the attribute `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Insert or replace an attribute. New names go to the end; replacing
    /// keeps the original position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Child elements in document order
    pub fn children(&self) -> &[DetailNode] {
        &self.children
    }

    /// Append a child element
    pub fn add_child(&mut self, child: DetailNode) {
        self.children.push(child);
    }

    /// First direct child named `name`
    pub fn first_child(&self, name: &str) -> Option<&DetailNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Mutable access to the first direct child named `name`
    pub fn first_child_mut(&mut self, name: &str) -> Option<&mut DetailNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// All direct children named `name`
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DetailNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Remove every direct child named `name`, returning how many went away
    pub fn remove_children_named(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.name != name);
        before - self.children.len()
    }

    /// First descendant named `name` in document order, searching at most
    /// `max_depth` levels below this node (1 = direct children only).
    pub fn find_descendant(&self, name: &str, max_depth: usize) -> Option<&DetailNode> {
        self.walk()
            .skip(1)
            .find(|(depth, node)| *depth <= max_depth && node.name == name)
            .map(|(_, node)| node)
    }

    /// Enclosed text. Only structural-free nodes carry text; a node with
    /// children always reports `None`.
    pub fn inner_text(&self) -> Option<&str> {
        if self.children.is_empty() {
            self.inner_text.as_deref()
        } else {
            None
        }
    }

    /// Replace the enclosed text
    pub fn set_inner_text(&mut self, text: impl Into<String>) {
        self.inner_text = Some(text.into());
    }

    /// Drop the enclosed text
    pub fn clear_inner_text(&mut self) {
        self.inner_text = None;
    }

    /// Pre-order traversal yielding `(depth, node)`, starting with this node
    /// at depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

/// Iterator returned by [`DetailNode::walk`]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a DetailNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a DetailNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DetailNode {
        DetailNode::new("detail")
            .with_child(DetailNode::new("contact").with_attribute("callsign", "Bravo"))
            .with_child(
                DetailNode::new("link")
                    .with_attribute("uid", "A")
                    .with_child(DetailNode::new("point").with_attribute("lat", "1")),
            )
            .with_child(DetailNode::new("link").with_attribute("uid", "B"))
            .with_child(DetailNode::new("remarks").with_text("hi"))
    }

    #[test]
    fn test_attribute_upsert_keeps_order() {
        let mut node = DetailNode::new("contact")
            .with_attribute("callsign", "Alpha")
            .with_attribute("endpoint", "*:-1:stcp");
        node.set_attribute("callsign", "Bravo");
        node.set_attribute("phone", "555");

        let names: Vec<&str> = node.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["callsign", "endpoint", "phone"]);
        assert_eq!(node.attribute("callsign"), Some("Bravo"));
        assert_eq!(node.attribute("missing"), None);
    }

    #[test]
    fn test_remove_attribute() {
        let mut node = DetailNode::new("x").with_attribute("a", "1").with_attribute("b", "2");
        assert_eq!(node.remove_attribute("a"), Some("1".to_string()));
        assert_eq!(node.remove_attribute("a"), None);
        assert_eq!(node.attributes().len(), 1);
    }

    #[test]
    fn test_duplicate_attributes_collapse() {
        let node = DetailNode::with_attributes(
            "x",
            vec![
                Attribute::new("a", "1"),
                Attribute::new("b", "2"),
                Attribute::new("a", "3"),
            ],
        );
        assert_eq!(node.attributes().len(), 2);
        assert_eq!(node.attributes()[0], Attribute::new("a", "3"));
    }

    #[test]
    fn test_child_lookup() {
        let detail = sample();
        assert_eq!(detail.first_child("link").unwrap().attribute("uid"), Some("A"));
        assert_eq!(detail.children_named("link").count(), 2);
        assert!(detail.first_child("point").is_none());
    }

    #[test]
    fn test_find_descendant_respects_depth() {
        let detail = sample();
        assert!(detail.find_descendant("point", 1).is_none());
        let point = detail.find_descendant("point", 2).unwrap();
        assert_eq!(point.attribute("lat"), Some("1"));
        assert!(detail.find_descendant("detail", 5).is_none());
    }

    #[test]
    fn test_walk_is_document_order() {
        let detail = sample();
        let visited: Vec<(usize, &str)> = detail.walk().map(|(d, n)| (d, n.name())).collect();
        assert_eq!(
            visited,
            [
                (0, "detail"),
                (1, "contact"),
                (1, "link"),
                (2, "point"),
                (1, "link"),
                (1, "remarks"),
            ]
        );
    }

    #[test]
    fn test_inner_text_only_on_leaves() {
        let mut node = DetailNode::new("remarks").with_text("hello");
        assert_eq!(node.inner_text(), Some("hello"));

        node.add_child(DetailNode::new("b"));
        assert_eq!(node.inner_text(), None);

        node.remove_children_named("b");
        assert_eq!(node.inner_text(), Some("hello"));
        node.clear_inner_text();
        assert_eq!(node.inner_text(), None);
    }

    #[test]
    fn test_first_child_mut() {
        let mut detail = sample();
        detail
            .first_child_mut("contact")
            .unwrap()
            .set_attribute("callsign", "Charlie");
        assert_eq!(
            detail.first_child("contact").unwrap().attribute("callsign"),
            Some("Charlie")
        );
    }
}
