//! Owned XML element tree.
//!
//! A small, namespace-aware tree used by every payload parser. It keeps
//! attributes and child nodes in construction order so that serializing a
//! value built from a parsed stanza reproduces the stanza exactly.
//!
//! The API follows the shape of `minidom::Element` (`builder`, `name`, `ns`,
//! `attr`, `get_child`, `text`), but, unlike minidom, it accepts stanzas whose
//! namespaces are inherited from the enclosing stream header and it keeps
//! qualified attribute names such as `xml:lang` verbatim.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::parser::{self, StreamContext};

/// A node inside an element: a child element or a run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Child element
    Element(Element),
    /// Unescaped character data
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// An XML element with a resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    prefix: Option<String>,
    namespace: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Element {
    /// Start building an element with a local name and namespace URI.
    pub fn builder(name: impl Into<String>, ns: impl Into<String>) -> ElementBuilder {
        ElementBuilder {
            element: Element {
                name: name.into(),
                prefix: None,
                namespace: ns.into(),
                attributes: Vec::new(),
                nodes: Vec::new(),
            },
        }
    }

    /// Create an element with no attributes and no children.
    pub fn bare(name: impl Into<String>, ns: impl Into<String>) -> Element {
        Self::builder(name, ns).build()
    }

    /// Parse a single element from raw bytes using the default client stream context.
    pub fn from_xml(input: &[u8]) -> Result<Element, ParseError> {
        parser::parse(input)
    }

    /// Serialize using the default client stream context.
    pub fn to_xml(&self) -> String {
        parser::serialize(self)
    }

    /// Serialize within an explicit stream context.
    pub fn to_xml_with(&self, ctx: &StreamContext) -> String {
        parser::serialize_with(self, ctx)
    }

    /// Local name (without prefix).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix the element was written with, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Namespace URI. Empty when the element is in no namespace.
    pub fn ns(&self) -> &str {
        &self.namespace
    }

    /// Check local name and namespace at once.
    pub fn is(&self, name: &str, ns: &str) -> bool {
        self.name == name && self.namespace == ns
    }

    /// Look up an attribute by its (possibly qualified) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate attributes in order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Iterate all child nodes in order.
    pub fn nodes(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// True when the element has no child nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate child elements in order, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child with the given name and namespace.
    pub fn get_child(&self, name: &str, ns: &str) -> Option<&Element> {
        self.children().find(|child| child.is(name, ns))
    }

    /// Whether a child with the given name and namespace exists.
    pub fn has_child(&self, name: &str, ns: &str) -> bool {
        self.get_child(name, ns).is_some()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Append a child element and return a mutable reference to it.
    pub fn append_child(&mut self, child: Element) -> &mut Element {
        self.nodes.push(Node::Element(child));
        match self.nodes.last_mut() {
            Some(Node::Element(element)) => element,
            _ => unreachable!("just pushed an element"),
        }
    }

    /// Append character data. Adjacent text runs are merged and empty text is dropped.
    pub fn append_text_node(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.nodes.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(&text),
            _ => self.nodes.push(Node::Text(text)),
        }
    }

    fn append_node(&mut self, node: Node) {
        match node {
            Node::Element(child) => {
                self.append_child(child);
            }
            Node::Text(text) => self.append_text_node(text),
        }
    }
}

impl FromStr for Element {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s.as_bytes())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

/// Builder for [`Element`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    element: Element,
}

impl ElementBuilder {
    /// Write the element with a namespace prefix (e.g. `stream`).
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.element.prefix = Some(prefix.into());
        self
    }

    /// Add an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.element.set_attr(name, value);
        self
    }

    /// Append a child element or text.
    pub fn append<N: Into<Node>>(mut self, node: N) -> Self {
        self.element.append_node(node.into());
        self
    }

    /// Append every node from an iterator.
    pub fn append_all<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        for node in nodes {
            self.element.append_node(node.into());
        }
        self
    }

    pub fn build(self) -> Element {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_attribute_order() {
        let elem = Element::builder("identity", "http://jabber.org/protocol/disco#info")
            .attr("xml:lang", "en")
            .attr("category", "client")
            .attr("name", "Psi 0.11")
            .attr("type", "pc")
            .build();

        let names: Vec<_> = elem.attrs().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["xml:lang", "category", "name", "type"]);
        assert_eq!(elem.attr("xml:lang"), Some("en"));
        assert_eq!(elem.attr("missing"), None);
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut elem = Element::builder("iq", "jabber:client")
            .attr("id", "a")
            .attr("type", "get")
            .build();
        elem.set_attr("id", "b");

        let attrs: Vec<_> = elem.attrs().collect();
        assert_eq!(attrs, vec![("id", "b"), ("type", "get")]);
    }

    #[test]
    fn test_empty_attribute_is_present() {
        let elem = Element::builder("iq", "jabber:client").attr("to", "").build();
        assert_eq!(elem.attr("to"), Some(""));
        assert_eq!(elem.attr("from"), None);
    }

    #[test]
    fn test_text_merges_runs_and_skips_empty() {
        let elem = Element::builder("value", "jabber:x:data")
            .append("ipv")
            .append("")
            .append("4")
            .build();

        assert_eq!(elem.nodes().count(), 1);
        assert_eq!(elem.text(), "ipv4");
    }

    #[test]
    fn test_get_child_matches_namespace() {
        let elem = Element::builder("iq", "jabber:client")
            .append(Element::bare("query", "jabber:iq:version"))
            .build();

        assert!(elem.has_child("query", "jabber:iq:version"));
        assert!(elem.get_child("query", "jabber:iq:auth").is_none());
    }

    #[test]
    fn test_append_child_returns_child() {
        let mut elem = Element::bare("mechanisms", "urn:ietf:params:xml:ns:xmpp-sasl");
        elem.append_child(Element::bare("mechanism", "urn:ietf:params:xml:ns:xmpp-sasl"))
            .append_text_node("PLAIN");

        assert_eq!(elem.children().next().map(Element::text), Some("PLAIN".to_string()));
    }
}
