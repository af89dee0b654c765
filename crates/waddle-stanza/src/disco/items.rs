//! Service Discovery: disco#items payload.

use serde::Serialize;
use tracing::debug;

use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;

/// Service Discovery items namespace (XEP-0030).
pub const DISCO_ITEMS_NS: &str = "http://jabber.org/protocol/disco#items";

/// Item element for disco#items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoItem {
    /// JID of the item
    pub jid: String,
    /// Optional node identifier
    pub node: Option<String>,
    /// Optional name (human-readable)
    pub name: Option<String>,
}

impl DiscoItem {
    /// Create a new disco item.
    pub fn new(jid: &str, name: Option<&str>, node: Option<&str>) -> Self {
        Self {
            jid: jid.to_string(),
            node: node.map(|s| s.to_string()),
            name: name.map(|s| s.to_string()),
        }
    }
}

/// A disco#items query or result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoItems {
    pub node: Option<String>,
    pub items: Vec<DiscoItem>,
}

impl DiscoItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_item(mut self, item: DiscoItem) -> Self {
        self.items.push(item);
        self
    }
}

impl Extension for DiscoItems {
    const NAMESPACE: &'static str = DISCO_ITEMS_NS;
    const NAME: &'static str = "query";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let items = elem
            .children()
            .filter(|child| child.is("item", DISCO_ITEMS_NS))
            .map(|item| {
                let jid = item
                    .attr("jid")
                    .ok_or_else(|| ParseError::missing("item", "jid"))?;
                Ok(DiscoItem::new(jid, item.attr("name"), item.attr("node")))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let node = elem.attr("node").map(str::to_string);
        debug!(node = ?node, items = items.len(), "Parsed disco#items");

        Ok(Self { node, items })
    }

    fn to_element(&self) -> Element {
        let mut builder = Element::builder("query", DISCO_ITEMS_NS);

        if let Some(ref node) = self.node {
            builder = builder.attr("node", node);
        }

        for item in &self.items {
            let mut item_builder = Element::builder("item", DISCO_ITEMS_NS).attr("jid", &item.jid);

            if let Some(ref node) = item.node {
                item_builder = item_builder.attr("node", node);
            }

            if let Some(ref name) = item.name {
                item_builder = item_builder.attr("name", name);
            }

            builder = builder.append(item_builder.build());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disco_items_roundtrip() {
        let xml = "<query xmlns=\"http://jabber.org/protocol/disco#items\" node=\"rooms\">\
                   <item jid=\"lobby@muc.example.com\" name=\"Lobby\"/>\
                   <item jid=\"pubsub.example.com\" node=\"blog\"/>\
                   </query>";

        let items = DiscoItems::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(items.node.as_deref(), Some("rooms"));
        assert_eq!(
            items.items,
            vec![
                DiscoItem::new("lobby@muc.example.com", Some("Lobby"), None),
                DiscoItem::new("pubsub.example.com", None, Some("blog")),
            ]
        );
        assert_eq!(items.to_xml(), xml);
    }

    #[test]
    fn test_disco_item_requires_jid() {
        let xml = "<query xmlns=\"http://jabber.org/protocol/disco#items\"><item name=\"x\"/></query>";
        assert_eq!(
            DiscoItems::from_xml(xml.as_bytes()),
            Err(ParseError::missing("item", "jid"))
        );
    }

    #[test]
    fn test_empty_items_query() {
        let items = DiscoItems::new();
        assert_eq!(
            items.to_xml(),
            "<query xmlns=\"http://jabber.org/protocol/disco#items\"/>"
        );
    }
}
