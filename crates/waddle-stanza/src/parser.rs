//! XML reading and writing for stanzas using quick-xml.
//!
//! XMPP uses a single long-lived XML document per session: the stream header
//! declares the default namespace and the `stream` prefix, and every stanza
//! inherits them. Standalone stanza bytes therefore have to be read inside a
//! [`StreamContext`] that supplies those bindings, and written back without
//! re-declaring what is already in scope.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::element::{Element, Node};
use crate::error::ParseError;

/// Namespace URIs used in XMPP
pub mod ns {
    /// XMPP client namespace
    pub const JABBER_CLIENT: &str = "jabber:client";
    /// XMPP server namespace
    pub const JABBER_SERVER: &str = "jabber:server";
    /// XMPP streams namespace
    pub const STREAM: &str = "http://etherx.jabber.org/streams";
    /// STARTTLS namespace
    pub const TLS: &str = "urn:ietf:params:xml:ns:xmpp-tls";
    /// SASL namespace
    pub const SASL: &str = "urn:ietf:params:xml:ns:xmpp-sasl";
    /// Resource binding namespace
    pub const BIND: &str = "urn:ietf:params:xml:ns:xmpp-bind";
    /// Session namespace
    pub const SESSION: &str = "urn:ietf:params:xml:ns:xmpp-session";
    /// Stanza error namespace
    pub const STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
    /// Legacy non-SASL authentication stream feature (XEP-0078)
    pub const AUTH_FEATURE: &str = "http://jabber.org/features/iq-auth";
    /// Stream compression feature (XEP-0138)
    pub const COMPRESS_FEATURE: &str = "http://jabber.org/features/compress";
    /// Namespace bound to the reserved `xml` prefix
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Prefix conventionally bound to [`ns::STREAM`].
pub const STREAM_PREFIX: &str = "stream";

/// Namespace bindings in scope for a stanza.
///
/// The default context mirrors a client stream header:
/// `<stream:stream xmlns='jabber:client' xmlns:stream='http://etherx.jabber.org/streams'>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamContext {
    default_ns: String,
    prefixes: Vec<(String, String)>,
}

impl StreamContext {
    /// Context with the given default namespace and the `stream` prefix bound.
    pub fn new(default_ns: impl Into<String>) -> Self {
        Self {
            default_ns: default_ns.into(),
            prefixes: vec![(STREAM_PREFIX.to_string(), ns::STREAM.to_string())],
        }
    }

    /// Client-to-server stream (`jabber:client`).
    pub fn client() -> Self {
        Self::new(ns::JABBER_CLIENT)
    }

    /// Server-to-server stream (`jabber:server`).
    pub fn server() -> Self {
        Self::new(ns::JABBER_SERVER)
    }

    /// Bind an additional prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>, ns: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), ns.into()));
        self
    }

    /// Namespace of unprefixed elements.
    pub fn default_ns(&self) -> &str {
        &self.default_ns
    }

    /// Resolve a prefix; later bindings shadow earlier ones.
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(ns::XML);
        }
        self.prefixes
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn bind(&mut self, prefix: &str, uri: &str) {
        self.prefixes.push((prefix.to_string(), uri.to_string()));
    }
}

impl Default for StreamContext {
    fn default() -> Self {
        Self::client()
    }
}

/// Parse bytes into an element within the client stream context.
pub fn parse(input: &[u8]) -> Result<Element, ParseError> {
    parse_with(input, &StreamContext::default())
}

/// Parse bytes into an element within an explicit stream context.
///
/// Exactly one root element is accepted. Comments, processing instructions
/// and the XML declaration are skipped.
pub fn parse_with(input: &[u8], ctx: &StreamContext) -> Result<Element, ParseError> {
    let text = std::str::from_utf8(input).map_err(ParseError::malformed)?;
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<(Element, StreamContext)> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let opened = {
                    let scope = stack.last().map(|(_, scope)| scope).unwrap_or(ctx);
                    open_element(&start, scope)?
                };
                stack.push(opened);
            }
            Ok(Event::Empty(start)) => {
                let (element, _) = {
                    let scope = stack.last().map(|(_, scope)| scope).unwrap_or(ctx);
                    open_element(&start, scope)?
                };
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let (element, _) = stack
                    .pop()
                    .ok_or_else(|| ParseError::malformed("unexpected closing tag"))?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(ParseError::malformed)?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::CData(cdata)) => {
                let text = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(ParseError::malformed)?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::malformed(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if let Some((element, _)) = stack.last() {
        return Err(ParseError::malformed(format!(
            "unclosed element <{}>",
            element.name()
        )));
    }

    root.ok_or_else(|| ParseError::malformed("no root element"))
}

fn open_element(
    start: &BytesStart<'_>,
    parent: &StreamContext,
) -> Result<(Element, StreamContext), ParseError> {
    let mut scope = parent.clone();

    let qname = start.name();
    let raw_name = std::str::from_utf8(qname.into_inner())
        .map_err(ParseError::malformed)?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(ParseError::malformed)?;
        let key = std::str::from_utf8(attr.key.into_inner())
            .map_err(ParseError::malformed)?
            .to_string();
        let value = attr.unescape_value().map_err(ParseError::malformed)?.into_owned();

        if key == "xmlns" {
            scope.default_ns = value;
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.bind(prefix, &value);
        } else {
            attributes.push((key, value));
        }
    }

    let (prefix, name) = match raw_name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, raw_name),
    };

    let namespace = match &prefix {
        Some(prefix) => scope
            .resolve_prefix(prefix)
            .ok_or_else(|| {
                ParseError::malformed(format!("unbound namespace prefix '{}'", prefix))
            })?
            .to_string(),
        None => scope.default_ns.clone(),
    };

    let mut builder = Element::builder(name, namespace);
    if let Some(prefix) = prefix {
        builder = builder.prefix(prefix);
    }
    for (key, value) in attributes {
        builder = builder.attr(key, value);
    }

    Ok((builder.build(), scope))
}

fn attach(
    element: Element,
    stack: &mut [(Element, StreamContext)],
    root: &mut Option<Element>,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some((parent, _)) => {
            parent.append_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseError::malformed("multiple root elements")),
    }
}

fn append_text(stack: &mut [(Element, StreamContext)], text: &str) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some((parent, _)) => {
            parent.append_text_node(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::malformed("text outside of the root element")),
    }
}

/// Serialize an element within the client stream context.
pub fn serialize(element: &Element) -> String {
    serialize_with(element, &StreamContext::default())
}

/// Serialize an element, declaring only the namespaces not already in scope.
///
/// Namespace declarations come first, then attributes in insertion order.
/// Elements without child nodes are self-closed.
pub fn serialize_with(element: &Element, ctx: &StreamContext) -> String {
    let mut out = String::new();
    write_element(element, ctx, &mut out);
    out
}

fn write_element(element: &Element, scope: &StreamContext, out: &mut String) {
    let mut inner = scope.clone();

    let qualified = match element.prefix() {
        Some(prefix) => format!("{}:{}", prefix, element.name()),
        None => element.name().to_string(),
    };

    out.push('<');
    out.push_str(&qualified);

    match element.prefix() {
        Some(prefix) => {
            if scope.resolve_prefix(prefix) != Some(element.ns()) {
                write_attr(out, &format!("xmlns:{}", prefix), element.ns());
                inner.bind(prefix, element.ns());
            }
        }
        None => {
            if scope.default_ns() != element.ns() {
                write_attr(out, "xmlns", element.ns());
                inner.default_ns = element.ns().to_string();
            }
        }
    }

    for (name, value) in element.attrs() {
        write_attr(out, name, value);
    }

    if element.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for node in element.nodes() {
        match node {
            Node::Element(child) => write_element(child, &inner, out),
            Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        }
    }
    out.push_str("</");
    out.push_str(&qualified);
    out.push('>');
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
