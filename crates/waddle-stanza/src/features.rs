//! Stream features (`<stream:features/>`).
//!
//! Sent by the server after each stream header to advertise what the client
//! may negotiate next:
//!
//! ```xml
//! <stream:features>
//!   <starttls xmlns='urn:ietf:params:xml:ns:xmpp-tls'><required/></starttls>
//!   <mechanisms xmlns='urn:ietf:params:xml:ns:xmpp-sasl'>
//!     <mechanism>PLAIN</mechanism>
//!   </mechanisms>
//! </stream:features>
//! ```

use serde::Serialize;
use tracing::debug;

use crate::element::Element;
use crate::error::ParseError;
use crate::parser::{ns, STREAM_PREFIX};
use crate::payload::Extension;

/// Whether a negotiable feature is offered, and whether it must be negotiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    /// Not advertised
    #[default]
    Disabled,
    /// Advertised, optional
    Enabled,
    /// Advertised with a `<required/>` child
    Required,
}

impl FeatureMode {
    /// Advertised at all.
    pub fn is_offered(&self) -> bool {
        !matches!(self, FeatureMode::Disabled)
    }

    fn from_child(parent: &Element, name: &str, namespace: &str) -> Self {
        match parent.get_child(name, namespace) {
            None => FeatureMode::Disabled,
            Some(child) if child.has_child("required", namespace) => FeatureMode::Required,
            Some(_) => FeatureMode::Enabled,
        }
    }

    fn to_child(self, name: &str, namespace: &str) -> Option<Element> {
        match self {
            FeatureMode::Disabled => None,
            FeatureMode::Enabled => Some(Element::bare(name, namespace)),
            FeatureMode::Required => Some(
                Element::builder(name, namespace)
                    .append(Element::bare("required", namespace))
                    .build(),
            ),
        }
    }
}

/// Parsed `<stream:features/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamFeatures {
    /// Resource binding
    pub bind: FeatureMode,
    /// Session establishment
    pub session: FeatureMode,
    /// Legacy `jabber:iq:auth` login
    pub non_sasl_auth: FeatureMode,
    /// STARTTLS
    pub tls: FeatureMode,
    /// SASL mechanism names, in advertised order
    pub mechanisms: Vec<String>,
    /// Stream compression methods, in advertised order
    pub compression_methods: Vec<String>,
}

impl StreamFeatures {
    /// Nothing advertised.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind(mut self, mode: FeatureMode) -> Self {
        self.bind = mode;
        self
    }

    pub fn with_session(mut self, mode: FeatureMode) -> Self {
        self.session = mode;
        self
    }

    pub fn with_non_sasl_auth(mut self, mode: FeatureMode) -> Self {
        self.non_sasl_auth = mode;
        self
    }

    pub fn with_tls(mut self, mode: FeatureMode) -> Self {
        self.tls = mode;
        self
    }

    pub fn with_mechanisms<I, S>(mut self, mechanisms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mechanisms.extend(mechanisms.into_iter().map(Into::into));
        self
    }

    pub fn with_compression_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compression_methods.extend(methods.into_iter().map(Into::into));
        self
    }
}

fn collect_texts(parent: &Element, container: &str, item: &str, namespace: &str) -> Vec<String> {
    parent
        .get_child(container, namespace)
        .map(|list| {
            list.children()
                .filter(|child| child.is(item, namespace))
                .map(Element::text)
                .collect()
        })
        .unwrap_or_default()
}

fn text_list(container: &str, item: &str, namespace: &str, values: &[String]) -> Option<Element> {
    if values.is_empty() {
        return None;
    }

    Some(
        Element::builder(container, namespace)
            .append_all(
                values
                    .iter()
                    .map(|value| Element::builder(item, namespace).append(value.as_str()).build()),
            )
            .build(),
    )
}

impl Extension for StreamFeatures {
    const NAMESPACE: &'static str = ns::STREAM;
    const NAME: &'static str = "features";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let features = Self {
            bind: FeatureMode::from_child(elem, "bind", ns::BIND),
            session: FeatureMode::from_child(elem, "session", ns::SESSION),
            non_sasl_auth: FeatureMode::from_child(elem, "auth", ns::AUTH_FEATURE),
            tls: FeatureMode::from_child(elem, "starttls", ns::TLS),
            mechanisms: collect_texts(elem, "mechanisms", "mechanism", ns::SASL),
            compression_methods: collect_texts(elem, "compression", "method", ns::COMPRESS_FEATURE),
        };

        debug!(
            tls = ?features.tls,
            bind = ?features.bind,
            mechanisms = ?features.mechanisms,
            "Parsed stream features"
        );

        Ok(features)
    }

    fn to_element(&self) -> Element {
        let children = [
            self.bind.to_child("bind", ns::BIND),
            self.session.to_child("session", ns::SESSION),
            self.non_sasl_auth.to_child("auth", ns::AUTH_FEATURE),
            self.tls.to_child("starttls", ns::TLS),
            text_list("compression", "method", ns::COMPRESS_FEATURE, &self.compression_methods),
            text_list("mechanisms", "mechanism", ns::SASL, &self.mechanisms),
        ];

        Element::builder(Self::NAME, Self::NAMESPACE)
            .prefix(STREAM_PREFIX)
            .append_all(children.into_iter().flatten())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_features() {
        let features = StreamFeatures::from_xml(b"<stream:features/>").unwrap();

        assert_eq!(features.bind, FeatureMode::Disabled);
        assert_eq!(features.session, FeatureMode::Disabled);
        assert_eq!(features.non_sasl_auth, FeatureMode::Disabled);
        assert_eq!(features.tls, FeatureMode::Disabled);
        assert!(features.mechanisms.is_empty());
        assert!(features.compression_methods.is_empty());
        assert_eq!(features.to_xml(), "<stream:features/>");
    }

    #[test]
    fn test_all_features_enabled() {
        let xml = "<stream:features>\
                   <bind xmlns=\"urn:ietf:params:xml:ns:xmpp-bind\"/>\
                   <session xmlns=\"urn:ietf:params:xml:ns:xmpp-session\"/>\
                   <auth xmlns=\"http://jabber.org/features/iq-auth\"/>\
                   <starttls xmlns=\"urn:ietf:params:xml:ns:xmpp-tls\"/>\
                   <compression xmlns=\"http://jabber.org/features/compress\"><method>zlib</method></compression>\
                   <mechanisms xmlns=\"urn:ietf:params:xml:ns:xmpp-sasl\"><mechanism>PLAIN</mechanism></mechanisms>\
                   </stream:features>";
        let features = StreamFeatures::from_xml(xml.as_bytes()).unwrap();

        let expected = StreamFeatures::new()
            .with_bind(FeatureMode::Enabled)
            .with_session(FeatureMode::Enabled)
            .with_non_sasl_auth(FeatureMode::Enabled)
            .with_tls(FeatureMode::Enabled)
            .with_mechanisms(["PLAIN"])
            .with_compression_methods(["zlib"]);
        assert_eq!(features, expected);
        assert_eq!(features.to_xml(), xml);
    }

    #[test]
    fn test_required_starttls() {
        let xml = "<stream:features>\
                   <starttls xmlns=\"urn:ietf:params:xml:ns:xmpp-tls\"><required/></starttls>\
                   <mechanisms xmlns=\"urn:ietf:params:xml:ns:xmpp-sasl\">\
                   <mechanism>SCRAM-SHA-1</mechanism><mechanism>PLAIN</mechanism>\
                   </mechanisms>\
                   </stream:features>";
        let features = StreamFeatures::from_xml(xml.as_bytes()).unwrap();

        assert_eq!(features.tls, FeatureMode::Required);
        assert!(features.tls.is_offered());
        assert_eq!(features.mechanisms, vec!["SCRAM-SHA-1", "PLAIN"]);
        assert_eq!(features.to_xml(), xml);
    }

    #[test]
    fn test_unknown_features_ignored() {
        let xml = "<stream:features>\
                   <sm xmlns=\"urn:xmpp:sm:3\"/>\
                   <bind xmlns=\"urn:ietf:params:xml:ns:xmpp-bind\"/>\
                   </stream:features>";
        let features = StreamFeatures::from_xml(xml.as_bytes()).unwrap();

        assert_eq!(features, StreamFeatures::new().with_bind(FeatureMode::Enabled));
    }

    #[test]
    fn test_feature_in_wrong_namespace_is_disabled() {
        let xml = "<stream:features><bind xmlns=\"urn:example:bind\"/></stream:features>";
        let features = StreamFeatures::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(features.bind, FeatureMode::Disabled);
    }

    #[test]
    fn test_explicit_stream_namespace_declaration() {
        let xml = "<stream:features xmlns:stream=\"http://etherx.jabber.org/streams\"/>";
        assert_eq!(StreamFeatures::from_xml(xml.as_bytes()), Ok(StreamFeatures::new()));
    }
}
