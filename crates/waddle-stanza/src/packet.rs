//! Top-level elements received on a stream.

use serde::Serialize;
use tracing::debug;

use crate::element::Element;
use crate::error::ParseError;
use crate::features::StreamFeatures;
use crate::iq::Iq;
use crate::parser::{self, StreamContext};
use crate::payload::Extension;

/// An `<iq/>` stanza or a `<stream:features/>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Packet {
    Iq(Iq),
    StreamFeatures(StreamFeatures),
}

impl Packet {
    pub fn from_element(elem: &Element) -> Result<Self, ParseError> {
        if StreamFeatures::matches(elem) {
            return StreamFeatures::from_element(elem).map(Packet::StreamFeatures);
        }

        if elem.name() == "iq" {
            return Iq::from_element(elem).map(Packet::Iq);
        }

        debug!(name = %elem.name(), ns = %elem.ns(), "Unsupported top-level element");
        Err(ParseError::unrecognized(elem))
    }

    pub fn to_element_in(&self, stanza_ns: &str) -> Element {
        match self {
            Packet::Iq(iq) => iq.to_element_in(stanza_ns),
            Packet::StreamFeatures(features) => features.to_element(),
        }
    }

    /// Parse standalone bytes from a client stream.
    pub fn from_xml(input: &[u8]) -> Result<Self, ParseError> {
        Self::from_xml_with(input, &StreamContext::default())
    }

    pub fn from_xml_with(input: &[u8], ctx: &StreamContext) -> Result<Self, ParseError> {
        Self::from_element(&parser::parse_with(input, ctx)?)
    }

    /// Serialize for a client stream.
    pub fn to_xml(&self) -> String {
        self.to_xml_with(&StreamContext::default())
    }

    pub fn to_xml_with(&self, ctx: &StreamContext) -> String {
        parser::serialize_with(&self.to_element_in(ctx.default_ns()), ctx)
    }
}

impl From<Iq> for Packet {
    fn from(iq: Iq) -> Self {
        Packet::Iq(iq)
    }
}

impl From<StreamFeatures> for Packet {
    fn from(features: StreamFeatures) -> Self {
        Packet::StreamFeatures(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureMode;

    #[test]
    fn test_dispatch_features() {
        let packet = Packet::from_xml(b"<stream:features><bind xmlns=\"urn:ietf:params:xml:ns:xmpp-bind\"/></stream:features>")
            .unwrap();
        match packet {
            Packet::StreamFeatures(ref features) => assert_eq!(features.bind, FeatureMode::Enabled),
            other => panic!("expected stream features, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_iq() {
        let xml = "<iq id=\"r\" type=\"result\"/>";
        let packet = Packet::from_xml(xml.as_bytes()).unwrap();
        assert!(matches!(packet, Packet::Iq(_)));
        assert_eq!(packet.to_xml(), xml);
    }

    #[test]
    fn test_unsupported_element() {
        assert_eq!(
            Packet::from_xml(b"<presence/>"),
            Err(ParseError::UnrecognizedPayload(
                "<presence xmlns='jabber:client'/>".to_string()
            ))
        );
    }

    #[test]
    fn test_packet_json_shape() {
        let packet: Packet = StreamFeatures::new().with_tls(FeatureMode::Required).into();
        let json = serde_json::to_value(&packet).unwrap();
        assert_eq!(json["kind"], "stream_features");
        assert_eq!(json["data"]["tls"], "required");
    }
}
