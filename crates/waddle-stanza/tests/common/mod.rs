//! Test utilities for stanza conformance tests.
//!
//! Fixtures are written exactly as a peer would send them inside a client
//! stream: unprefixed stanzas inherit `jabber:client` and the `stream` prefix
//! is already bound.

#![allow(dead_code)]

use waddle_stanza::{Element, Iq, Packet, ParseError};

/// Parse an IQ, re-serialize it, and assert the bytes are unchanged.
pub fn assert_iq_roundtrip(xml: &str) -> Iq {
    let iq = Iq::from_xml(xml.as_bytes())
        .unwrap_or_else(|e| panic!("failed to parse fixture: {e}\n{xml}"));
    assert_eq!(iq.to_xml(), xml, "IQ did not round-trip");
    iq
}

/// Parse a top-level packet, re-serialize it, and assert the bytes are unchanged.
pub fn assert_packet_roundtrip(xml: &str) -> Packet {
    let packet = Packet::from_xml(xml.as_bytes())
        .unwrap_or_else(|e| panic!("failed to parse fixture: {e}\n{xml}"));
    assert_eq!(packet.to_xml(), xml, "packet did not round-trip");
    packet
}

/// Parse both documents and compare the resulting trees.
pub fn same_tree(a: &str, b: &str) -> Result<bool, ParseError> {
    let a = Element::from_xml(a.as_bytes())?;
    let b = Element::from_xml(b.as_bytes())?;
    Ok(a == b)
}
