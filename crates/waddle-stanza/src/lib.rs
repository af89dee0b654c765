//! # waddle-stanza
//!
//! XMPP stanza model for Waddle Social.
//!
//! A small element tree with exact XML round-tripping, the `<iq/>` envelope,
//! typed payload extensions dispatched by `(namespace, name)`, and the
//! XEP-0115 capability verification string.
//!
//! ## Architecture
//!
//! - **Element Model**: [`element::Element`] read and written by [`parser`]
//!   inside a [`parser::StreamContext`] (the stream header's namespace bindings)
//! - **Envelope**: [`iq::Iq`] with id/to/from/type, one optional payload and an
//!   optional wire error
//! - **Extensions**: [`payload::Extension`] implemented by each payload, with a
//!   static registry behind [`payload::Payload::from_element`]
//! - **Packets**: [`packet::Packet`] for callers that receive either an IQ or
//!   stream features
//!
//! ## Supported payloads
//!
//! - RFC 6120 stream features, RFC 3921 session establishment
//! - XEP-0004 (Data Forms)
//! - XEP-0030 (Service Discovery)
//! - XEP-0078 (Non-SASL Authentication)
//! - XEP-0092 (Software Version)
//! - XEP-0115 (Entity Capabilities)
//! - XEP-0202 (Entity Time)
//!
//! ## Example
//!
//! ```
//! use waddle_stanza::{Iq, IqType};
//! use waddle_stanza::xep::xep0092::Version;
//!
//! let xml = "<iq id=\"version_1\" type=\"get\"><query xmlns=\"jabber:iq:version\"/></iq>";
//! let iq = Iq::from_xml(xml.as_bytes()).unwrap();
//!
//! assert_eq!(iq.type_, IqType::Get);
//! assert!(iq.payload_as::<Version>().is_some());
//! assert_eq!(iq.to_xml(), xml);
//! ```

pub mod disco;
pub mod element;
pub mod features;
pub mod iq;
pub mod packet;
pub mod parser;
pub mod payload;
pub mod session;
pub mod xep;

mod error;

pub use element::{Element, ElementBuilder, Node};
pub use error::{ParseError, StanzaError, StanzaErrorCondition, StanzaErrorType};
pub use features::{FeatureMode, StreamFeatures};
pub use iq::{Iq, IqType};
pub use packet::Packet;
pub use parser::{ns, StreamContext};
pub use payload::{Extension, IqPayload, Payload};
pub use session::Session;
