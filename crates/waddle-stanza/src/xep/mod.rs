//! XMPP Extension Protocols (XEPs)
//!
//! Payloads and helpers for the extensions this crate understands.
//!
//! ## Implemented XEPs
//!
//! - **XEP-0004**: Data Forms - structured fields carried inside other payloads
//!   (extended disco#info).
//! - **XEP-0078**: Non-SASL Authentication - the legacy `jabber:iq:auth` query
//!   with plaintext or digest credentials.
//! - **XEP-0092**: Software Version - name, version and OS of an entity.
//! - **XEP-0115**: Entity Capabilities - the verification string over a
//!   disco#info result and the `<c/>` element advertising it.
//! - **XEP-0202**: Entity Time - UTC instant and timezone offset.

pub mod xep0004;
pub mod xep0078;
pub mod xep0092;
pub mod xep0115;
pub mod xep0202;

pub use xep0004::{DataForm, FieldType, FormField, FormType, DATA_FORMS_NS, FORM_TYPE};
pub use xep0078::{NonSaslAuth, NS_AUTH};
pub use xep0092::{Version, NS_VERSION};
pub use xep0115::{
    is_caps_node_query, parse_caps_node, verification_string, Caps, CAPS_HASH_SHA1, NS_CAPS,
};
pub use xep0202::{EntityTime, NS_TIME};
