//! Service Discovery (XEP-0030).
//!
//! - **disco#info**: identities, features and an optional extended-info data
//!   form (XEP-0128), the input to the XEP-0115 verification string
//! - **disco#items**: items (JIDs/nodes) hosted by an entity

pub mod info;
pub mod items;

pub use info::{DiscoInfo, Feature, Identity, DISCO_INFO_NS};
pub use items::{DiscoItem, DiscoItems, DISCO_ITEMS_NS};
