//! XEP-0092: Software Version

use serde::Serialize;

use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;

/// Namespace for XEP-0092 Software Version
pub const NS_VERSION: &str = "jabber:iq:version";

/// A `jabber:iq:version` query or result.
///
/// A `get` carries an empty query; the result fills in whichever fields the
/// entity chooses to disclose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Version {
    pub name: Option<String>,
    pub version: Option<String>,
    pub os: Option<String>,
}

impl Version {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            os: None,
        }
    }

    pub fn with_os(mut self, os: &str) -> Self {
        self.os = Some(os.to_string());
        self
    }

    /// Empty query, as sent in a `get`.
    pub fn query() -> Self {
        Self::default()
    }
}

impl Extension for Version {
    const NAMESPACE: &'static str = NS_VERSION;
    const NAME: &'static str = "query";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let text = |name: &str| elem.get_child(name, NS_VERSION).map(Element::text);
        Ok(Self {
            name: text("name"),
            version: text("version"),
            os: text("os"),
        })
    }

    fn to_element(&self) -> Element {
        let fields = [("name", &self.name), ("os", &self.os), ("version", &self.version)];

        Element::builder("query", NS_VERSION)
            .append_all(fields.into_iter().filter_map(|(name, value)| {
                value
                    .as_deref()
                    .map(|value| Element::builder(name, NS_VERSION).append(value).build())
            }))
            .build()
    }
}
