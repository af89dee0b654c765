//! RFC 3921 session establishment (`<session xmlns='urn:ietf:params:xml:ns:xmpp-session'/>`).

use serde::Serialize;

use crate::element::Element;
use crate::error::ParseError;
use crate::parser::ns;
use crate::payload::Extension;

/// Session establishment request. Carries no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Session;

impl Extension for Session {
    const NAMESPACE: &'static str = ns::SESSION;
    const NAME: &'static str = "session";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;
        Ok(Session)
    }

    fn to_element(&self) -> Element {
        Element::bare(Self::NAME, Self::NAMESPACE)
    }
}
