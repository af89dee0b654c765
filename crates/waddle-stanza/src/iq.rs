//! The `<iq/>` envelope.
//!
//! An IQ carries at most one typed [`Payload`] plus an optional wire
//! [`StanzaError`]. Payload children are dispatched through the registry in
//! [`crate::payload`]; children nothing is registered for are skipped so that
//! stanzas from newer peers still parse.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::element::Element;
use crate::error::{ParseError, StanzaError};
use crate::parser::{self, ns, StreamContext};
use crate::payload::{IqPayload, Payload};

/// The IQ `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IqType {
    Get,
    Set,
    Result,
    Error,
}

impl IqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IqType::Get => "get",
            IqType::Set => "set",
            IqType::Result => "result",
            IqType::Error => "error",
        }
    }

    /// `get` and `set` are requests and must carry a payload.
    pub fn is_request(&self) -> bool {
        matches!(self, IqType::Get | IqType::Set)
    }
}

impl FromStr for IqType {
    type Err = ParseError;

    /// Case-sensitive: `GET` is not a valid type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(IqType::Get),
            "set" => Ok(IqType::Set),
            "result" => Ok(IqType::Result),
            "error" => Ok(IqType::Error),
            other => Err(ParseError::UnknownStanzaType(Some(other.to_string()))),
        }
    }
}

impl fmt::Display for IqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An IQ stanza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Iq {
    pub id: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
    #[serde(rename = "type")]
    pub type_: IqType,
    pub payload: Option<Payload>,
    pub error: Option<StanzaError>,
}

impl Iq {
    /// Empty IQ of the given type.
    pub fn new(type_: IqType) -> Self {
        Self {
            id: None,
            to: None,
            from: None,
            type_,
            payload: None,
            error: None,
        }
    }

    /// `get` request carrying `payload`.
    pub fn get(payload: impl Into<Payload>) -> Self {
        Self::new(IqType::Get).with_payload(payload)
    }

    /// `set` request carrying `payload`.
    pub fn set(payload: impl Into<Payload>) -> Self {
        Self::new(IqType::Set).with_payload(payload)
    }

    /// Empty `result`.
    pub fn result() -> Self {
        Self::new(IqType::Result)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_error(mut self, error: StanzaError) -> Self {
        self.error = Some(error);
        self
    }

    /// Borrow the payload as `T` if that is what the IQ carries.
    ///
    /// ```
    /// use waddle_stanza::iq::Iq;
    /// use waddle_stanza::xep::xep0092::Version;
    ///
    /// let iq = Iq::get(Version::query()).with_id("v1");
    /// assert!(iq.payload_as::<Version>().is_some());
    /// ```
    pub fn payload_as<T: IqPayload>(&self) -> Option<&T> {
        self.payload.as_ref().and_then(T::peek)
    }

    /// `result` addressed back to the sender, with the same id.
    pub fn reply(&self, payload: Option<Payload>) -> Iq {
        Iq {
            id: self.id.clone(),
            to: self.from.clone(),
            from: self.to.clone(),
            type_: IqType::Result,
            payload,
            error: None,
        }
    }

    /// `error` addressed back to the sender, with the same id.
    pub fn error_reply(&self, error: StanzaError) -> Iq {
        Iq {
            type_: IqType::Error,
            error: Some(error),
            ..self.reply(None)
        }
    }

    /// Parse from an `<iq/>` element in any stanza namespace.
    pub fn from_element(elem: &Element) -> Result<Self, ParseError> {
        if elem.name() != "iq" {
            return Err(ParseError::unexpected("iq", elem));
        }

        let type_ = elem
            .attr("type")
            .ok_or(ParseError::UnknownStanzaType(None))?
            .parse::<IqType>()?;

        let mut iq = Iq::new(type_);
        iq.id = elem.attr("id").map(str::to_string);
        iq.to = elem.attr("to").map(str::to_string);
        iq.from = elem.attr("from").map(str::to_string);

        let mut has_child = false;
        for child in elem.children() {
            if child.is("error", elem.ns()) {
                iq.error = Some(StanzaError::from_element(child)?);
                continue;
            }
            has_child = true;

            if !Payload::is_registered(child) {
                let unrecognized = ParseError::unrecognized(child);
                debug!(id = ?iq.id, error = %unrecognized, "Ignoring IQ payload");
            } else if iq.payload.is_none() {
                iq.payload = Some(Payload::from_element(child)?);
            }
        }

        if !has_child && type_.is_request() {
            return Err(ParseError::UnrecognizedPayload(format!(
                "<iq type='{}'/> has no payload",
                type_
            )));
        }

        Ok(iq)
    }

    /// Build the `<iq/>` element in the client namespace.
    pub fn to_element(&self) -> Element {
        self.to_element_in(ns::JABBER_CLIENT)
    }

    /// Build the `<iq/>` element in the given stanza namespace.
    ///
    /// Attributes are written `id, to, from, type`; the payload precedes the error.
    pub fn to_element_in(&self, stanza_ns: &str) -> Element {
        let mut builder = Element::builder("iq", stanza_ns);

        if let Some(ref id) = self.id {
            builder = builder.attr("id", id);
        }
        if let Some(ref to) = self.to {
            builder = builder.attr("to", to);
        }
        if let Some(ref from) = self.from {
            builder = builder.attr("from", from);
        }
        builder = builder.attr("type", self.type_.as_str());

        if let Some(ref payload) = self.payload {
            builder = builder.append(payload.to_element());
        }
        if let Some(ref error) = self.error {
            builder = builder.append(error.to_element(stanza_ns));
        }

        builder.build()
    }

    /// Parse standalone IQ bytes from a client stream.
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
