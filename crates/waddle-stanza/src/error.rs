//! Error types for stanza parsing and the wire-level `<error/>` element.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::element::Element;
use crate::parser::ns;

/// Errors raised while turning XML into stanza values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is not well-formed XML (or uses an unbound prefix)
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The `type` attribute is absent or not one of the recognised values
    #[error("unknown stanza type: {}", .0.as_deref().unwrap_or("<absent>"))]
    UnknownStanzaType(Option<String>),

    /// No registered extension matches the payload element
    #[error("unrecognized payload: {0}")]
    UnrecognizedPayload(String),

    /// A required attribute or child is missing
    #[error("<{element}/> is missing required field '{field}'")]
    MissingRequiredField {
        element: &'static str,
        field: &'static str,
    },

    /// A field is present but its value cannot be interpreted
    #[error("invalid value for '{field}': {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// A parser was handed an element it does not handle
    #[error("expected <{expected}/>, found <{found}/>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },
}

impl ParseError {
    /// Create a new malformed XML error.
    pub fn malformed(msg: impl fmt::Display) -> Self {
        Self::MalformedXml(msg.to_string())
    }

    /// Create a missing required field error.
    pub fn missing(element: &'static str, field: &'static str) -> Self {
        Self::MissingRequiredField { element, field }
    }

    /// Create an invalid value error.
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }

    /// Describe an element that no extension claims.
    pub fn unrecognized(element: &Element) -> Self {
        Self::UnrecognizedPayload(format!("<{} xmlns='{}'/>", element.name(), element.ns()))
    }

    /// Create an unexpected element error.
    pub fn unexpected(expected: &'static str, found: &Element) -> Self {
        Self::UnexpectedElement {
            expected,
            found: format!("{} xmlns='{}'", found.name(), found.ns()),
        }
    }
}

/// XMPP stanza error conditions (RFC 6120 Section 8.3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StanzaErrorCondition {
    /// Bad request (malformed XML, etc.)
    BadRequest,
    /// Conflict (e.g., resource already bound)
    Conflict,
    /// Feature not implemented
    FeatureNotImplemented,
    /// Forbidden (permission denied)
    Forbidden,
    /// Gone (entity no longer available)
    Gone,
    /// Internal server error
    InternalServerError,
    /// Item not found
    ItemNotFound,
    /// JID malformed
    JidMalformed,
    /// Not acceptable
    NotAcceptable,
    /// Not allowed
    NotAllowed,
    /// Not authorized
    NotAuthorized,
    /// Policy violation
    PolicyViolation,
    /// Recipient unavailable
    RecipientUnavailable,
    /// Redirect
    Redirect,
    /// Registration required
    RegistrationRequired,
    /// Remote server not found
    RemoteServerNotFound,
    /// Remote server timeout
    RemoteServerTimeout,
    /// Resource constraint
    ResourceConstraint,
    /// Service unavailable
    ServiceUnavailable,
    /// Subscription required
    SubscriptionRequired,
    /// Undefined condition
    UndefinedCondition,
    /// Unexpected request
    UnexpectedRequest,
}

impl StanzaErrorCondition {
    const ALL: [StanzaErrorCondition; 22] = [
        Self::BadRequest,
        Self::Conflict,
        Self::FeatureNotImplemented,
        Self::Forbidden,
        Self::Gone,
        Self::InternalServerError,
        Self::ItemNotFound,
        Self::JidMalformed,
        Self::NotAcceptable,
        Self::NotAllowed,
        Self::NotAuthorized,
        Self::PolicyViolation,
        Self::RecipientUnavailable,
        Self::Redirect,
        Self::RegistrationRequired,
        Self::RemoteServerNotFound,
        Self::RemoteServerTimeout,
        Self::ResourceConstraint,
        Self::ServiceUnavailable,
        Self::SubscriptionRequired,
        Self::UndefinedCondition,
        Self::UnexpectedRequest,
    ];

    /// Get the element name for this condition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad-request",
            Self::Conflict => "conflict",
            Self::FeatureNotImplemented => "feature-not-implemented",
            Self::Forbidden => "forbidden",
            Self::Gone => "gone",
            Self::InternalServerError => "internal-server-error",
            Self::ItemNotFound => "item-not-found",
            Self::JidMalformed => "jid-malformed",
            Self::NotAcceptable => "not-acceptable",
            Self::NotAllowed => "not-allowed",
            Self::NotAuthorized => "not-authorized",
            Self::PolicyViolation => "policy-violation",
            Self::RecipientUnavailable => "recipient-unavailable",
            Self::Redirect => "redirect",
            Self::RegistrationRequired => "registration-required",
            Self::RemoteServerNotFound => "remote-server-not-found",
            Self::RemoteServerTimeout => "remote-server-timeout",
            Self::ResourceConstraint => "resource-constraint",
            Self::ServiceUnavailable => "service-unavailable",
            Self::SubscriptionRequired => "subscription-required",
            Self::UndefinedCondition => "undefined-condition",
            Self::UnexpectedRequest => "unexpected-request",
        }
    }
}

impl FromStr for StanzaErrorCondition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|condition| condition.as_str() == s)
            .ok_or_else(|| ParseError::invalid("condition", s))
    }
}

impl fmt::Display for StanzaErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// XMPP stanza error types (RFC 6120 Section 8.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StanzaErrorType {
    /// Retry after providing credentials
    Auth,
    /// Do not retry (unrecoverable error)
    Cancel,
    /// Proceed (the condition was only a warning)
    Continue,
    /// Retry after changing the data sent
    Modify,
    /// Retry after waiting (temporary error)
    Wait,
}

impl StanzaErrorType {
    /// Get the type attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Cancel => "cancel",
            Self::Continue => "continue",
            Self::Modify => "modify",
            Self::Wait => "wait",
        }
    }
}

impl FromStr for StanzaErrorType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(Self::Auth),
            "cancel" => Ok(Self::Cancel),
            "continue" => Ok(Self::Continue),
            "modify" => Ok(Self::Modify),
            "wait" => Ok(Self::Wait),
            other => Err(ParseError::invalid("error type", other)),
        }
    }
}

impl fmt::Display for StanzaErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<error/>` child carried by an error stanza.
///
/// ```xml
/// <error type='cancel'>
///   <item-not-found xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/>
///   <text xmlns='urn:ietf:params:xml:ns:xmpp-stanzas' xml:lang='en'>No such node</text>
/// </error>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StanzaError {
    #[serde(rename = "type")]
    pub type_: StanzaErrorType,
    pub condition: StanzaErrorCondition,
    /// Human-readable description
    pub text: Option<String>,
    /// `xml:lang` of the description
    pub lang: Option<String>,
}

impl StanzaError {
    pub fn new(type_: StanzaErrorType, condition: StanzaErrorCondition) -> Self {
        Self {
            type_,
            condition,
            text: None,
            lang: None,
        }
    }

    /// Attach a description with an optional language tag.
    pub fn with_text(mut self, text: impl Into<String>, lang: Option<&str>) -> Self {
        self.text = Some(text.into());
        self.lang = lang.map(str::to_string);
        self
    }

    /// 'bad-request' (modify).
    pub fn bad_request() -> Self {
        Self::new(StanzaErrorType::Modify, StanzaErrorCondition::BadRequest)
    }

    /// 'item-not-found' (cancel).
    pub fn item_not_found() -> Self {
        Self::new(StanzaErrorType::Cancel, StanzaErrorCondition::ItemNotFound)
    }

    /// 'feature-not-implemented' (cancel).
    pub fn feature_not_implemented() -> Self {
        Self::new(StanzaErrorType::Cancel, StanzaErrorCondition::FeatureNotImplemented)
    }

    /// 'not-authorized' (auth).
    pub fn not_authorized() -> Self {
        Self::new(StanzaErrorType::Auth, StanzaErrorCondition::NotAuthorized)
    }

    /// 'service-unavailable' (cancel).
    pub fn service_unavailable() -> Self {
        Self::new(StanzaErrorType::Cancel, StanzaErrorCondition::ServiceUnavailable)
    }

    /// Parse an `<error/>` element in the given stanza namespace.
    pub fn from_element(elem: &Element) -> Result<Self, ParseError> {
        if elem.name() != "error" {
            return Err(ParseError::unexpected("error", elem));
        }

        let type_ = elem
            .attr("type")
            .ok_or_else(|| ParseError::missing("error", "type"))?
            .parse::<StanzaErrorType>()?;

        let mut condition: Option<StanzaErrorCondition> = None;
        let mut text = None;
        let mut lang = None;
        for child in elem.children().filter(|c| c.ns() == ns::STANZAS) {
            if child.name() == "text" {
                text = Some(child.text());
                lang = child.attr("xml:lang").map(str::to_string);
            } else if condition.is_none() {
                condition = Some(child.name().parse::<StanzaErrorCondition>()?);
            }
        }

        Ok(Self {
            type_,
            condition: condition.ok_or_else(|| ParseError::missing("error", "condition"))?,
            text,
            lang,
        })
    }

    /// Build the `<error/>` element in the given stanza namespace.
    pub fn to_element(&self, stanza_ns: &str) -> Element {
        let mut builder = Element::builder("error", stanza_ns)
            .attr("type", self.type_.as_str())
            .append(Element::bare(self.condition.as_str(), ns::STANZAS));

        if let Some(ref text) = self.text {
            let mut text_builder = Element::builder("text", ns::STANZAS);
            if let Some(ref lang) = self.lang {
                text_builder = text_builder.attr("xml:lang", lang.as_str());
            }
            builder = builder.append(text_builder.append(text.as_str()).build());
        }

        builder.build()
    }
}

impl fmt::Display for StanzaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.condition, self.type_)?;
        if let Some(ref text) = self.text {
            write!(f, ": {}", text)?;
        }
        Ok(())
    }
}
