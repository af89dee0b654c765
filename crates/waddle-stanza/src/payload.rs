//! Extension contract and IQ payload dispatch.
//!
//! Every payload type implements [`Extension`]: a fixed `(namespace, name)`
//! pair for its root element plus a parser and a builder. IQ payloads are a
//! closed set collected in [`Payload`]; the `(namespace, name)` to parser
//! mapping lives in a static table, so adding a payload means adding a
//! variant and a table entry.

use serde::Serialize;
use tracing::debug;

use crate::disco::{DiscoInfo, DiscoItems};
use crate::element::Element;
use crate::error::ParseError;
use crate::parser;
use crate::session::Session;
use crate::xep::xep0078::NonSaslAuth;
use crate::xep::xep0092::Version;
use crate::xep::xep0202::EntityTime;

/// A typed XML extension rooted at a single element.
pub trait Extension: Sized {
    /// Namespace of the root element.
    const NAMESPACE: &'static str;
    /// Local name of the root element.
    const NAME: &'static str;

    /// Parse from the root element.
    fn from_element(elem: &Element) -> Result<Self, ParseError>;

    /// Build the root element.
    fn to_element(&self) -> Element;

    /// Whether an element is this extension's root.
    fn matches(elem: &Element) -> bool {
        elem.is(Self::NAME, Self::NAMESPACE)
    }

    /// Fail with `UnexpectedElement` unless `elem` is this extension's root.
    fn ensure_root(elem: &Element) -> Result<(), ParseError> {
        if Self::matches(elem) {
            Ok(())
        } else {
            Err(ParseError::unexpected(Self::NAME, elem))
        }
    }

    /// Parse a standalone extension element from bytes.
    fn from_xml(input: &[u8]) -> Result<Self, ParseError> {
        Self::from_element(&parser::parse(input)?)
    }

    /// Serialize as a standalone element.
    fn to_xml(&self) -> String {
        parser::serialize(&self.to_element())
    }
}

/// The payload carried by an IQ stanza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// XEP-0030 disco#info
    DiscoInfo(DiscoInfo),
    /// XEP-0030 disco#items
    DiscoItems(DiscoItems),
    /// XEP-0078 legacy authentication
    NonSaslAuth(NonSaslAuth),
    /// RFC 3921 session establishment
    Session(Session),
    /// XEP-0092 software version
    Version(Version),
    /// XEP-0202 entity time
    EntityTime(EntityTime),
}

/// Implemented by every type that can sit in a [`Payload`].
pub trait IqPayload: Extension + Into<Payload> {
    /// Borrow the payload if it holds this variant.
    fn peek(payload: &Payload) -> Option<&Self>;
}

macro_rules! iq_payload {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Payload::$variant(value)
                }
            }

            impl IqPayload for $ty {
                fn peek(payload: &Payload) -> Option<&Self> {
                    match payload {
                        Payload::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )+

        impl Payload {
            /// Build the root element of whichever variant is held.
            pub fn to_element(&self) -> Element {
                match self {
                    $(Payload::$variant(value) => value.to_element(),)+
                }
            }

            /// Namespace of the held variant's root element.
            pub fn namespace(&self) -> &'static str {
                match self {
                    $(Payload::$variant(_) => <$ty as Extension>::NAMESPACE,)+
                }
            }
        }
    };
}

iq_payload! {
    DiscoInfo => DiscoInfo,
    DiscoItems => DiscoItems,
    NonSaslAuth => NonSaslAuth,
    Session => Session,
    Version => Version,
    EntityTime => EntityTime,
}

type ParseFn = fn(&Element) -> Result<Payload, ParseError>;

/// One row of the dispatch table.
struct Registration {
    namespace: &'static str,
    name: &'static str,
    parse: ParseFn,
}

fn parse_as<T: IqPayload>(elem: &Element) -> Result<Payload, ParseError> {
    T::from_element(elem).map(Into::into)
}

static REGISTRY: &[Registration] = &[
    Registration {
        namespace: DiscoInfo::NAMESPACE,
        name: DiscoInfo::NAME,
        parse: parse_as::<DiscoInfo>,
    },
    Registration {
        namespace: DiscoItems::NAMESPACE,
        name: DiscoItems::NAME,
        parse: parse_as::<DiscoItems>,
    },
    Registration {
        namespace: NonSaslAuth::NAMESPACE,
        name: NonSaslAuth::NAME,
        parse: parse_as::<NonSaslAuth>,
    },
    Registration {
        namespace: Session::NAMESPACE,
        name: Session::NAME,
        parse: parse_as::<Session>,
    },
    Registration {
        namespace: Version::NAMESPACE,
        name: Version::NAME,
        parse: parse_as::<Version>,
    },
    Registration {
        namespace: EntityTime::NAMESPACE,
        name: EntityTime::NAME,
        parse: parse_as::<EntityTime>,
    },
];

impl Payload {
    /// Dispatch an element to the registered parser for its `(namespace, name)`.
    ///
    /// Returns `UnrecognizedPayload` when nothing is registered for the element.
    pub fn from_element(elem: &Element) -> Result<Payload, ParseError> {
        let registration = REGISTRY
            .iter()
            .find(|r| elem.is(r.name, r.namespace))
            .ok_or_else(|| ParseError::unrecognized(elem))?;

        debug!(ns = %registration.namespace, name = %registration.name, "Dispatching IQ payload");
        (registration.parse)(elem)
    }

    /// Whether a parser is registered for this element.
    pub fn is_registered(elem: &Element) -> bool {
        REGISTRY.iter().any(|r| elem.is(r.name, r.namespace))
    }
}
