//! XEP-0078: Non-SASL Authentication
//!
//! The legacy `jabber:iq:auth` query used before SASL was available.
//!
//! ## Protocol Flow
//!
//! 1. Client requests the authentication fields:
//!    ```xml
//!    <iq type='get' id='auth1' to='shakespeare.lit'>
//!      <query xmlns='jabber:iq:auth'/>
//!    </iq>
//!    ```
//!
//! 2. Client provides credentials, either in plaintext or as a digest of the
//!    stream id and password:
//!    ```xml
//!    <iq type='set' id='auth2'>
//!      <query xmlns='jabber:iq:auth'>
//!        <username>bill</username>
//!        <digest>48fc78be9ec8f86d8ce1c39c320c97c21d62334d</digest>
//!        <resource>globe</resource>
//!      </query>
//!    </iq>
//!    ```

use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;

/// Namespace for XEP-0078 Non-SASL Authentication
pub const NS_AUTH: &str = "jabber:iq:auth";

/// A `jabber:iq:auth` query.
///
/// An empty query is the client asking which fields the server needs. A
/// present but empty child (`<password/>`) is kept as `Some("")`, which is how
/// the server advertises a required field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NonSaslAuth {
    pub username: Option<String>,
    /// Raw digest bytes, hex on the wire
    #[serde(serialize_with = "serialize_hex")]
    pub digest: Option<Vec<u8>>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub resource: Option<String>,
}

fn serialize_hex<S: Serializer>(digest: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match digest {
        Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
        None => serializer.serialize_none(),
    }
}

impl NonSaslAuth {
    /// Empty query requesting the authentication fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plaintext credentials.
    pub fn plaintext(username: &str, password: &str, resource: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            digest: None,
            password: Some(password.to_string()),
            resource: Some(resource.to_string()),
        }
    }

    /// Digest credentials computed from the stream id and password.
    pub fn with_digest(username: &str, stream_id: &str, password: &str, resource: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            digest: Some(Self::digest_for(stream_id, password)),
            password: None,
            resource: Some(resource.to_string()),
        }
    }

    /// `SHA-1(stream_id || password)` as raw bytes.
    pub fn digest_for(stream_id: &str, password: &str) -> Vec<u8> {
        let mut hasher = Sha1::new();
        hasher.update(stream_id.as_bytes());
        hasher.update(password.as_bytes());
        hasher.finalize().to_vec()
    }

    /// Whether the query carries a non-empty digest rather than a password.
    pub fn uses_digest(&self) -> bool {
        self.digest.as_ref().is_some_and(|d| !d.is_empty())
    }
}

fn child_text(query: &Element, name: &str) -> Option<String> {
    query.get_child(name, NS_AUTH).map(Element::text)
}

impl Extension for NonSaslAuth {
    const NAMESPACE: &'static str = NS_AUTH;
    const NAME: &'static str = "query";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let digest = child_text(elem, "digest")
            .map(|hex_digest| {
                hex::decode(hex_digest.trim())
                    .map_err(|_| ParseError::invalid("digest", hex_digest.clone()))
            })
            .transpose()?;

        let auth = Self {
            username: child_text(elem, "username"),
            digest,
            password: child_text(elem, "password"),
            resource: child_text(elem, "resource"),
        };

        debug!(
            username = ?auth.username,
            uses_digest = auth.uses_digest(),
            "Parsed non-SASL auth query"
        );

        Ok(auth)
    }

    fn to_element(&self) -> Element {
        let text_child = |name: &str, value: &str| {
            Element::builder(name, NS_AUTH).append(value).build()
        };

        let mut builder = Element::builder("query", NS_AUTH);

        if let Some(ref username) = self.username {
            builder = builder.append(text_child("username", username));
        }
        if let Some(ref digest) = self.digest {
            builder = builder.append(text_child("digest", &hex::encode(digest)));
        }
        if let Some(ref password) = self.password {
            builder = builder.append(text_child("password", password));
        }
        if let Some(ref resource) = self.resource {
            builder = builder.append(text_child("resource", resource));
        }

        builder.build()
    }
}
