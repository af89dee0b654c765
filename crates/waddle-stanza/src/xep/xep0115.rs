//! XEP-0115: Entity Capabilities
//!
//! Computes the verification string over a disco#info result and models the
//! `<c/>` element that advertises it in presence.
//!
//! ## Key Components
//!
//! - `verification_string()`: generates the verification string per Section 5
//! - `Caps`: the `<c>` element included in presence stanzas
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0115.html>

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::disco::{DiscoInfo, Identity};
use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;
use crate::xep::xep0004::{DataForm, FORM_TYPE};

/// XEP-0115 Entity Capabilities namespace.
pub const NS_CAPS: &str = "http://jabber.org/protocol/caps";

/// The only hash algorithm this crate computes.
pub const CAPS_HASH_SHA1: &str = "sha-1";

/// Entity Capabilities element (`<c xmlns='http://jabber.org/protocol/caps'>`).
///
/// Included in presence stanzas to advertise capabilities via a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caps {
    /// Hash algorithm used
    pub hash: String,
    /// Node identifying the software (e.g., "http://psi-im.org")
    pub node: String,
    /// Verification string (base64-encoded hash of the sorted disco#info)
    pub ver: String,
}

impl Caps {
    /// Create a new Caps element with SHA-1 hash.
    pub fn new(node: &str, ver: &str) -> Self {
        Self {
            hash: CAPS_HASH_SHA1.to_string(),
            node: node.to_string(),
            ver: ver.to_string(),
        }
    }

    /// Caps advertising the given disco#info under `node`.
    pub fn for_disco_info(node: &str, info: &DiscoInfo) -> Self {
        Self::new(node, &verification_string(info))
    }

    /// Get the node#ver string used for disco#info queries with caps.
    pub fn node_ver(&self) -> String {
        format!("{}#{}", self.node, self.ver)
    }

    /// Find a `<c>` child of a presence (or any other) element.
    pub fn find_in(parent: &Element) -> Option<Result<Self, ParseError>> {
        parent
            .children()
            .find(|child| Self::matches(child))
            .map(Self::from_element)
    }
}

impl Extension for Caps {
    const NAMESPACE: &'static str = NS_CAPS;
    const NAME: &'static str = "c";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let attr = |name: &'static str| {
            elem.attr(name)
                .map(str::to_string)
                .ok_or_else(|| ParseError::missing("c", name))
        };

        Ok(Self {
            hash: attr("hash")?,
            node: attr("node")?,
            ver: attr("ver")?,
        })
    }

    fn to_element(&self) -> Element {
        Element::builder("c", NS_CAPS)
            .attr("hash", &self.hash)
            .attr("node", &self.node)
            .attr("ver", &self.ver)
            .build()
    }
}

/// Compute the capabilities verification string per XEP-0115 Section 5.
///
/// 1. Sort identities by category/type/lang/name
/// 2. Sort features ordinally
/// 3. Append the extended-info form, FORM_TYPE first, remaining fields by var.
///    A form without FORM_TYPE is skipped.
/// 4. Hash with SHA-1
/// 5. Base64 encode
///
/// Permuting identities, features, fields or values leaves the result unchanged.
///
/// ## Example
///
/// ```
/// use waddle_stanza::disco::{DiscoInfo, Feature, Identity};
/// use waddle_stanza::xep::xep0115::verification_string;
///
/// let info = DiscoInfo::new()
///     .with_identity(Identity::client_pc(Some("Exodus 0.9.1")))
///     .with_features([
///         Feature::caps(),
///         Feature::disco_info(),
///         Feature::disco_items(),
///         Feature::muc(),
///     ]);
/// assert_eq!(verification_string(&info), "QgayPKawpkPSDYmwT/WM94uAlu0=");
/// ```
pub fn verification_string(info: &DiscoInfo) -> String {
    let input = build_verification_string(info);
    let ver = hash_verification_string(&input);
    debug!(
        identities = info.identities.len(),
        features = info.features.len(),
        has_form = info.form.is_some(),
        ver = %ver,
        "Computed caps verification string"
    );
    ver
}

/// Build the unhashed verification string.
///
/// Per XEP-0115 Section 5.1:
/// 1. For each identity: "category/type/lang/name<"
/// 2. For each feature: "feature<"
/// 3. For the form: "FORM_TYPE<", then "var<" and "value<" per field
fn build_verification_string(info: &DiscoInfo) -> String {
    let mut s = String::new();

    let mut identities: Vec<_> = info.identities.iter().collect();
    identities.sort_by(|a, b| identity_key(a).cmp(&identity_key(b)));

    for id in identities {
        s.push_str(&id.category);
        s.push('/');
        s.push_str(&id.type_);
        s.push('/');
        if let Some(ref lang) = id.lang {
            s.push_str(lang);
        }
        s.push('/');
        if let Some(ref name) = id.name {
            s.push_str(name);
        }
        s.push('<');
    }

    let mut features: Vec<_> = info.features.iter().map(|f| f.var()).collect();
    features.sort_unstable();

    for feature in features {
        s.push_str(feature);
        s.push('<');
    }

    if let Some(ref form) = info.form {
        append_form(&mut s, form);
    }

    s
}

fn identity_key(id: &Identity) -> (&str, &str, &str, &str) {
    (
        &id.category,
        &id.type_,
        id.lang.as_deref().unwrap_or(""),
        id.name.as_deref().unwrap_or(""),
    )
}

fn append_form(s: &mut String, form: &DataForm) {
    let mut form_types: Vec<&str> = form
        .fields
        .iter()
        .filter(|field| field.var == FORM_TYPE)
        .flat_map(|field| field.values.iter().map(String::as_str))
        .collect();
    if form_types.is_empty() {
        debug!("Ignoring data form without FORM_TYPE");
        return;
    }
    form_types.sort_unstable();

    for form_type in form_types {
        s.push_str(form_type);
        s.push('<');
    }

    let mut fields: Vec<_> = form
        .fields
        .iter()
        .filter(|field| field.var != FORM_TYPE)
        .collect();
    fields.sort_by(|a, b| a.var.cmp(&b.var));

    for field in fields {
        s.push_str(&field.var);
        s.push('<');

        let mut values: Vec<&str> = field.values.iter().map(String::as_str).collect();
        values.sort_unstable();
        for value in values {
            s.push_str(value);
            s.push('<');
        }
    }
}

/// Hash the verification string with SHA-1 and base64 encode.
fn hash_verification_string(verification_string: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(verification_string.as_bytes());
    let result = hasher.finalize();
    BASE64.encode(result)
}

/// Check if a disco#info query is for a specific caps node.
///
/// Caps nodes are in the format "node#ver".
pub fn is_caps_node_query(node: Option<&str>) -> bool {
    node.map(|n| n.contains('#')).unwrap_or(false)
}

/// Split a caps node query into the base node and verification string.
///
/// Returns `None` unless the node contains a '#'.
pub fn parse_caps_node(node: &str) -> Option<(&str, &str)> {
    node.split_once('#')
}
