//! Service Discovery: disco#info payload.
//!
//! ```xml
//! <query xmlns='http://jabber.org/protocol/disco#info' node='...'>
//!   <identity xml:lang='en' category='client' name='Psi 0.11' type='pc'/>
//!   <feature var='http://jabber.org/protocol/caps'/>
//!   <x xmlns='jabber:x:data' type='result'>...</x>
//! </query>
//! ```

use serde::Serialize;
use tracing::debug;

use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;
use crate::xep::xep0004::DataForm;
use crate::xep::xep0115;

/// Service Discovery info namespace (XEP-0030).
pub const DISCO_INFO_NS: &str = "http://jabber.org/protocol/disco#info";

/// Identity element for disco#info.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    /// Category (e.g., "client", "server", "conference")
    pub category: String,
    /// Type (e.g., "pc", "im", "text")
    #[serde(rename = "type")]
    pub type_: String,
    /// Optional name (human-readable)
    pub name: Option<String>,
    /// Optional `xml:lang` of the name
    pub lang: Option<String>,
}

impl Identity {
    /// Create a new identity.
    pub fn new(category: &str, type_: &str, name: Option<&str>) -> Self {
        Self {
            category: category.to_string(),
            type_: type_.to_string(),
            name: name.map(|s| s.to_string()),
            lang: None,
        }
    }

    /// Tag the identity name with a language.
    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = Some(lang.to_string());
        self
    }

    /// Desktop client identity (category="client", type="pc").
    pub fn client_pc(name: Option<&str>) -> Self {
        Self::new("client", "pc", name)
    }

    /// Server identity (category="server", type="im").
    pub fn server(name: Option<&str>) -> Self {
        Self::new("server", "im", name)
    }

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        let category = elem
            .attr("category")
            .ok_or_else(|| ParseError::missing("identity", "category"))?;
        let type_ = elem
            .attr("type")
            .ok_or_else(|| ParseError::missing("identity", "type"))?;

        Ok(Self {
            category: category.to_string(),
            type_: type_.to_string(),
            name: elem.attr("name").map(str::to_string),
            lang: elem.attr("xml:lang").map(str::to_string),
        })
    }

    fn to_element(&self) -> Element {
        let mut builder = Element::builder("identity", DISCO_INFO_NS);
        if let Some(ref lang) = self.lang {
            builder = builder.attr("xml:lang", lang);
        }
        builder = builder.attr("category", &self.category);
        if let Some(ref name) = self.name {
            builder = builder.attr("name", name);
        }
        builder.attr("type", &self.type_).build()
    }
}

/// Feature element for disco#info.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Feature(pub String);

impl Feature {
    /// Create a new feature.
    pub fn new(var: &str) -> Self {
        Self(var.to_string())
    }

    /// The feature's `var`.
    pub fn var(&self) -> &str {
        &self.0
    }

    /// disco#info feature
    pub fn disco_info() -> Self {
        Self::new(DISCO_INFO_NS)
    }

    /// disco#items feature
    pub fn disco_items() -> Self {
        Self::new(super::items::DISCO_ITEMS_NS)
    }

    /// XEP-0115 Entity Capabilities feature
    pub fn caps() -> Self {
        Self::new(xep0115::NS_CAPS)
    }

    /// MUC feature
    pub fn muc() -> Self {
        Self::new("http://jabber.org/protocol/muc")
    }
}

/// A disco#info query or result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoInfo {
    /// Node being queried (e.g. a caps `node#ver`)
    pub node: Option<String>,
    pub identities: Vec<Identity>,
    pub features: Vec<Feature>,
    /// Extended information (XEP-0128)
    pub form: Option<DataForm>,
}

impl DiscoInfo {
    /// Empty query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identities.push(identity);
        self
    }

    pub fn with_features<I: IntoIterator<Item = Feature>>(mut self, features: I) -> Self {
        self.features.extend(features);
        self
    }

    pub fn with_form(mut self, form: DataForm) -> Self {
        self.form = Some(form);
        self
    }

    /// Whether a feature is advertised.
    pub fn has_feature(&self, var: &str) -> bool {
        self.features.iter().any(|f| f.var() == var)
    }

    /// XEP-0115 verification string for this entity.
    pub fn verification_string(&self) -> String {
        xep0115::verification_string(self)
    }
}

impl Extension for DiscoInfo {
    const NAMESPACE: &'static str = DISCO_INFO_NS;
    const NAME: &'static str = "query";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let mut info = DiscoInfo {
            node: elem.attr("node").map(str::to_string),
            ..Default::default()
        };

        for child in elem.children() {
            if child.is("identity", DISCO_INFO_NS) {
                info.identities.push(Identity::from_element(child)?);
            } else if child.is("feature", DISCO_INFO_NS) {
                let var = child
                    .attr("var")
                    .ok_or_else(|| ParseError::missing("feature", "var"))?;
                info.features.push(Feature::new(var));
            } else if DataForm::matches(child) {
                if info.form.is_none() {
                    info.form = Some(DataForm::from_element(child)?);
                } else {
                    debug!("Ignoring additional data form in disco#info");
                }
            }
        }

        debug!(
            node = ?info.node,
            identities = info.identities.len(),
            features = info.features.len(),
            has_form = info.form.is_some(),
            "Parsed disco#info"
        );

        Ok(info)
    }

    fn to_element(&self) -> Element {
        let mut builder = Element::builder("query", DISCO_INFO_NS);

        if let Some(ref node) = self.node {
            builder = builder.attr("node", node);
        }

        builder = builder.append_all(self.identities.iter().map(Identity::to_element));

        for feature in &self.features {
            builder = builder.append(
                Element::builder("feature", DISCO_INFO_NS)
                    .attr("var", feature.var())
                    .build(),
            );
        }

        if let Some(ref form) = self.form {
            builder = builder.append(form.to_element());
        }

        builder.build()
    }
}
