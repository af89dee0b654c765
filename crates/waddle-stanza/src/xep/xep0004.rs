//! XEP-0004: Data Forms
//!
//! Only the parts needed to carry structured values inside other payloads
//! (XEP-0128 extended disco#info, XEP-0232 software information): form type,
//! title, instructions and fields with their values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::element::Element;
use crate::error::ParseError;
use crate::payload::Extension;

/// Data Forms namespace.
pub const DATA_FORMS_NS: &str = "jabber:x:data";

/// Name of the hidden field that identifies a form's schema.
pub const FORM_TYPE: &str = "FORM_TYPE";

/// The form's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    /// Form to be filled in
    Form,
    /// Filled-in form
    Submit,
    /// Form-processing cancelled
    Cancel,
    /// Data result
    Result,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::Result => "result",
        }
    }
}

impl FromStr for FormType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "form" => Ok(Self::Form),
            "submit" => Ok(Self::Submit),
            "cancel" => Ok(Self::Cancel),
            "result" => Ok(Self::Result),
            other => Err(ParseError::invalid("form type", other)),
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Boolean,
    Fixed,
    Hidden,
    JidMulti,
    JidSingle,
    ListMulti,
    ListSingle,
    TextMulti,
    TextPrivate,
    TextSingle,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Fixed => "fixed",
            Self::Hidden => "hidden",
            Self::JidMulti => "jid-multi",
            Self::JidSingle => "jid-single",
            Self::ListMulti => "list-multi",
            Self::ListSingle => "list-single",
            Self::TextMulti => "text-multi",
            Self::TextPrivate => "text-private",
            Self::TextSingle => "text-single",
        }
    }
}

impl FromStr for FieldType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(Self::Boolean),
            "fixed" => Ok(Self::Fixed),
            "hidden" => Ok(Self::Hidden),
            "jid-multi" => Ok(Self::JidMulti),
            "jid-single" => Ok(Self::JidSingle),
            "list-multi" => Ok(Self::ListMulti),
            "list-single" => Ok(Self::ListSingle),
            "text-multi" => Ok(Self::TextMulti),
            "text-private" => Ok(Self::TextPrivate),
            "text-single" => Ok(Self::TextSingle),
            other => Err(ParseError::invalid("field type", other)),
        }
    }
}

/// A single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub var: String,
    /// Absent on the wire means the XEP-0004 default (text-single)
    #[serde(rename = "type")]
    pub type_: Option<FieldType>,
    pub label: Option<String>,
    pub values: Vec<String>,
}

impl FormField {
    pub fn new(var: &str, type_: Option<FieldType>) -> Self {
        Self {
            var: var.to_string(),
            type_,
            label: None,
            values: Vec::new(),
        }
    }

    /// Hidden single-value field, typically `FORM_TYPE`.
    pub fn hidden(var: &str, value: &str) -> Self {
        Self::new(var, Some(FieldType::Hidden)).with_value(value)
    }

    pub fn text_single(var: &str, value: &str) -> Self {
        Self::new(var, Some(FieldType::TextSingle)).with_value(value)
    }

    pub fn text_multi<'a, I: IntoIterator<Item = &'a str>>(var: &str, values: I) -> Self {
        values
            .into_iter()
            .fold(Self::new(var, Some(FieldType::TextMulti)), Self::with_value)
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.values.push(value.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        let var = elem
            .attr("var")
            .ok_or_else(|| ParseError::missing("field", "var"))?;
        // Field types added by later revisions are read as untyped fields.
        let type_ = elem.attr("type").and_then(|raw| match raw.parse::<FieldType>() {
            Ok(type_) => Some(type_),
            Err(_) => {
                debug!(var, field_type = raw, "Ignoring unknown field type");
                None
            }
        });

        Ok(Self {
            var: var.to_string(),
            type_,
            label: elem.attr("label").map(str::to_string),
            values: elem
                .children()
                .filter(|child| child.is("value", DATA_FORMS_NS))
                .map(Element::text)
                .collect(),
        })
    }

    fn to_element(&self) -> Element {
        let mut builder = Element::builder("field", DATA_FORMS_NS);
        if let Some(type_) = self.type_ {
            builder = builder.attr("type", type_.as_str());
        }
        builder = builder.attr("var", &self.var);
        if let Some(ref label) = self.label {
            builder = builder.attr("label", label);
        }
        builder
            .append_all(self.values.iter().map(|value| {
                Element::builder("value", DATA_FORMS_NS)
                    .append(value.as_str())
                    .build()
            }))
            .build()
    }
}

/// A data form (`<x xmlns='jabber:x:data'/>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataForm {
    #[serde(rename = "type")]
    pub type_: FormType,
    pub title: Option<String>,
    pub instructions: Vec<String>,
    pub fields: Vec<FormField>,
}

impl DataForm {
    pub fn new(type_: FormType) -> Self {
        Self {
            type_,
            title: None,
            instructions: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// First field with the given `var`.
    pub fn field(&self, var: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.var == var)
    }

    /// Value of the `FORM_TYPE` field, if any.
    pub fn form_type(&self) -> Option<&str> {
        self.field(FORM_TYPE)
            .and_then(|field| field.values.first())
            .map(String::as_str)
    }
}

impl Extension for DataForm {
    const NAMESPACE: &'static str = DATA_FORMS_NS;
    const NAME: &'static str = "x";

    fn from_element(elem: &Element) -> Result<Self, ParseError> {
        Self::ensure_root(elem)?;

        let type_ = elem
            .attr("type")
            .ok_or_else(|| ParseError::missing("x", "type"))?
            .parse::<FormType>()?;

        let mut form = DataForm::new(type_);
        for child in elem.children().filter(|c| c.ns() == DATA_FORMS_NS) {
            match child.name() {
                "title" => form.title = Some(child.text()),
                "instructions" => form.instructions.push(child.text()),
                "field" => form.fields.push(FormField::from_element(child)?),
                _ => {}
            }
        }

        Ok(form)
    }

    fn to_element(&self) -> Element {
        let mut builder = Element::builder("x", DATA_FORMS_NS).attr("type", self.type_.as_str());

        if let Some(ref title) = self.title {
            builder = builder.append(
                Element::builder("title", DATA_FORMS_NS)
                    .append(title.as_str())
                    .build(),
            );
        }

        for instructions in &self.instructions {
            builder = builder.append(
                Element::builder("instructions", DATA_FORMS_NS)
                    .append(instructions.as_str())
                    .build(),
            );
        }

        builder
            .append_all(self.fields.iter().map(FormField::to_element))
            .build()
    }
}
