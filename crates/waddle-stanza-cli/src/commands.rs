// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Waddle Social

//! Command implementations. Each takes raw input bytes and returns the text
//! to print, so they can be tested without touching stdin/stdout.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use waddle_stanza::disco::DiscoInfo;
use waddle_stanza::parser;
use waddle_stanza::xep::xep0115::{verification_string, Caps};
use waddle_stanza::{Element, Extension, Iq, Node, Packet, StreamContext};

use crate::config::OutputFormat;

/// Read a file, or stdin when the path is absent or `-`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Parse a packet and render it in the configured format.
pub fn parse(input: &[u8], ctx: &StreamContext, format: OutputFormat) -> Result<String> {
    let packet = Packet::from_xml_with(input, ctx).context("Failed to parse stanza")?;
    debug!(?format, "Rendering packet");

    match format {
        OutputFormat::Debug => Ok(format!("{:#?}", packet)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&packet).context("Failed to serialize packet as JSON")
        }
    }
}

/// Result of re-serializing a packet.
#[derive(Debug)]
pub struct RoundTrip {
    pub output: String,
    /// Whether the output parses to the same tree as the input
    pub identical: bool,
}

/// Parse, re-serialize and compare the trees.
///
/// Whitespace between elements is ignored, so pretty-printed input compares
/// equal to the compact output.
pub fn roundtrip(input: &[u8], ctx: &StreamContext) -> Result<RoundTrip> {
    let original = parser::parse_with(input, ctx).context("Failed to parse stanza")?;
    let packet = Packet::from_element(&strip_whitespace(&original))
        .context("Failed to interpret stanza")?;

    let output = packet.to_xml_with(ctx);
    let reparsed = parser::parse_with(output.as_bytes(), ctx)
        .context("Re-serialized stanza is not well-formed")?;

    let identical = strip_whitespace(&original) == reparsed;
    info!(identical, bytes = output.len(), "Round trip complete");

    Ok(RoundTrip { output, identical })
}

/// Compute the caps verification string of a disco#info result.
///
/// Accepts either an `<iq/>` carrying the query or a bare `<query/>`. With a
/// node, the `<c/>` element is returned instead of the bare string.
pub fn caps(input: &[u8], ctx: &StreamContext, node: Option<&str>) -> Result<String> {
    let root = parser::parse_with(input, ctx).context("Failed to parse stanza")?;
    let root = strip_whitespace(&root);

    let info = if DiscoInfo::matches(&root) {
        DiscoInfo::from_element(&root).context("Invalid disco#info query")?
    } else {
        let iq = Iq::from_element(&root).context("Expected an <iq/> or disco#info <query/>")?;
        match iq.payload_as::<DiscoInfo>() {
            Some(info) => info.clone(),
            None => bail!("IQ does not carry a disco#info payload"),
        }
    };

    Ok(match node {
        Some(node) => Caps::for_disco_info(node, &info).to_xml(),
        None => verification_string(&info),
    })
}

/// Drop whitespace-only text from elements that also have element children.
fn strip_whitespace(element: &Element) -> Element {
    let has_children = element.children().next().is_some();

    let mut builder = Element::builder(element.name(), element.ns());
    if let Some(prefix) = element.prefix() {
        builder = builder.prefix(prefix);
    }
    for (name, value) in element.attrs() {
        builder = builder.attr(name, value);
    }

    for node in element.nodes() {
        match node {
            Node::Element(child) => builder = builder.append(strip_whitespace(child)),
            Node::Text(text) if has_children && text.trim().is_empty() => {}
            Node::Text(text) => builder = builder.append(text.as_str()),
        }
    }

    builder.build()
}
