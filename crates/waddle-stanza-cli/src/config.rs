// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Waddle Social

//! Configuration for the stanza tool.
//!
//! Loaded from `$XDG_CONFIG_HOME/waddle/stanza.toml` (usually
//! `~/.config/waddle/stanza.toml`) unless `--config` names another file.
//! Every section is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use waddle_stanza::{ns, StreamContext};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: LogFormat::Compact,
        }
    }
}

/// How parsed stanzas are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rust `{:#?}` rendering
    Debug,
    /// JSON via serde
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Debug,
        }
    }
}

/// Stream the input stanzas are assumed to come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Default namespace of the stream header (`jabber:client` or `jabber:server`)
    pub namespace: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            namespace: ns::JABBER_CLIENT.into(),
        }
    }
}

impl StreamConfig {
    pub fn context(&self) -> StreamContext {
        StreamContext::new(self.namespace.as_str())
    }
}

/// Entity capabilities configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsConfig {
    /// Node to advertise; when set, `caps` prints a `<c/>` element
    pub node: Option<String>,
}

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub output: OutputConfig,
    pub stream: StreamConfig,
    pub caps: CapsConfig,
}

impl Config {
    /// Load from an explicit path, or from the XDG config directory.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_file_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Default config file location.
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("waddle").join("stanza.toml"))
    }
}
