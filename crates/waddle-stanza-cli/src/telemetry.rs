// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Waddle Social

//! Logging setup.
//!
//! Logs go to stderr so stdout carries only command output. `RUST_LOG`
//! overrides both the configured level and `-v`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogConfig, LogFormat};

/// Filter directive for the given verbosity, falling back to the configured level.
pub fn filter_directive(config: &LogConfig, verbose: u8) -> String {
    match verbose {
        0 => config.level.clone(),
        1 => "info,waddle_stanza=debug".to_string(),
        _ => "debug,waddle_stanza=trace".to_string(),
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt_layer.pretty().boxed(),
        LogFormat::Compact => fmt_layer.compact().boxed(),
        LogFormat::Json => fmt_layer.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
