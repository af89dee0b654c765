// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Waddle Social

//! waddle-stanza - inspect, round-trip and hash XMPP stanzas.
//!
//! Reads a single `<iq/>` or `<stream:features/>` from a file or stdin, as it
//! would appear inside a client stream.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

mod commands;
mod config;
mod telemetry;

use config::Config;

/// Inspect, round-trip and hash XMPP stanzas
#[derive(Parser)]
#[command(name = "waddle-stanza")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/waddle/stanza.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a stanza and print the typed value
    Parse {
        /// Input file, `-` or omitted for stdin
        file: Option<PathBuf>,

        /// Print JSON regardless of the configured format
        #[arg(long)]
        json: bool,
    },
    /// Parse and re-serialize; exits non-zero if the result differs from the input
    Roundtrip {
        /// Input file, `-` or omitted for stdin
        file: Option<PathBuf>,
    },
    /// Compute the entity capabilities verification string of a disco#info result
    Caps {
        /// Input file, `-` or omitted for stdin
        file: Option<PathBuf>,

        /// Print a `<c/>` element advertising this node
        #[arg(short, long)]
        node: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    telemetry::init(&config.log, cli.verbose);
    debug!(?config, "Loaded configuration");

    let ctx = config.stream.context();

    match cli.command {
        Commands::Parse { file, json } => {
            let input = commands::read_input(file.as_deref())?;
            let format = if json {
                config::OutputFormat::Json
            } else {
                config.output.format
            };
            println!("{}", commands::parse(&input, &ctx, format)?);
        }
        Commands::Roundtrip { file } => {
            let input = commands::read_input(file.as_deref())?;
            let result = commands::roundtrip(&input, &ctx)?;
            println!("{}", result.output);
            if !result.identical {
                warn!("Re-serialized stanza differs from the input");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Caps { file, node } => {
            let input = commands::read_input(file.as_deref())?;
            let node = node.or(config.caps.node);
            println!("{}", commands::caps(&input, &ctx, node.as_deref())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
