// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! fluxline-encode - Convert JSON measurement points to Line Protocol.
//!
//! Usage:
//!   fluxline-encode < points.jsonl
//!   fluxline-encode --input points.jsonl --output points.lp --host db1
//!   fluxline-encode --measurement cpu --untyped --fail-fast

mod convert;

use anyhow::Context;
use clap::Parser;
use convert::{convert, ConvertOptions};
use fluxline::{Encoder, EncoderConfig, TypeMode};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fluxline-encode")]
#[command(about = "Convert JSON measurement points to line protocol")]
#[command(version)]
struct Args {
    /// Input file with one JSON point per line (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Encoder configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Value of the host tag (overrides config and FQDN lookup)
    #[arg(long)]
    host: Option<String>,

    /// Measurement for points that do not name one
    #[arg(short, long)]
    measurement: Option<String>,

    /// Omit the integer type suffix
    #[arg(long)]
    untyped: bool,

    /// Stop at the first invalid point
    #[arg(long)]
    fail_fast: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging (stdout carries data)
    let filter = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => EncoderConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EncoderConfig::default(),
    };
    if let Some(host) = &args.host {
        config.hostname = Some(host.clone());
    }
    if args.untyped {
        config.static_types = Some(false);
    }

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let mut encoder = Encoder::from_config(BufWriter::new(output), &config);
    info!("host tag: {}", encoder.host());
    if config.type_mode() == TypeMode::Untyped {
        info!("integer type suffix disabled");
    }

    let opts = ConvertOptions {
        default_measurement: args.measurement.clone(),
        mode: config.type_mode(),
        fail_fast: args.fail_fast,
    };

    let stats = convert(input, &mut encoder, &opts)?;
    encoder.get_mut().flush().context("failed to flush output")?;

    info!(
        "{} points read: {} written, {} empty, {} skipped",
        stats.points, stats.written, stats.empty, stats.skipped
    );
    Ok(())
}
