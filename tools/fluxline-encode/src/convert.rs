// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON point stream to Line Protocol conversion.
//!
//! Input is one JSON object per line:
//! ```text
//! {"measurement": "cpu", "tags": {"region": "us"}, "fields": {"load": 3.5}, "time": 1000000000}
//! ```
//! `measurement`, `tags` and `time` are optional.

use anyhow::{bail, Context};
use fluxline::{EncodeError, EncodeOptions, Encoder, FieldSet, TypeMode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// One input record.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputPoint {
    #[serde(default)]
    pub measurement: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub fields: serde_json::Value,
    #[serde(default)]
    pub time: Option<u64>,
}

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Used for points without a `measurement`.
    pub default_measurement: Option<String>,
    /// Integer rendering.
    pub mode: TypeMode,
    /// Abort on the first invalid point instead of skipping it.
    pub fail_fast: bool,
}

/// Conversion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Points read (blank lines excluded).
    pub points: u64,
    /// Points that produced a line.
    pub written: u64,
    /// Points with no fields (valid, nothing written).
    pub empty: u64,
    /// Invalid points skipped.
    pub skipped: u64,
}

/// Convert every point from `input`, writing lines through `encoder`.
///
/// Sink errors always abort. Invalid points are skipped with a warning
/// unless `fail_fast` is set.
pub fn convert<R: BufRead, W: Write>(
    input: R,
    encoder: &mut Encoder<W>,
    opts: &ConvertOptions,
) -> anyhow::Result<ConvertStats> {
    let mut stats = ConvertStats::default();

    for (idx, line) in input.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.with_context(|| format!("failed to read input line {}", lineno))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.points += 1;

        match encode_point(line, encoder, opts) {
            Ok(true) => stats.written += 1,
            Ok(false) => {
                debug!("line {}: no fields, nothing written", lineno);
                stats.empty += 1;
            }
            Err(PointError::Encode(EncodeError::Io(e))) => {
                return Err(e).context("failed to write output");
            }
            Err(e) if opts.fail_fast => bail!("line {}: {}", lineno, e),
            Err(e) => {
                warn!("line {}: {}, skipped", lineno, e);
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug)]
enum PointError {
    Parse(serde_json::Error),
    NoMeasurement,
    Encode(EncodeError),
}

impl std::fmt::Display for PointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointError::Parse(e) => write!(f, "invalid JSON point: {}", e),
            PointError::NoMeasurement => write!(f, "point has no measurement"),
            PointError::Encode(e) => write!(f, "{}", e),
        }
    }
}

/// Returns whether a line was written.
fn encode_point<W: Write>(
    line: &str,
    encoder: &mut Encoder<W>,
    opts: &ConvertOptions,
) -> Result<bool, PointError> {
    let point: InputPoint = serde_json::from_str(line).map_err(PointError::Parse)?;

    let measurement = point
        .measurement
        .as_deref()
        .filter(|m| !m.is_empty())
        .or_else(|| opts.default_measurement.as_deref().filter(|m| !m.is_empty()))
        .ok_or(PointError::NoMeasurement)?;

    let fields = FieldSet::from_json(&point.fields).map_err(PointError::Encode)?;
    if fields.is_empty() {
        return Ok(false);
    }

    let options = EncodeOptions::new().time_nanos(point.time.unwrap_or(0));
    encoder
        .encode_fields(measurement, &fields, &point.tags, options, opts.mode)
        .map_err(PointError::Encode)?;
    Ok(true)
}
