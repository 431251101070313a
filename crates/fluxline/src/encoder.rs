// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line Protocol encoder bound to a host name and a byte sink.

use log::trace;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::SystemTime;

use crate::config::EncoderConfig;
use crate::error::EncodeError;
use crate::fields::{FieldSet, Record};
use crate::host;
use crate::line;
use crate::value::{unix_nanos, TypeMode};

/// Per-call encode options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    time_ns: u64,
}

impl EncodeOptions {
    /// Options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the line timestamp (default: now).
    ///
    /// The Unix epoch itself, and anything before it, counts as unset.
    pub fn time(mut self, t: SystemTime) -> Self {
        self.time_ns = unix_nanos(t);
        self
    }

    /// Override the line timestamp in nanoseconds. Zero means now.
    pub fn time_nanos(mut self, ns: u64) -> Self {
        self.time_ns = ns;
        self
    }

    /// Configured timestamp, 0 when unset.
    pub fn timestamp_ns(&self) -> u64 {
        self.time_ns
    }
}

/// Writes one Line Protocol line per encode call to `W`.
///
/// The host name, sink and integer typing mode are fixed at construction.
/// Encode methods take
/// `&mut self`; share an encoder between threads behind a `Mutex` so each
/// line is written whole. The `format*` methods only need `&self`.
#[derive(Debug)]
pub struct Encoder<W> {
    host: String,
    mode: TypeMode,
    writer: W,
}

impl<W> Encoder<W> {
    /// Create an encoder tagging lines with this machine's FQDN.
    pub fn new(writer: W) -> Self {
        Self::with_hostname(writer, host::fqdn())
    }

    /// Create an encoder with an explicit `host` tag value.
    pub fn with_hostname(writer: W, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            mode: TypeMode::Static,
            writer,
        }
    }

    /// Create an encoder from configuration.
    ///
    /// `static_types: false` makes [`Encoder::encode`] and
    /// [`Encoder::encode_map`] drop the integer `i` suffix.
    pub fn from_config(writer: W, config: &EncoderConfig) -> Self {
        let encoder = match &config.hostname {
            Some(host) => Self::with_hostname(writer, host.clone()),
            None => Self::new(writer),
        };
        encoder.with_type_mode(config.type_mode())
    }

    /// Set the typing mode used by `encode`, `encode_map` and `format`.
    pub fn with_type_mode(mut self, mode: TypeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Value of the implicit `host` tag.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Typing mode used by `encode`, `encode_map` and `format`.
    pub fn type_mode(&self) -> TypeMode {
        self.mode
    }

    /// Get a reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the encoder, returning the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Build the line for a field set without writing it.
    ///
    /// Returns an empty string when `fields` is empty.
    pub fn format_fields<T, K, V>(
        &self,
        measurement: &str,
        fields: &FieldSet,
        tags: T,
        options: EncodeOptions,
        mode: TypeMode,
    ) -> Result<String, EncodeError>
    where
        T: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let rendered = fields.render(mode)?;

        let tags: Vec<(K, V)> = tags.into_iter().collect();
        // Repeated keys keep the last value
        let tags: BTreeMap<&str, &str> = tags
            .iter()
            .map(|(k, v)| (AsRef::<str>::as_ref(k), AsRef::<str>::as_ref(v)))
            .collect();

        Ok(line::format_line(
            measurement,
            &self.host,
            tags,
            &rendered,
            options.timestamp_ns(),
        ))
    }

    /// Build the line for a record without writing it.
    pub fn format<R, T, K, V>(
        &self,
        measurement: &str,
        record: &R,
        tags: T,
        options: EncodeOptions,
    ) -> Result<String, EncodeError>
    where
        R: Record + ?Sized,
        T: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = FieldSet::from_record(record);
        self.format_fields(measurement, &fields, tags, options, self.mode)
    }
}

impl<W: Write> Encoder<W> {
    /// Encode a field set and write the line.
    ///
    /// Nothing is written when `fields` is empty or a value fails
    /// validation. Sink errors are returned as [`EncodeError::Io`].
    pub fn encode_fields<T, K, V>(
        &mut self,
        measurement: &str,
        fields: &FieldSet,
        tags: T,
        options: EncodeOptions,
        mode: TypeMode,
    ) -> Result<(), EncodeError>
    where
        T: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let line = self.format_fields(measurement, fields, tags, options, mode)?;
        if line.is_empty() {
            trace!("measurement '{}' has no fields, nothing written", measurement);
            return Ok(());
        }
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Encode a record's annotated fields.
    ///
    /// Integers carry the `i` suffix unless the encoder is in
    /// [`TypeMode::Untyped`].
    pub fn encode<R, T, K, V>(
        &mut self,
        measurement: &str,
        record: &R,
        tags: T,
        options: EncodeOptions,
    ) -> Result<(), EncodeError>
    where
        R: Record + ?Sized,
        T: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = FieldSet::from_record(record);
        self.encode_fields(measurement, &fields, tags, options, self.mode)
    }

    /// Like [`Encoder::encode`], but never appends type suffixes.
    pub fn encode_without_types<R, T, K, V>(
        &mut self,
        measurement: &str,
        record: &R,
        tags: T,
        options: EncodeOptions,
    ) -> Result<(), EncodeError>
    where
        R: Record + ?Sized,
        T: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = FieldSet::from_record(record);
        self.encode_fields(measurement, &fields, tags, options, TypeMode::Untyped)
    }

    /// Encode a free-form key to JSON value map.
    ///
    /// Every value must be a string, number, or boolean; otherwise the call
    /// fails with [`EncodeError::Unsupported`] and nothing is written.
    pub fn encode_map<'m, M, T, K, V>(
        &mut self,
        measurement: &str,
        fields: M,
        tags: T,
        options: EncodeOptions,
    ) -> Result<(), EncodeError>
    where
        M: IntoIterator<Item = (&'m String, &'m serde_json::Value)>,
        T: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = FieldSet::from_json_map(fields)?;
        self.encode_fields(measurement, &fields, tags, options, self.mode)
    }
}
