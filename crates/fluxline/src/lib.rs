// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! fluxline - Line Protocol encoder
//!
//! Turns typed measurement data into InfluxDB Line Protocol lines and writes
//! them to any [`std::io::Write`] sink.
//!
//! This crate provides:
//! - A closed set of field value kinds with canonical text rendering
//! - `#[derive(Record)]` for opt-in struct member extraction
//! - A free-form path for dynamically typed JSON field maps
//! - Deterministic tag/field ordering and reserved-character escaping
//! - Best-effort FQDN resolution for the implicit `host` tag
//!
//! # Overview
//!
//! The encoder does NOT batch, retry, or talk to a server. Each call produces
//! at most one line and performs at most one write.
//!
//! ```text
//! Record / JSON map --> FieldSet --> render (TypeMode) --> line --> io::Write
//! ```
//!
//! # Example
//!
//! ```
//! use fluxline::{EncodeOptions, Encoder, FieldSet};
//!
//! let mut encoder = Encoder::with_hostname(Vec::new(), "h1");
//! let fields = FieldSet::new().field("load", 3.5);
//! let options = EncodeOptions::new().time_nanos(1_000_000_000);
//!
//! encoder.encode("cpu", &fields, [("region", "us")], options).unwrap();
//! assert_eq!(
//!     encoder.get_ref().as_slice(),
//!     b"cpu,host=h1,region=us load=3.5 1000000000\n"
//! );
//! ```

// Lets `#[derive(Record)]` output (which names `::fluxline`) compile inside this crate.
extern crate self as fluxline;

pub mod config;
pub mod encoder;
pub mod error;
pub mod fields;
pub mod host;
pub mod line;
pub mod value;

pub use config::EncoderConfig;
pub use encoder::{EncodeOptions, Encoder};
pub use error::EncodeError;
pub use fields::{FieldSet, Record};
pub use value::{FieldValue, ToFieldValue, TypeMode, MAX_STRING_LEN};

#[cfg(feature = "derive")]
pub use fluxline_derive::Record;
