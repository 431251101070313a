// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line Protocol line assembly.
//!
//! Line format:
//! ```text
//! measurement,host=h,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns\n
//! ```
//!
//! Tags and fields are emitted sorted by raw key so identical input always
//! yields identical bytes.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::value::unix_nanos;

/// Escape a tag key, tag value, or field key.
///
/// Commas, equals signs, and spaces are backslash-escaped. Returns the input
/// unchanged (borrowed) when there is nothing to escape.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains([',', '=', ' ']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, ',' | '=' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Use `timestamp_ns` unless it is zero, in which case take the current time.
pub fn resolve_timestamp(timestamp_ns: u64) -> u64 {
    if timestamp_ns != 0 {
        timestamp_ns
    } else {
        unix_nanos(SystemTime::now())
    }
}

/// Assemble one line from already rendered field values.
///
/// Returns an empty string when `fields` is empty; the caller must not
/// write anything in that case.
pub fn format_line<'a, I>(
    measurement: &str,
    host: &str,
    tags: I,
    fields: &BTreeMap<String, String>,
    timestamp_ns: u64,
) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if fields.is_empty() {
        return String::new();
    }

    let mut line = String::with_capacity(64);
    line.push_str(measurement);
    line.push_str(",host=");
    line.push_str(host);

    // Append tags (sorted by key for canonical form)
    let mut sorted_tags: Vec<_> = tags.into_iter().collect();
    sorted_tags.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in sorted_tags {
        line.push(',');
        line.push_str(&escape(key));
        line.push('=');
        line.push_str(&escape(value));
    }

    line.push(' ');

    // BTreeMap iteration is already in key order
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape(key));
        line.push('=');
        line.push_str(value);
    }

    line.push(' ');
    line.push_str(&resolve_timestamp(timestamp_ns).to_string());
    line.push('\n');
    line
}
