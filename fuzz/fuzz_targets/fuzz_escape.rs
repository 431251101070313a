// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use fluxline::line::escape;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let escaped = escape(data);

    // Every reserved character must be preceded by a backslash
    let bytes = escaped.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if matches!(b, b',' | b'=' | b' ') {
            assert!(i > 0 && bytes[i - 1] == b'\\');
        }
    }

    // Dropping the inserted backslashes gives the input back
    let mut restored = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some(',' | '=' | ' ')) {
            if let Some(next) = chars.next() {
                restored.push(next);
            }
            continue;
        }
        restored.push(c);
    }
    assert_eq!(restored, data);
});
