// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use fluxline::{EncodeOptions, Encoder, FieldSet, TypeMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(fields) = FieldSet::from_json(&value) else {
        return;
    };

    let mut encoder = Encoder::with_hostname(Vec::new(), "fuzz");
    let result = encoder.encode_fields(
        "m",
        &fields,
        [("t", "v")],
        EncodeOptions::new().time_nanos(1),
        TypeMode::Static,
    );

    let out = encoder.into_inner();
    match result {
        Ok(()) if fields.is_empty() => assert!(out.is_empty()),
        Ok(()) => {
            assert!(out.starts_with(b"m,host=fuzz,t=v "));
            assert!(out.ends_with(b" 1\n"));
        }
        // Validation failures never write
        Err(_) => assert!(out.is_empty()),
    }
});
