// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Output properties of encoded lines: canonical ordering, escaping,
// length limits, timestamps, and concurrent use behind a lock.

use fluxline::{EncodeError, EncodeOptions, Encoder, FieldSet};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

fn encode_line(fields: &FieldSet, tags: &HashMap<String, String>, opts: EncodeOptions) -> String {
    let mut encoder = Encoder::with_hostname(Vec::new(), "h1");
    encoder.encode("m", fields, tags, opts).expect("encode");
    String::from_utf8(encoder.into_inner()).expect("utf8")
}

/// Split `m,host=h1,<tags> <fields> <ts>\n` into its three sections.
fn sections(line: &str) -> (&str, &str, &str) {
    let body = line.strip_suffix('\n').expect("newline terminated");
    let mut parts = body.rsplitn(2, ' ');
    let ts = parts.next().expect("timestamp");
    let rest = parts.next().expect("head");
    let split = first_unescaped(rest, b' ').expect("field section");
    (&rest[..split], &rest[split + 1..], ts)
}

fn first_unescaped(s: &str, needle: u8) -> Option<usize> {
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == needle {
            return Some(i);
        }
    }
    None
}

/// Unescaped-comma split of a section into keys.
fn keys(section: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in section.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            current.push(c);
            escaped = true;
        } else if c == ',' {
            out.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    out.push(current);
    out.into_iter()
        .map(|kv| kv.split('=').next().unwrap_or_default().to_string())
        .collect()
}

const KEYS: [&str; 6] = ["zeta", "alpha", "mid", "Beta", "alpha2", "_x"];

#[test]
fn test_tag_keys_sorted_for_every_rotation() {
    for rotation in 0..KEYS.len() {
        let mut tags = HashMap::new();
        for (i, k) in KEYS.iter().cycle().skip(rotation).take(KEYS.len()).enumerate() {
            tags.insert(k.to_string(), format!("v{}", i));
        }

        let line = encode_line(
            &FieldSet::new().field("f", 1),
            &tags,
            EncodeOptions::new().time_nanos(5),
        );
        let (head, _, _) = sections(&line);
        let tag_keys = keys(head);

        assert_eq!(tag_keys[0], "m");
        assert_eq!(tag_keys[1], "host");
        let rest = &tag_keys[2..];
        assert_eq!(rest.len(), KEYS.len());
        assert!(rest.windows(2).all(|w| w[0] < w[1]), "unsorted: {:?}", rest);
    }
}

#[test]
fn test_field_keys_sorted_for_every_rotation() {
    for rotation in 0..KEYS.len() {
        let fields: FieldSet = KEYS
            .iter()
            .cycle()
            .skip(rotation)
            .take(KEYS.len())
            .map(|k| (k.to_string(), 1.5))
            .collect();

        let line = encode_line(&fields, &HashMap::new(), EncodeOptions::new().time_nanos(5));
        let (_, field_section, _) = sections(&line);
        let field_keys = keys(field_section);

        assert_eq!(field_keys.len(), KEYS.len());
        assert!(field_keys.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_identical_input_identical_bytes() {
    let mut tags = HashMap::new();
    for i in 0..20 {
        tags.insert(format!("t{}", i), format!("v{}", i));
    }
    let fields: FieldSet = (0..20).map(|i| (format!("f{}", i), i)).collect();
    let opts = EncodeOptions::new().time_nanos(77);

    let first = encode_line(&fields, &tags, opts);
    for _ in 0..5 {
        assert_eq!(encode_line(&fields, &tags.clone(), opts), first);
    }
}

#[test]
fn test_reserved_characters_escaped() {
    let mut tags = HashMap::new();
    tags.insert("a key,with=all".to_string(), "v a,l=ue".to_string());
    let fields = FieldSet::new().field("f key=1,x", "plain, text = ok");

    let line = encode_line(&fields, &tags, EncodeOptions::new().time_nanos(1));
    assert_eq!(
        line,
        "m,host=h1,a\\ key\\,with\\=all=v\\ a\\,l\\=ue f\\ key\\=1\\,x=\"plain, text = ok\" 1\n"
    );

    // Every reserved character in the tag section is preceded by a backslash
    let (head, _, _) = sections(&line);
    let tag_section = head.strip_prefix("m,host=h1,").expect("prefix");
    let bytes = tag_section.as_bytes();
    let mut separators = 0;
    for (i, b) in bytes.iter().enumerate() {
        if matches!(b, b',' | b'=' | b' ') && (i == 0 || bytes[i - 1] != b'\\') {
            separators += 1;
        }
    }
    // Only the key/value separator remains unescaped
    assert_eq!(separators, 1);
}

#[test]
fn test_string_length_boundary() {
    let ok = FieldSet::new().field("s", "x".repeat(64_000));
    let line = encode_line(&ok, &HashMap::new(), EncodeOptions::new().time_nanos(1));
    assert!(line.starts_with("m,host=h1 s=\"xxx"));

    let too_long = FieldSet::new().field("s", "x".repeat(64_001));
    let mut encoder = Encoder::with_hostname(Vec::new(), "h1");
    let err = encoder
        .encode("m", &too_long, &HashMap::<String, String>::new(), EncodeOptions::new())
        .unwrap_err();
    assert!(matches!(
        err,
        EncodeError::StringTooLong {
            len: 64_001,
            max: 64_000,
            ..
        }
    ));
    assert!(encoder.get_ref().is_empty());
}

#[test]
fn test_explicit_timestamp_ends_line() {
    let t = 1_234_567_890_123_456_789u64;
    let line = encode_line(
        &FieldSet::new().field("f", 1),
        &HashMap::new(),
        EncodeOptions::new().time_nanos(t),
    );
    assert!(line.ends_with(" 1234567890123456789\n"));
}

#[test]
fn test_default_timestamp_is_now() {
    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos() as u64;
    let line = encode_line(&FieldSet::new().field("f", 1), &HashMap::new(), EncodeOptions::new());
    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos() as u64;

    let (_, _, ts) = sections(&line);
    let ts: u64 = ts.parse().expect("numeric timestamp");
    assert!(ts >= before && ts <= after, "{} not in [{}, {}]", ts, before, after);
}

#[test]
fn test_map_with_nested_value_writes_zero_bytes() {
    let mut fields = HashMap::new();
    fields.insert("load".to_string(), json!(1.0));
    fields.insert("meta".to_string(), json!({"nested": [1, 2]}));

    let mut encoder = Encoder::with_hostname(Vec::new(), "h1");
    let result = encoder.encode_map("m", &fields, [("a", "b")], EncodeOptions::new());
    assert!(matches!(result, Err(EncodeError::Unsupported { .. })));
    assert!(encoder.get_ref().is_empty());
}

#[test]
fn test_shared_encoder_lines_stay_whole() {
    let encoder = Arc::new(Mutex::new(Encoder::with_hostname(Vec::new(), "h1")));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let encoder = Arc::clone(&encoder);
            std::thread::spawn(move || {
                for i in 0..50u64 {
                    let fields = FieldSet::new().field("worker", worker).field("seq", i);
                    encoder
                        .lock()
                        .expect("lock")
                        .encode("m", &fields, [("t", "x")], EncodeOptions::new().time_nanos(i + 1))
                        .expect("encode");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("join");
    }

    let encoder = Arc::try_unwrap(encoder).ok().expect("sole owner");
    let out = String::from_utf8(encoder.into_inner().expect("lock").into_inner()).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 200);
    assert!(lines.iter().all(|l| l.starts_with("m,host=h1,t=x seq=")));
}
