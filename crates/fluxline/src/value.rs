// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field values and their Line Protocol text form.
//!
//! | Kind | Rendering |
//! |------|-----------|
//! | string | `"..."` with `\` and `"` backslash-escaped, at most 64000 bytes |
//! | integer | `42i` (or `42` in [`TypeMode::Untyped`]) |
//! | float | shortest round-trip decimal, `%g` style exponent |
//! | boolean | `true` / `false` |
//! | timestamp | nanoseconds since the Unix epoch |

use crate::error::EncodeError;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum length of a string field value, in bytes.
pub const MAX_STRING_LEN: usize = 64_000;

/// Decimal exponent range rendered without exponent notation.
const MIN_PLAIN_EXP: i32 = -4;
const MAX_PLAIN_EXP: i32 = 6;

/// How integer fields are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeMode {
    /// Integers carry the `i` type suffix.
    #[default]
    Static,
    /// No type suffix. Integers and floats look alike on the wire.
    Untyped,
}

/// A value that can be stored in a Line Protocol field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 string.
    String(String),
    /// Signed integer (any width up to 64 bits).
    Integer(i64),
    /// Unsigned integer (any width up to 64 bits).
    UInteger(u64),
    /// Floating point.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Point in time, as nanoseconds since the Unix epoch.
    Timestamp(u64),
}

impl FieldValue {
    /// Render this value for the field `key`.
    ///
    /// `key` only appears in errors. Fails for strings longer than
    /// [`MAX_STRING_LEN`] and for NaN or infinite floats.
    pub fn render(&self, key: &str, mode: TypeMode) -> Result<String, EncodeError> {
        match self {
            FieldValue::String(v) => {
                if v.len() > MAX_STRING_LEN {
                    return Err(EncodeError::StringTooLong {
                        key: key.to_string(),
                        len: v.len(),
                        max: MAX_STRING_LEN,
                    });
                }
                Ok(quote(v))
            }
            FieldValue::Integer(v) => Ok(match mode {
                TypeMode::Static => format!("{}i", v),
                TypeMode::Untyped => v.to_string(),
            }),
            FieldValue::UInteger(v) => Ok(match mode {
                TypeMode::Static => format!("{}i", v),
                TypeMode::Untyped => v.to_string(),
            }),
            FieldValue::Float(v) => {
                if !v.is_finite() {
                    return Err(EncodeError::Unsupported {
                        key: key.to_string(),
                    });
                }
                Ok(format_float(*v))
            }
            FieldValue::Boolean(v) => Ok(v.to_string()),
            FieldValue::Timestamp(ns) => Ok(ns.to_string()),
        }
    }

    /// Convert a dynamically typed JSON scalar.
    ///
    /// Integral numbers become `Integer` (or `UInteger` above `i64::MAX`),
    /// everything else numeric becomes `Float`. Null, arrays and objects
    /// yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<FieldValue> {
        match value {
            serde_json::Value::String(s) => Some(FieldValue::String(s.clone())),
            serde_json::Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(FieldValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Some(FieldValue::UInteger(u))
                } else {
                    n.as_f64().map(FieldValue::Float)
                }
            }
            // Null, arrays and objects have no field representation
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    /// Static-typed rendering, without length validation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(v) => f.write_str(&quote(v)),
            FieldValue::Integer(v) => write!(f, "{}i", v),
            FieldValue::UInteger(v) => write!(f, "{}i", v),
            FieldValue::Float(v) => f.write_str(&format_float(*v)),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Timestamp(ns) => write!(f, "{}", ns),
        }
    }
}

/// Double-quote a string field value, escaping `\` and `"`.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Shortest round-trip decimal in `%g` style.
///
/// Exponent notation (`1.5e+07`, `1e-05`) is used only when the decimal
/// exponent falls outside `[-4, 6)`.
fn format_float(v: f64) -> String {
    let sci = format!("{:e}", v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return v.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return v.to_string();
    };

    if (MIN_PLAIN_EXP..MAX_PLAIN_EXP).contains(&exp) {
        v.to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    }
}

/// Nanoseconds since the Unix epoch. Times before the epoch saturate to 0.
pub(crate) fn unix_nanos(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Integer(v as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::UInteger(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    /// Keeps the shortest `f32` decimal form (`0.1f32` stays `0.1`).
    fn from(v: f32) -> Self {
        FieldValue::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<SystemTime> for FieldValue {
    fn from(v: SystemTime) -> Self {
        FieldValue::Timestamp(unix_nanos(v))
    }
}

/// Borrowing conversion used by `#[derive(Record)]`.
///
/// Only the supported kinds implement it, so an annotated member of any
/// other type is a compile error rather than a runtime one.
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

macro_rules! to_field_value_copy {
    ($($t:ty),*) => {
        $(impl ToFieldValue for $t {
            fn to_field_value(&self) -> FieldValue {
                FieldValue::from(*self)
            }
        })*
    };
}

to_field_value_copy!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, SystemTime
);

impl ToFieldValue for str {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.to_string())
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.clone())
    }
}

impl ToFieldValue for FieldValue {
    fn to_field_value(&self) -> FieldValue {
        self.clone()
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for &T {
    fn to_field_value(&self) -> FieldValue {
        (**self).to_field_value()
    }
}
