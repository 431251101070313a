// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoder errors.

use thiserror::Error;

/// Errors returned by the encode operations.
///
/// Validation variants are raised before anything is written, so a failed
/// call never leaves a partial line in the sink.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A field holds a value kind that has no Line Protocol representation.
    #[error("{key}: unsupported type for line protocol")]
    Unsupported { key: String },

    /// A string field exceeds the Line Protocol length limit.
    #[error("{key}: string too long ({len} characters, max. {max})")]
    StringTooLong { key: String, len: usize, max: usize },

    /// The record path was given something that is not a key/value record.
    #[error("value must be a structured record")]
    NotARecord,

    /// The destination sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// True for every variant except sink failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, EncodeError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_key() {
        let err = EncodeError::Unsupported {
            key: "nested".to_string(),
        };
        assert_eq!(err.to_string(), "nested: unsupported type for line protocol");

        let err = EncodeError::StringTooLong {
            key: "msg".to_string(),
            len: 64_001,
            max: 64_000,
        };
        assert_eq!(
            err.to_string(),
            "msg: string too long (64001 characters, max. 64000)"
        );
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = EncodeError::from(io);
        assert_eq!(err.to_string(), "pipe closed");
        assert!(!err.is_validation());
        assert!(EncodeError::NotARecord.is_validation());
    }
}
