//! Centralized record serialization and deserialization.
//!
//! Table files are line-oriented: one JSON object per physical line, one
//! line per record. JSON string escaping guarantees an encoded record
//! never spans lines, which keeps the format appendable and diffable.

use serde::{de::DeserializeOwned, Serialize};
use snafu::Snafu;

/// Error type for codec operations.
#[derive(Debug, Snafu)]
pub enum CodecError {
    /// Encoding failed.
    #[snafu(display("Encoding failed: {source}"))]
    Encode {
        /// The underlying serde_json error.
        source: serde_json::Error,
    },

    /// Decoding failed.
    #[snafu(display("Decoding failed: {source}"))]
    Decode {
        /// The underlying serde_json error.
        source: serde_json::Error,
    },
}

/// Encodes a value as a single JSON line (without the trailing newline).
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode_line<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let line = serde_json::to_string(value).map_err(|source| CodecError::Encode { source })?;
    debug_assert!(!line.contains('\n'), "encoded record must occupy one line");
    Ok(line)
}

/// Decodes a value from one JSON line.
///
/// # Errors
///
/// Returns `CodecError::Decode` if deserialization fails.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Result<T, CodecError> {
    serde_json::from_str(line).map_err(|source| CodecError::Decode { source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: i64,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_roundtrip_record() {
        let original = Record {
            id: 42,
            name: "widget".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        };
        let line = encode_line(&original).expect("encode record");
        let decoded: Record = decode_line(&line).expect("decode record");
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_embedded_newline_stays_on_one_line() {
        let original = Record {
            id: 1,
            name: "line one\nline two".to_string(),
            tags: vec![],
        };
        let line = encode_line(&original).expect("encode record");
        assert!(!line.contains('\n'), "newline must be escaped: {line}");

        let decoded: Record = decode_line(&line).expect("decode record");
        assert_eq!(decoded.name, "line one\nline two");
    }

    #[test]
    fn test_roundtrip_extreme_ids() {
        for id in [i64::MIN, -1, 0, i64::MAX] {
            let original = Record { id, name: String::new(), tags: vec![] };
            let line = encode_line(&original).expect("encode record");
            let decoded: Record = decode_line(&line).expect("decode record");
            assert_eq!(decoded.id, id);
        }
    }

    #[test]
    fn test_decode_malformed_input() {
        let result: Result<Record, _> = decode_line("{not json");
        let err = result.expect_err("malformed input should fail");
        assert!(matches!(&err, CodecError::Decode { .. }));
        let display = err.to_string();
        assert!(display.starts_with("Decoding failed:"), "got: {display}");
    }

    #[test]
    fn test_decode_wrong_shape() {
        let result: Result<Record, _> = decode_line(r#"{"id":"not a number"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as StdError;

        let err = decode_line::<Record>("").expect_err("empty input should fail");
        assert!(err.source().is_some(), "CodecError should keep its source");
    }
}
