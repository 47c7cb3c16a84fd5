// Delta engine: ties JSON text to the delta algorithms.
//
// Provides high-level encode/decode APIs that orchestrate:
//   - Parsing source/target/delta documents (serde_json)
//   - Optional hidden-key stripping before diffing or merging
//   - Delta computation and application (delta module)
//   - Serialization of the delta or merged document
//
// An absent delta ("no change") is represented on the wire as an empty
// document: `encode` writes nothing and `decode` treats empty input as a
// no-op.

use serde_json::Value;
use thiserror::Error;

use crate::delta::{self, MergeError};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for delta encoding.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Remove hidden keys from both documents before diffing.
    pub strip_hidden: bool,
    /// Pretty-print the delta.
    pub pretty: bool,
}

/// Configuration for delta decoding.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Remove hidden keys from the source before merging.
    pub strip_hidden: bool,
    /// Pretty-print the merged document.
    pub pretty: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid source document: {0}")]
    Source(#[source] serde_json::Error),
    #[error("invalid target document: {0}")]
    Target(#[source] serde_json::Error),
    #[error("cannot serialize delta: {0}")]
    Write(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid source document: {0}")]
    Source(#[source] serde_json::Error),
    #[error("invalid delta document: {0}")]
    Delta(#[source] serde_json::Error),
    #[error("cannot merge delta: {0}")]
    Merge(#[from] MergeError),
    #[error("cannot serialize merged document: {0}")]
    Write(#[source] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Value-level API
// ---------------------------------------------------------------------------

/// Diff two parsed documents according to `opts`.
///
/// Returns `None` when there is nothing to send.
pub fn diff_documents(mut source: Value, mut target: Value, opts: &EncodeOptions) -> Option<Value> {
    if opts.strip_hidden {
        delta::extract_hidden(&mut source);
        delta::extract_hidden(&mut target);
    }
    if let Some(key) = delta::value::find_reserved_key(&target) {
        log::warn!("target uses reserved key {key:?} as data; the delta may not round-trip");
    }
    delta::compute_delta(&source, &target)
}

/// Apply `delta` (or nothing, for an absent delta) to a parsed source.
pub fn merge_document(
    mut source: Value,
    delta: Option<&Value>,
    opts: &DecodeOptions,
) -> Result<Value, MergeError> {
    if opts.strip_hidden {
        delta::extract_hidden(&mut source);
    }
    match delta {
        Some(delta) => delta::merge_into(source, delta),
        None => Ok(source),
    }
}

// ---------------------------------------------------------------------------
// High-level encode
// ---------------------------------------------------------------------------

/// Encode the delta between JSON documents `source` and `target` into
/// `output`.
///
/// Returns `false`, leaving `output` untouched, when the documents are equal.
pub fn encode(source: &[u8], target: &[u8], output: &mut Vec<u8>) -> Result<bool, EncodeError> {
    encode_with_options(source, target, output, &EncodeOptions::default())
}

/// Encode with custom options.
pub fn encode_with_options(
    source: &[u8],
    target: &[u8],
    output: &mut Vec<u8>,
    opts: &EncodeOptions,
) -> Result<bool, EncodeError> {
    let source: Value = serde_json::from_slice(source).map_err(EncodeError::Source)?;
    let target: Value = serde_json::from_slice(target).map_err(EncodeError::Target)?;

    let Some(delta) = diff_documents(source, target, opts) else {
        log::debug!("documents are identical, no delta written");
        return Ok(false);
    };

    write_json(output, &delta, opts.pretty).map_err(EncodeError::Write)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// High-level decode
// ---------------------------------------------------------------------------

/// Apply a JSON delta to a JSON source document, returning the merged
/// document.
///
/// An empty (or all-whitespace) `delta` reproduces the source.
pub fn decode(source: &[u8], delta: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_with_options(source, delta, &DecodeOptions::default())
}

/// Decode with custom options.
pub fn decode_with_options(
    source: &[u8],
    delta: &[u8],
    opts: &DecodeOptions,
) -> Result<Vec<u8>, DecodeError> {
    let source: Value = serde_json::from_slice(source).map_err(DecodeError::Source)?;
    let delta: Option<Value> = if is_blank(delta) {
        None
    } else {
        Some(serde_json::from_slice(delta).map_err(DecodeError::Delta)?)
    };

    let merged = merge_document(source, delta.as_ref(), opts)?;

    let mut output = Vec::new();
    write_json(&mut output, &merged, opts.pretty).map_err(DecodeError::Write)?;
    Ok(output)
}

/// Whether `data` holds no JSON document at all.
pub fn is_blank(data: &[u8]) -> bool {
    data.iter().all(u8::is_ascii_whitespace)
}

fn write_json(output: &mut Vec<u8>, value: &Value, pretty: bool) -> Result<(), serde_json::Error> {
    if pretty {
        serde_json::to_writer_pretty(&mut *output, value)?;
        output.push(b'\n');
        Ok(())
    } else {
        serde_json::to_writer(output, value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roundtrip(source: &str, target: &str) {
        let mut delta = Vec::new();
        encode(source.as_bytes(), target.as_bytes(), &mut delta).expect("encode failed");
        let reconstructed = decode(source.as_bytes(), &delta).expect("decode failed");
        let reconstructed: Value = serde_json::from_slice(&reconstructed).unwrap();
        let expected: Value = serde_json::from_str(target).unwrap();
        assert_eq!(
            reconstructed,
            expected,
            "roundtrip mismatch (source={source}, target={target}, delta={})",
            String::from_utf8_lossy(&delta)
        );
    }

    #[test]
    fn roundtrip_identical() {
        roundtrip(r#"{"a": [1, 2, 3]}"#, r#"{"a": [1, 2, 3]}"#);
    }

    #[test]
    fn roundtrip_small_edit() {
        roundtrip(
            r#"{"state": {"cells": ["", "", ""], "turn": "x"}}"#,
            r#"{"state": {"cells": ["x", "", ""], "turn": "o"}}"#,
        );
    }

    #[test]
    fn roundtrip_scalars() {
        roundtrip("1", "2");
        roundtrip("null", r#"{"a": 1}"#);
        roundtrip(r#"[1, 2]"#, r#""done""#);
    }

    #[test]
    fn roundtrip_top_level_arrays() {
        roundtrip("[]", "[1, 2]");
        roundtrip("[1, 2, 3]", "[1]");
        roundtrip("[[1], [2]]", "[[1, 1], []]");
    }

    #[test]
    fn identical_documents_write_nothing() {
        let mut delta = Vec::new();
        let changed = encode(br#"{"a": 1}"#, br#"{ "a" : 1 }"#, &mut delta).unwrap();
        assert!(!changed);
        assert!(delta.is_empty());
    }

    #[test]
    fn empty_delta_reproduces_source() {
        let merged = decode(br#"{"a": 1}"#, b"  \n").unwrap();
        assert_eq!(merged, br#"{"a":1}"#);
    }

    #[test]
    fn delta_wire_form() {
        let mut delta = Vec::new();
        encode(br#"{"a": 1, "b": 2}"#, br#"{"a": 1}"#, &mut delta).unwrap();
        assert_eq!(delta, br#"{"$":["b"]}"#);
    }

    #[test]
    fn strip_hidden_keeps_hidden_keys_out_of_the_delta() {
        let opts = EncodeOptions {
            strip_hidden: true,
            ..Default::default()
        };
        let mut delta = Vec::new();
        let changed = encode_with_options(
            br#"{"name": "x", "_seed": 1}"#,
            br#"{"name": "y", "_seed": 2}"#,
            &mut delta,
            &opts,
        )
        .unwrap();
        assert!(changed);
        let delta: Value = serde_json::from_slice(&delta).unwrap();
        assert_eq!(delta, json!({"name": "y"}));
    }

    #[test]
    fn strip_hidden_on_decode() {
        let opts = DecodeOptions {
            strip_hidden: true,
            ..Default::default()
        };
        let merged =
            decode_with_options(br#"{"name": "x", "_seed": 1}"#, br#"{"name": "y"}"#, &opts)
                .unwrap();
        assert_eq!(merged, br#"{"name":"y"}"#);
    }

    #[test]
    fn pretty_output_ends_with_newline() {
        let opts = EncodeOptions {
            pretty: true,
            ..Default::default()
        };
        let mut delta = Vec::new();
        encode_with_options(b"[1]", b"[2]", &mut delta, &opts).unwrap();
        assert!(delta.ends_with(b"]\n"));
        assert!(delta.contains(&b'\n'));
    }

    #[test]
    fn parse_errors_name_the_document() {
        let mut delta = Vec::new();
        let err = encode(b"{", b"{}", &mut delta).unwrap_err();
        assert!(matches!(err, EncodeError::Source(_)));
        let err = encode(b"{}", b"nope", &mut delta).unwrap_err();
        assert!(matches!(err, EncodeError::Target(_)));
        let err = decode(b"{}", b"[").unwrap_err();
        assert!(matches!(err, DecodeError::Delta(_)));
    }

    #[test]
    fn merge_errors_propagate() {
        let err = decode(
            br#"{"a": {"b": 1}}"#,
            br##"{"#a": [{"type": "resize", "value": 0}]}"##,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Merge(MergeError::NotAnArray { .. })));
    }
}
