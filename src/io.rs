// File-level I/O helpers for JSON deltas.
//
// Provides `diff_file()`, `merge_file()` and `split_hidden_file()`
// convenience functions that wrap the engine with buffered file I/O.
// Optionally computes SHA-256 digests of the written documents
// (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::delta;
use crate::engine::{self, DecodeError, DecodeOptions, EncodeError, EncodeOptions};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `diff_file()`.
#[derive(Debug, Clone)]
pub struct DiffStats {
    /// Source document size in bytes.
    pub source_size: u64,
    /// Target document size in bytes.
    pub target_size: u64,
    /// Delta output size in bytes (0 when the documents are equal).
    pub delta_size: u64,
    /// Whether the documents differ.
    pub changed: bool,
    /// SHA-256 of the delta file (if `file-io` feature is enabled).
    pub delta_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `merge_file()`.
#[derive(Debug, Clone)]
pub struct MergeStats {
    /// Source document size in bytes.
    pub source_size: u64,
    /// Delta document size in bytes.
    pub delta_size: u64,
    /// Merged output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the merged output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `split_hidden_file()`.
#[derive(Debug, Clone)]
pub struct SplitStats {
    /// Input document size in bytes.
    pub input_size: u64,
    /// Visible document size in bytes.
    pub visible_size: u64,
    /// Hidden document size in bytes (0 when nothing was hidden).
    pub hidden_size: u64,
    /// Whether any hidden key was found.
    pub hidden_found: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Delta encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Delta decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Input or output document error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// diff_file
// ---------------------------------------------------------------------------

/// Compute the delta between two JSON files, writing it to `delta_path`.
///
/// When the documents are equal, `delta_path` is created empty.
pub fn diff_file(
    source_path: &Path,
    target_path: &Path,
    delta_path: &Path,
    opts: EncodeOptions,
) -> Result<DiffStats, IoError> {
    let source = std::fs::read(source_path)?;
    let target = std::fs::read(target_path)?;

    let mut delta = Vec::new();
    let changed = engine::encode_with_options(&source, &target, &mut delta, &opts)?;
    write_file(delta_path, &delta)?;

    Ok(DiffStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        delta_size: delta.len() as u64,
        changed,
        delta_sha256: sha256(&delta),
    })
}

// ---------------------------------------------------------------------------
// merge_file
// ---------------------------------------------------------------------------

/// Apply the delta in `delta_path` to the JSON document in `source_path`,
/// writing the merged document to `output_path`.
pub fn merge_file(
    source_path: &Path,
    delta_path: &Path,
    output_path: &Path,
    opts: DecodeOptions,
) -> Result<MergeStats, IoError> {
    let source = std::fs::read(source_path)?;
    let delta = std::fs::read(delta_path)?;

    let output = engine::decode_with_options(&source, &delta, &opts)?;
    write_file(output_path, &output)?;

    Ok(MergeStats {
        source_size: source.len() as u64,
        delta_size: delta.len() as u64,
        output_size: output.len() as u64,
        output_sha256: sha256(&output),
    })
}

// ---------------------------------------------------------------------------
// split_hidden_file
// ---------------------------------------------------------------------------

/// Split the JSON document in `input_path` into its visible part
/// (`visible_path`) and its hidden keys (`hidden_path`).
///
/// When nothing is hidden, `hidden_path` is created empty.
pub fn split_hidden_file(
    input_path: &Path,
    visible_path: &Path,
    hidden_path: &Path,
) -> Result<SplitStats, IoError> {
    let input = std::fs::read(input_path)?;
    let mut document: Value = serde_json::from_slice(&input)?;

    let hidden = delta::extract_hidden(&mut document);

    let visible = serde_json::to_vec(&document)?;
    let hidden_bytes = match &hidden {
        Some(hidden) => serde_json::to_vec(hidden)?,
        None => Vec::new(),
    };
    write_file(visible_path, &visible)?;
    write_file(hidden_path, &hidden_bytes)?;

    Ok(SplitStats {
        input_size: input.len() as u64,
        visible_size: visible.len() as u64,
        hidden_size: hidden_bytes.len() as u64,
        hidden_found: hidden.is_some(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(data)?;
    writer.flush()
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    use sha2::Digest;
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex rendering of a digest.
pub fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
