//! jsondelta: compact deltas between JSON documents.
//!
//! The crate provides:
//! - The delta algorithms over `serde_json::Value` (`delta`)
//! - Byte-level encode/decode APIs over JSON text (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use jsondelta::{compute_delta, extract_hidden, merge_into};
//! use serde_json::json;
//!
//! let from = json!({"cells": ["", "", ""], "turn": "x", "_seed": 7});
//! let to = json!({"cells": ["x", "", ""], "turn": "o", "_seed": 7});
//!
//! let delta = compute_delta(&from, &to).expect("documents differ");
//! assert_eq!(
//!     delta,
//!     json!({"#cells": [{"type": "setvalue", "index": 0, "value": "x"}], "turn": "o"})
//! );
//!
//! let mut merged = merge_into(from, &delta).unwrap();
//! assert_eq!(merged, to);
//!
//! let hidden = extract_hidden(&mut merged);
//! assert_eq!(hidden, Some(json!({"_seed": 7})));
//! ```

pub mod delta;
pub mod engine;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use delta::{
    ChangeRecord, MergeError, compute_delta, extract_hidden, merge_array_changes, merge_into,
};
