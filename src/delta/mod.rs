// JSON delta format.
//
// This module computes and applies deltas between JSON documents.
//
// # Modules
//
// - `value`   : Kind classification and reserved key conventions
// - `change`  : Array change records and their wire form
// - `encoder` : Delta computation (source + target -> delta)
// - `decoder` : Delta application (source + delta -> target)
// - `hidden`  : Hidden key extraction

pub mod change;
pub mod decoder;
pub mod encoder;
pub mod hidden;
pub mod value;

// Re-export key types for convenience.
pub use change::{ChangeRecord, MAX_ARRAY_GROWTH, RecordError};
pub use decoder::{MergeError, merge_array_changes, merge_into};
pub use encoder::compute_delta;
pub use hidden::extract_hidden;
pub use value::{ARRAY_MARKER, DELETED_KEYS, HIDDEN_MARKER, Kind};
