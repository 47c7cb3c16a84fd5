// Shared JSON value helpers.
//
// The kind classification every algorithm dispatches on, plus the reserved
// key conventions of the delta wire format:
//   - `#key`  the value is an array change list for `key`
//   - `$`     the list of keys deleted from the enclosing object
//   - `_key`  a hidden key (also `#_key` for hidden arrays)

use std::fmt;

use serde_json::Value;

/// Prefix marking a key whose value is an array change list.
pub const ARRAY_MARKER: char = '#';

/// Prefix marking a hidden key.
pub const HIDDEN_MARKER: char = '_';

/// Key holding the list of deleted object keys.
pub const DELETED_KEYS: &str = "$";

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The shape of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Classify `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Arrays and objects are merged structurally; everything else is
    /// replaced wholesale.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Key conventions
// ---------------------------------------------------------------------------

/// `#name`: the delta key carrying a change list for the array at `name`.
pub fn array_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 1);
    key.push(ARRAY_MARKER);
    key.push_str(name);
    key
}

/// The real key behind an array-marked key, or `None` for a plain key.
#[inline]
pub fn strip_array_marker(key: &str) -> Option<&str> {
    key.strip_prefix(ARRAY_MARKER)
}

/// Keys starting with `_` or `#_` are hidden.
#[inline]
pub fn is_hidden_key(key: &str) -> bool {
    let key = strip_array_marker(key).unwrap_or(key);
    key.starts_with(HIDDEN_MARKER)
}

/// Whether `key` collides with the delta wire format when used as data.
#[inline]
pub fn is_reserved_key(key: &str) -> bool {
    key == DELETED_KEYS || key.starts_with(ARRAY_MARKER)
}

/// Find the first object key anywhere in `value` that collides with the
/// delta wire format. Documents containing one do not round-trip.
pub fn find_reserved_key(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            if is_reserved_key(key) {
                Some(key.as_str())
            } else {
                find_reserved_key(child)
            }
        }),
        Value::Array(items) => items.iter().find_map(find_reserved_key),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
