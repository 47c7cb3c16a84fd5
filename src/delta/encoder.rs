// Delta computation.
//
// Walks the source and target trees together and emits the smallest
// structure the decoder needs to turn one into the other:
//   - objects: changed/added keys, `$` for deleted keys, `#key` for arrays
//     described by change lists
//   - arrays: per-index change records, with a trailing `resize` when the
//     array shrank
//   - everything else: the target value itself
//
// The walk is total over `Value`: it borrows both inputs and never fails.

use serde_json::{Map, Value};

use super::change::{self, ChangeRecord};
use super::value::{self, ARRAY_MARKER, DELETED_KEYS};

/// The delta for one position in the tree, before serialization.
#[derive(Debug)]
enum Delta {
    /// Send the target value whole.
    Replace(Value),
    /// Per-key changes of an object. Never empty.
    Object(Map<String, Value>),
    /// Per-index changes of a non-empty source array. Never empty.
    Changes(Vec<ChangeRecord>),
}

impl Delta {
    fn into_value(self) -> Value {
        match self {
            Self::Replace(value) => value,
            Self::Object(map) => Value::Object(map),
            Self::Changes(records) => change::to_value(records),
        }
    }
}

/// Compute the delta that turns `from` into `to`.
///
/// Returns `None` when the two values are equal.
pub fn compute_delta(from: &Value, to: &Value) -> Option<Value> {
    diff(from, to).map(Delta::into_value)
}

fn diff(from: &Value, to: &Value) -> Option<Delta> {
    if from == to {
        return None;
    }
    match (from, to) {
        (Value::Array(old), Value::Array(new)) => Some(diff_arrays(old, new)),
        (Value::Object(old), Value::Object(new)) => diff_objects(old, new).map(Delta::Object),
        _ => Some(Delta::Replace(to.clone())),
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

fn diff_objects(from: &Map<String, Value>, to: &Map<String, Value>) -> Option<Map<String, Value>> {
    let mut out = Map::new();
    // `#key` siblings are rare; only look them up when `to` has any.
    let has_marked = to.keys().any(|key| key.starts_with(ARRAY_MARKER));
    let shadowed = |key: &str| has_marked && to.contains_key(&value::array_key(key));

    for (key, new) in to {
        // A `#key` in the target is an array that was already delta-shaped;
        // compare it under its plain name.
        let (name, old) = match value::strip_array_marker(key) {
            Some(plain) => {
                log::debug!("comparing array-marked key {key:?} as {plain:?}");
                (plain, from.get(key).or_else(|| from.get(plain)))
            }
            None if shadowed(key) => continue,
            None => (key.as_str(), from.get(key)),
        };

        let Some(old) = old else {
            out.insert(name.to_owned(), new.clone());
            continue;
        };

        match diff(old, new) {
            Some(Delta::Changes(records)) => {
                out.insert(value::array_key(name), change::to_value(records));
            }
            Some(delta) => {
                out.insert(name.to_owned(), delta.into_value());
            }
            None => {}
        }
    }

    let deleted: Vec<Value> = from
        .keys()
        .filter(|key| !to.contains_key(*key) && !shadowed(key.as_str()))
        .map(|key| Value::String(key.clone()))
        .collect();
    if !deleted.is_empty() {
        out.insert(DELETED_KEYS.to_owned(), Value::Array(deleted));
    }

    (!out.is_empty()).then_some(out)
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

fn diff_arrays(from: &[Value], to: &[Value]) -> Delta {
    // Filling an empty array is cheaper to send whole.
    if from.is_empty() {
        return Delta::Replace(Value::Array(to.to_vec()));
    }
    Delta::Changes(array_changes(from, to))
}

fn array_changes(from: &[Value], to: &[Value]) -> Vec<ChangeRecord> {
    let mut records = Vec::new();

    for i in 0..from.len().max(to.len()) {
        let old = from.get(i);
        let Some(new) = to.get(i) else {
            log::trace!("array shrank from {} to {i}", from.len());
            records.push(ChangeRecord::Resize { len: i });
            break;
        };
        if old == Some(new) {
            continue;
        }
        records.push(element_change(i, old, new));
    }

    records
}

fn element_change(index: usize, old: Option<&Value>, new: &Value) -> ChangeRecord {
    match (old, new) {
        (Some(Value::Array(inner_old)), Value::Array(inner_new)) if !inner_old.is_empty() => {
            ChangeRecord::Nested {
                index,
                changes: array_changes(inner_old, inner_new),
            }
        }
        _ => {
            let value = old
                .and_then(|old| compute_delta(old, new))
                .unwrap_or_else(|| new.clone());
            ChangeRecord::SetValue { index, value }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
