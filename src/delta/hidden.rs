// Hidden key extraction.
//
// Keys starting with `_` (or `#_` for array-marked keys) carry data that
// should not travel with ordinary deltas. `extract_hidden` moves them out of
// a document into a separate tree with the same shape.

use serde_json::{Map, Value};

use super::value;

/// Remove every hidden key from `value` and return them as a separate tree.
///
/// Only objects are searched; hidden keys inside arrays are left alone.
/// Objects left empty after extraction are removed from their parent.
/// Returns `None` when nothing was hidden.
pub fn extract_hidden(value: &mut Value) -> Option<Value> {
    match value {
        Value::Object(map) => extract_from_map(map).map(Value::Object),
        _ => None,
    }
}

fn extract_from_map(map: &mut Map<String, Value>) -> Option<Map<String, Value>> {
    let mut hidden = Map::new();
    let keys: Vec<String> = map.keys().cloned().collect();

    for key in keys {
        if value::is_hidden_key(&key) {
            if let Some(moved) = map.shift_remove(&key) {
                hidden.insert(key, moved);
            }
            continue;
        }

        let Some(child) = map.get_mut(&key) else {
            continue;
        };
        if let Some(found) = extract_hidden(child) {
            hidden.insert(key.clone(), found);
        }
        if matches!(child, Value::Object(inner) if inner.is_empty()) {
            map.shift_remove(&key);
        }
    }

    (!hidden.is_empty()).then_some(hidden)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
