// Delta application.
//
// The inverse of `encoder::compute_delta`: given the source value and a
// delta, rebuild the target. The source is consumed and the merged value
// returned. Unlike delta computation, merging is strict: a delta whose shape
// does not fit the value it is applied to is an error.

use std::mem;

use serde_json::{Map, Value};
use thiserror::Error;

use super::change::{self, ChangeRecord, MAX_ARRAY_GROWTH, RecordError};
use super::value::{self, DELETED_KEYS, Kind};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum MergeError {
    /// A change record with a known type but unusable fields.
    #[error("invalid change record: {0}")]
    Record(#[from] RecordError),
    /// Array changes addressed at something that is not an array.
    #[error("array changes need an array, found {found}")]
    NotAnArray { found: Kind },
    /// A `#key` entry whose value is not a change list.
    #[error("array key `#{key}` must hold a change list, found {found}")]
    NotAChangeList { key: String, found: Kind },
    /// A `$` entry that is not a list of key names.
    #[error("deleted-keys entry `$` must be a list of strings")]
    InvalidDeletions,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Apply `delta` to `from` and return the result.
///
/// Primitive deltas, and deltas whose kind differs from `from`, replace the
/// value outright. Object deltas are merged key by key. An array delta on a
/// non-empty array is a change list; on an empty array it is the new
/// contents.
pub fn merge_into(from: Value, delta: &Value) -> Result<Value, MergeError> {
    match (from, delta) {
        (Value::Object(map), Value::Object(changes)) => {
            merge_object(map, changes).map(Value::Object)
        }
        (Value::Array(mut items), Value::Array(changes)) if !items.is_empty() => {
            apply_changes(&mut items, &change::parse_list(changes)?)?;
            Ok(Value::Array(items))
        }
        (from, delta) => {
            let (from_kind, delta_kind) = (Kind::of(&from), Kind::of(delta));
            if delta_kind.is_container() && from_kind != delta_kind {
                log::debug!("replacing {from_kind} with {delta_kind}");
            }
            Ok(delta.clone())
        }
    }
}

/// Apply an array change list to `from`.
///
/// A `null` target (including a missing key) is treated as an empty array,
/// so the records materialize a fresh one.
pub fn merge_array_changes(from: Value, changes: &[Value]) -> Result<Value, MergeError> {
    let mut items = into_items(from)?;
    apply_changes(&mut items, &change::parse_list(changes)?)?;
    Ok(Value::Array(items))
}

fn merge_object(
    mut from: Map<String, Value>,
    delta: &Map<String, Value>,
) -> Result<Map<String, Value>, MergeError> {
    for (key, change) in delta {
        if key == DELETED_KEYS {
            let names = change.as_array().ok_or(MergeError::InvalidDeletions)?;
            for name in names {
                let name = name.as_str().ok_or(MergeError::InvalidDeletions)?;
                from.shift_remove(name);
            }
            continue;
        }

        if let Some(name) = value::strip_array_marker(key) {
            let changes = change
                .as_array()
                .ok_or_else(|| MergeError::NotAChangeList {
                    key: name.to_owned(),
                    found: Kind::of(change),
                })?;
            let slot = from.entry(name).or_insert(Value::Null);
            let current = mem::take(slot);
            *slot = merge_array_changes(current, changes)?;
            continue;
        }

        match from.get_mut(key) {
            // New key: objects still go through a merge so any delta
            // conventions inside them are resolved.
            None => {
                let installed = match change {
                    Value::Object(_) => merge_into(Value::Object(Map::new()), change)?,
                    _ => change.clone(),
                };
                from.insert(key.clone(), installed);
            }
            Some(slot) => match change {
                Value::Object(_) => {
                    let current = mem::take(slot);
                    *slot = merge_into(current, change)?;
                }
                _ => *slot = change.clone(),
            },
        }
    }
    Ok(from)
}

fn into_items(value: Value) -> Result<Vec<Value>, MergeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => {
            log::debug!("materializing array changes against an empty array");
            Ok(Vec::new())
        }
        other => Err(MergeError::NotAnArray {
            found: Kind::of(&other),
        }),
    }
}

fn apply_changes(items: &mut Vec<Value>, records: &[ChangeRecord]) -> Result<(), MergeError> {
    for record in records {
        log::trace!("applying {} record", record.type_name());
        match record {
            ChangeRecord::Resize { len } => {
                check_growth(items.len(), *len, record.type_name(), "value", *len)?;
                items.resize(*len, Value::Null);
            }
            ChangeRecord::SetValue { index, value } => {
                let slot = slot_mut(items, *index, record.type_name())?;
                let current = mem::take(slot);
                *slot = merge_into(current, value)?;
            }
            ChangeRecord::Nested { index, changes } => {
                let slot = slot_mut(items, *index, record.type_name())?;
                let mut inner = into_items(mem::take(slot))?;
                apply_changes(&mut inner, changes)?;
                *slot = Value::Array(inner);
            }
        }
    }
    Ok(())
}

/// Element `index`, padding with `null` when the array is too short.
fn slot_mut<'a>(
    items: &'a mut Vec<Value>,
    index: usize,
    record: &'static str,
) -> Result<&'a mut Value, RecordError> {
    if index >= items.len() {
        check_growth(items.len(), index.saturating_add(1), record, "index", index)?;
        items.resize(index + 1, Value::Null);
    }
    Ok(&mut items[index])
}

/// Reject a record that would pad the array by more than `MAX_ARRAY_GROWTH`.
fn check_growth(
    current: usize,
    wanted: usize,
    record: &'static str,
    field: &'static str,
    value: usize,
) -> Result<(), RecordError> {
    if wanted.saturating_sub(current) > MAX_ARRAY_GROWTH {
        return Err(RecordError::TooLarge {
            record,
            field,
            value: value as u64,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
