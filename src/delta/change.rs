// Array change records.
//
// An array change list is an ordered JSON array of records:
//
//   {"type": "resize",   "value": N}              truncate/pad to N
//   {"type": "setvalue", "index": i, "value": D}  element i = merge(element i, D)
//   {"type": "nested",   "index": i, "value": L}  element i is an array, apply L
//
// Records are applied strictly in order. A record whose `type` is not one of
// the above ends the list.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Most elements a single record may add to an array.
///
/// Only growth is bounded: a record may address any index of an array that
/// already exists, however long.
pub const MAX_ARRAY_GROWTH: usize = 1 << 24;

const TYPE_RESIZE: &str = "resize";
const TYPE_SET_VALUE: &str = "setvalue";
const TYPE_NESTED: &str = "nested";

/// One step of an array transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    /// Truncate or pad (with `null`) the array to `len` elements.
    Resize { len: usize },
    /// Replace element `index` with the merge of its current value and `value`.
    SetValue { index: usize, value: Value },
    /// Apply `changes` to the array stored at element `index`.
    Nested {
        index: usize,
        changes: Vec<ChangeRecord>,
    },
}

/// A record with a recognized `type` whose fields are unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("`{record}` record is missing field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("`{record}` record field `{field}` must be {expected}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        expected: &'static str,
    },
    #[error(
        "`{record}` record field `{field}` is {value}, which would add more than {limit} elements",
        limit = MAX_ARRAY_GROWTH
    )]
    TooLarge {
        record: &'static str,
        field: &'static str,
        value: u64,
    },
}

impl ChangeRecord {
    /// The wire name of this record's `type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => TYPE_RESIZE,
            Self::SetValue { .. } => TYPE_SET_VALUE,
            Self::Nested { .. } => TYPE_NESTED,
        }
    }

    /// Parse one record from its wire form.
    ///
    /// Returns `Ok(None)` when the record has no recognized `type`; callers
    /// stop processing the list at that point.
    pub fn parse(record: &Value) -> Result<Option<Self>, RecordError> {
        let Some(fields) = record.as_object() else {
            return Ok(None);
        };
        let parsed = match fields.get("type").and_then(Value::as_str) {
            Some(TYPE_RESIZE) => Self::Resize {
                len: read_len(fields, TYPE_RESIZE, "value")?,
            },
            Some(TYPE_SET_VALUE) => Self::SetValue {
                index: read_len(fields, TYPE_SET_VALUE, "index")?,
                value: fields
                    .get("value")
                    .cloned()
                    .ok_or(RecordError::MissingField {
                        record: TYPE_SET_VALUE,
                        field: "value",
                    })?,
            },
            Some(TYPE_NESTED) => {
                let index = read_len(fields, TYPE_NESTED, "index")?;
                let inner = match fields.get("value") {
                    Some(Value::Array(inner)) => inner,
                    Some(_) => {
                        return Err(RecordError::InvalidField {
                            record: TYPE_NESTED,
                            field: "value",
                            expected: "a change list",
                        });
                    }
                    None => {
                        return Err(RecordError::MissingField {
                            record: TYPE_NESTED,
                            field: "value",
                        });
                    }
                };
                Self::Nested {
                    index,
                    changes: parse_list(inner)?,
                }
            }
            other => {
                log::warn!("unrecognized change record type {other:?}, ignoring remaining records");
                return Ok(None);
            }
        };
        Ok(Some(parsed))
    }
}

/// Parse a change list, stopping at the first unrecognized record.
pub fn parse_list(records: &[Value]) -> Result<Vec<ChangeRecord>, RecordError> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        match ChangeRecord::parse(record)? {
            Some(parsed) => out.push(parsed),
            None => break,
        }
    }
    Ok(out)
}

/// Serialize a change list to its wire form.
pub fn to_value(records: Vec<ChangeRecord>) -> Value {
    Value::Array(records.into_iter().map(Value::from).collect())
}

fn read_len(
    fields: &Map<String, Value>,
    record: &'static str,
    field: &'static str,
) -> Result<usize, RecordError> {
    let raw = fields
        .get(field)
        .ok_or(RecordError::MissingField { record, field })?;
    raw.as_u64()
        .and_then(|value| usize::try_from(value).ok())
        .ok_or(RecordError::InvalidField {
            record,
            field,
            expected: "a non-negative integer",
        })
}

impl From<ChangeRecord> for Value {
    fn from(record: ChangeRecord) -> Self {
        match record {
            ChangeRecord::Resize { len } => json!({ "type": TYPE_RESIZE, "value": len }),
            ChangeRecord::SetValue { index, value } => {
                json!({ "type": TYPE_SET_VALUE, "index": index, "value": value })
            }
            ChangeRecord::Nested { index, changes } => {
                json!({ "type": TYPE_NESTED, "index": index, "value": to_value(changes) })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_exact() {
        let records = vec![
            ChangeRecord::Nested {
                index: 0,
                changes: vec![ChangeRecord::SetValue {
                    index: 3,
                    value: json!("x"),
                }],
            },
            ChangeRecord::Resize { len: 2 },
        ];
        let wire = to_value(records.clone());
        assert_eq!(
            wire,
            json!([
                {"type": "nested", "index": 0, "value": [
                    {"type": "setvalue", "index": 3, "value": "x"}
                ]},
                {"type": "resize", "value": 2}
            ])
        );

        let text = serde_json::to_string(&wire).unwrap();
        let reread: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parse_list(reread.as_array().unwrap()).unwrap(), records);
    }

    #[test]
    fn type_names() {
        assert_eq!(ChangeRecord::Resize { len: 0 }.type_name(), "resize");
        assert_eq!(
            ChangeRecord::SetValue {
                index: 0,
                value: Value::Null
            }
            .type_name(),
            "setvalue"
        );
    }

    #[test]
    fn unknown_type_ends_the_list() {
        let wire = json!([
            {"type": "setvalue", "index": 0, "value": 1},
            {"type": "move", "from": 0, "to": 1},
            {"type": "resize", "value": 0}
        ]);
        let parsed = parse_list(wire.as_array().unwrap()).unwrap();
        assert_eq!(
            parsed,
            vec![ChangeRecord::SetValue {
                index: 0,
                value: json!(1)
            }]
        );
    }

    #[test]
    fn non_object_record_ends_the_list() {
        let wire = json!([{"type": "resize", "value": 1}, 42, {"type": "resize", "value": 0}]);
        let parsed = parse_list(wire.as_array().unwrap()).unwrap();
        assert_eq!(parsed, vec![ChangeRecord::Resize { len: 1 }]);
    }

    #[test]
    fn setvalue_null_is_kept() {
        let parsed = ChangeRecord::parse(&json!({"type": "setvalue", "index": 2, "value": null}))
            .unwrap()
            .unwrap();
        assert_eq!(
            parsed,
            ChangeRecord::SetValue {
                index: 2,
                value: Value::Null
            }
        );
    }

    #[test]
    fn malformed_fields_are_errors() {
        assert_eq!(
            ChangeRecord::parse(&json!({"type": "resize"})),
            Err(RecordError::MissingField {
                record: "resize",
                field: "value"
            })
        );
        assert_eq!(
            ChangeRecord::parse(&json!({"type": "setvalue", "index": -1, "value": 0})),
            Err(RecordError::InvalidField {
                record: "setvalue",
                field: "index",
                expected: "a non-negative integer"
            })
        );
        assert_eq!(
            ChangeRecord::parse(&json!({"type": "setvalue", "index": 1})),
            Err(RecordError::MissingField {
                record: "setvalue",
                field: "value"
            })
        );
        assert!(matches!(
            ChangeRecord::parse(&json!({"type": "nested", "index": 0, "value": {}})),
            Err(RecordError::InvalidField { .. })
        ));
    }

    #[test]
    fn large_lengths_parse() {
        let len = MAX_ARRAY_GROWTH + 1;
        assert_eq!(
            ChangeRecord::parse(&json!({"type": "resize", "value": len})),
            Ok(Some(ChangeRecord::Resize { len }))
        );
    }
}
