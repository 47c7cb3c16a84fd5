use jsondelta::delta::value::find_reserved_key;
use jsondelta::{compute_delta, merge_into};
use serde_json::Value;

#[derive(Debug)]
struct Vector {
    name: String,
    from: Value,
    to: Value,
    expected: Option<Value>,
}

fn parse(name: &str, field: &str, text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| panic!("vector {name}: bad {field}: {e}"))
}

fn load_vectors() -> Vec<Vector> {
    let manifest = include_str!("vectors/manifest.tsv");
    manifest
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            let parts: Vec<_> = line.split('|').collect();
            assert_eq!(parts.len(), 4, "invalid vector row: {line}");
            let name = parts[0];
            Vector {
                name: name.to_string(),
                from: parse(name, "from", parts[1]),
                to: parse(name, "to", parts[2]),
                expected: match parts[3].trim() {
                    "-" => None,
                    text => Some(parse(name, "expected", text)),
                },
            }
        })
        .collect()
}

#[test]
fn manifest_is_not_empty() {
    assert!(load_vectors().len() >= 20);
}

#[test]
fn vectors_produce_exact_deltas() {
    for v in load_vectors() {
        let delta = compute_delta(&v.from, &v.to);
        assert_eq!(delta, v.expected, "delta mismatch for vector {}", v.name);
    }
}

#[test]
fn vectors_roundtrip() {
    for v in load_vectors() {
        if find_reserved_key(&v.to).is_some() {
            continue;
        }
        let merged = match &v.expected {
            Some(delta) => merge_into(v.from.clone(), delta).unwrap(),
            None => v.from.clone(),
        };
        assert_eq!(merged, v.to, "roundtrip mismatch for vector {}", v.name);
    }
}

#[test]
fn vectors_survive_text_serialization() {
    for v in load_vectors() {
        let Some(delta) = v.expected else { continue };
        let text = serde_json::to_string(&delta).unwrap();
        let reread: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reread, delta, "wire form changed for vector {}", v.name);
    }
}

#[test]
fn array_marked_target_key_merges_under_plain_name() {
    let vector = load_vectors()
        .into_iter()
        .find(|v| v.name == "array_marked_target_key")
        .unwrap();
    let merged = merge_into(vector.from, &vector.expected.unwrap()).unwrap();
    assert_eq!(merged, serde_json::json!({"a": [1, 3]}));
}
