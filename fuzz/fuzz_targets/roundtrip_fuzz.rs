#![no_main]
use jsondelta::delta::value::find_reserved_key;
use jsondelta::{compute_delta, merge_into};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Split on the first NUL into source and target documents.
    let Some(split) = data.iter().position(|&b| b == 0) else {
        return;
    };
    let (Ok(from), Ok(to)) = (
        serde_json::from_slice::<Value>(&data[..split]),
        serde_json::from_slice::<Value>(&data[split + 1..]),
    ) else {
        return;
    };
    if find_reserved_key(&from).is_some() || find_reserved_key(&to).is_some() {
        return;
    }

    let merged = match compute_delta(&from, &to) {
        Some(delta) => merge_into(from, &delta).unwrap(),
        None => from,
    };
    assert_eq!(merged, to);
});
