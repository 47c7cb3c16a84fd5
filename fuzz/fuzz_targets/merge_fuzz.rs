#![no_main]
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Arbitrary deltas must merge or fail cleanly, never panic.
    let _ = jsondelta::engine::decode(br#"{"a": [1, [2, 3], {"b": null}], "c": "x"}"#, data);

    if let Some(split) = data.iter().position(|&b| b == 0) {
        let (source, delta) = (&data[..split], &data[split + 1..]);
        let (Ok(source), Ok(delta)) = (
            serde_json::from_slice::<Value>(source),
            serde_json::from_slice::<Value>(delta),
        ) else {
            return;
        };
        let _ = jsondelta::merge_into(source, &delta);
    }
});
