use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jsondelta::{compute_delta, extract_hidden, merge_into};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

/// A game-like document: a square board, a player table and an event log.
fn gen_document(size: usize, seed: u64) -> Value {
    let mut rng = StdRng::seed_from_u64(seed);
    let board: Vec<Value> = (0..size)
        .map(|_| json!((0..size).map(|_| rng.random_range(0..3u8)).collect::<Vec<_>>()))
        .collect();
    let mut players = Map::new();
    for i in 0..size {
        players.insert(
            format!("player{i}"),
            json!({
                "name": format!("P{i}"),
                "score": rng.random_range(0..1000u32),
                "ready": rng.random_bool(0.5),
                "_token": rng.random::<u64>(),
            }),
        );
    }
    let events: Vec<Value> = (0..size * 4)
        .map(|i| json!({"seq": i, "kind": "move", "at": rng.random::<u32>()}))
        .collect();
    json!({"board": board, "players": players, "events": events, "turn": 0})
}

/// Apply a handful of random edits, roughly one per `stride` board cells.
fn mutate(base: &Value, stride: usize, seed: u64) -> Value {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = base.clone();
    if let Some(board) = out["board"].as_array_mut() {
        let size = board.len();
        for _ in 0..(size * size / stride.max(1)).max(1) {
            let (row, col) = (rng.random_range(0..size), rng.random_range(0..size));
            board[row][col] = json!(rng.random_range(0..3u8));
        }
    }
    if let Some(events) = out["events"].as_array_mut() {
        let keep = events.len() * 3 / 4;
        events.truncate(keep);
        events.push(json!({"seq": keep, "kind": "undo"}));
    }
    out["turn"] = json!(1);
    out
}

fn text_size(value: &Value) -> u64 {
    serde_json::to_vec(value).map(|v| v.len() as u64).unwrap_or(0)
}

fn bench_compute_delta(c: &mut Criterion) {
    let mut g = c.benchmark_group("compute_delta");
    for size in [8usize, 32, 128] {
        let source = gen_document(size, 1);
        let target = mutate(&source, 16, 2);
        g.throughput(Throughput::Bytes(text_size(&target)));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(compute_delta(black_box(&source), black_box(&target))));
        });
    }
    g.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut g = c.benchmark_group("merge_into");
    for size in [8usize, 32, 128] {
        let source = gen_document(size, 3);
        let target = mutate(&source, 16, 4);
        let delta = compute_delta(&source, &target).unwrap_or(Value::Null);
        g.throughput(Throughput::Bytes(text_size(&delta)));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let merged = merge_into(black_box(source.clone()), black_box(&delta)).unwrap();
                black_box(merged);
            });
        });
    }
    g.finish();
}

fn bench_identical(c: &mut Criterion) {
    let mut g = c.benchmark_group("identical_documents");
    let source = gen_document(64, 5);
    let target = source.clone();
    g.bench_function("compute_delta", |b| {
        b.iter(|| black_box(compute_delta(black_box(&source), black_box(&target))));
    });
    g.finish();
}

fn bench_extract_hidden(c: &mut Criterion) {
    let mut g = c.benchmark_group("extract_hidden");
    for size in [32usize, 256] {
        let doc = gen_document(size, 6);
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut doc = doc.clone();
                black_box(extract_hidden(&mut doc));
                black_box(doc);
            });
        });
    }
    g.finish();
}

fn bench_text_roundtrip(c: &mut Criterion) {
    let mut g = c.benchmark_group("engine_text_roundtrip");
    let source = serde_json::to_vec(&gen_document(32, 7)).unwrap();
    let target = serde_json::to_vec(&mutate(&gen_document(32, 7), 8, 8)).unwrap();
    g.throughput(Throughput::Bytes(target.len() as u64));
    g.bench_function("encode_decode", |b| {
        b.iter(|| {
            let mut delta = Vec::new();
            jsondelta::engine::encode(&source, &target, &mut delta).unwrap();
            let out = jsondelta::engine::decode(&source, &delta).unwrap();
            black_box(out);
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_compute_delta,
    bench_merge,
    bench_identical,
    bench_extract_hidden,
    bench_text_roundtrip
);
criterion_main!(benches);
