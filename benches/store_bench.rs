use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use fakedetector::{analysis, schema, statistics, NewAnalysis, Page, Scope};
use rusqlite::Connection;
use serde_json::json;

fn setup_store(rows: usize) -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory store");
    schema::ensure_schema(&conn).expect("schema");
    for i in 0..rows {
        analysis::create(&conn, &Scope::All, &sample(i)).expect("insert");
    }
    conn
}

fn sample(i: usize) -> NewAnalysis {
    let confidence = (i % 100) as f64;
    NewAnalysis {
        image_hash: json!(format!("hash-{i}")),
        prediction: json!(if i % 2 == 0 { "Gerçek" } else { "Sahte" }),
        confidence: json!(confidence),
        probabilities: json!({"real": confidence, "fake": 100.0 - confidence}),
        device_info: json!({"platform": "android", "version": "13"}),
        ..NewAnalysis::default()
    }
}

/// Benchmark single analysis insertion
fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_create");
    group.throughput(Throughput::Elements(1));
    group.bench_function("in_memory", |b| {
        let conn = setup_store(0);
        let record = sample(1);
        b.iter(|| analysis::create(&conn, &Scope::All, black_box(&record)).expect("insert"));
    });
    group.finish();
}

/// Benchmark the default history page over growing tables
fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_list");
    for size in [100, 1_000, 10_000] {
        let conn = setup_store(size);
        group.bench_function(format!("rows_{size}"), |b| {
            b.iter(|| analysis::list(&conn, &Scope::All, black_box(Page::default())).expect("list"));
        });
    }
    group.finish();
}

/// Benchmark the single-statement aggregate
fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");
    for size in [100, 1_000, 10_000] {
        let conn = setup_store(size);
        group.bench_function(format!("rows_{size}"), |b| {
            b.iter(|| statistics::compute(&conn, black_box(&Scope::All)).expect("stats"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_create, bench_list, bench_statistics);
criterion_main!(benches);
