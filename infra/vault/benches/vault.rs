use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use getrandom::fill;
use helm_vault::prelude::*;
use std::hint::black_box;

fn bench_sealer(c: &mut Criterion) {
    let mut group = c.benchmark_group("sealer");
    let sealer = Sealer::new(KeyManager::builder().secret(Some("bench-secret")).build());

    // Cookie-sized layouts: a handful of widgets up to the 3800 byte budget.
    let sizes = [("256B", 256usize), ("1KB", 1024), ("3KB", 3 * 1024)];

    for (label, size) in sizes {
        let mut data = vec![0u8; size];
        fill(&mut data).expect("System RNG unavailable for benchmark data");
        let value = serde_json::json!({ "layout": data });

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("seal", label), &value, |b, v| {
            b.iter(|| sealer.seal(black_box(v)).unwrap());
        });

        let sealed = sealer.seal(&value).expect("seal failed");
        group.bench_with_input(BenchmarkId::new("unseal", label), &sealed, |b, s| {
            b.iter(|| sealer.unseal::<serde_json::Value>(black_box(s)).unwrap());
        });
    }

    group.finish();
}

fn bench_token(c: &mut Criterion) {
    let codec = TokenCodec::new(KeyManager::builder().secret(Some("bench-secret")).build());
    let encrypted = codec.encrypt("gw-0123456789abcdef").unwrap();

    c.bench_function("token/encrypt", |b| b.iter(|| codec.encrypt(black_box("gw-0123456789abcdef")).unwrap()));
    c.bench_function("token/decrypt", |b| b.iter(|| codec.decrypt(black_box(&encrypted)).unwrap()));
    c.bench_function("token/is_encrypted", |b| b.iter(|| TokenCodec::is_encrypted(black_box(&encrypted))));
}

criterion_group!(benches, bench_sealer, bench_token);
criterion_main!(benches);
