//! Benchmarks for points decoding and path reversal
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use graphite_router::render::{data_count, put_uvarint, Data};
use graphite_router::{classify, reverse_bytes, reverse_string};

/// RowBinary body with `series` metrics of `per_series` contiguous points each
fn create_test_body(series: usize, per_series: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for s in 0..series {
        let name = format!("servers.host{}.cpu.user", s);
        for i in 0..per_series {
            put_uvarint(&mut body, name.len() as u64);
            body.extend_from_slice(name.as_bytes());
            body.extend_from_slice(&((i * 60) as u32).to_le_bytes());
            body.extend_from_slice(&(i as f64).to_le_bytes());
            body.extend_from_slice(&((i * 60 + 1) as u32).to_le_bytes());
        }
    }
    body
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (series, per_series) in [(10, 100), (100, 100), (1000, 10)] {
        let body = create_test_body(series, per_series);
        let points = series * per_series;

        group.throughput(Throughput::Elements(points as u64));

        group.bench_function(format!("count_{}x{}", series, per_series), |b| {
            b.iter(|| data_count(black_box(&body)).unwrap())
        });

        group.bench_function(format!("parse_{}x{}", series, per_series), |b| {
            b.iter(|| Data::parse(black_box(&body), &[], false).unwrap())
        });

        group.bench_function(format!("parse_reverse_{}x{}", series, per_series), |b| {
            b.iter(|| Data::parse(black_box(&body), &[], true).unwrap())
        });
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");

    let body = create_test_body(100, 100);
    let data = Data::parse(&body, &[], false).unwrap();

    group.bench_function("sort_10000", |b| {
        b.iter_batched(
            || {
                let mut shuffled = data.clone();
                shuffled.points.reverse();
                shuffled
            },
            |mut d| d.sort(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse");
    let path = "servers.dc1.rack4.host17.cpu.user";

    group.bench_function("reverse_string", |b| {
        b.iter(|| reverse_string(black_box(path)))
    });

    group.bench_function("reverse_bytes", |b| {
        b.iter(|| reverse_bytes(black_box(path.as_bytes())))
    });

    group.bench_function("classify", |b| b.iter(|| classify(black_box(path))));

    group.finish();
}

criterion_group!(benches, bench_decode, bench_sort, bench_reverse);
criterion_main!(benches);
