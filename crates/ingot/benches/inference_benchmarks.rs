//! Parsing and type inference benchmarks.
//!
//! Measures parse-plus-infer cost across row and column counts, and raw
//! per-column inference over sampled values.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ingot::sanitize::sanitize_column_name;
use ingot::{Parser, TypeInferrer};

/// Generate synthetic CSV data with the specified number of rows and columns.
fn generate_csv_data(rows: usize, cols: usize) -> String {
    let mut data = String::new();

    for i in 0..cols {
        if i > 0 {
            data.push(',');
        }
        data.push_str(&format!("Column {}", i + 1));
    }
    data.push('\n');

    for row in 0..rows {
        for col in 0..cols {
            if col > 0 {
                data.push(',');
            }
            // One of each inferred type
            match col % 4 {
                0 => data.push_str(&row.to_string()),
                1 => data.push_str(&format!("{:.2}", row as f64 * 1.5)),
                2 => data.push_str(&format!("2023-{:02}-{:02}", (row % 12) + 1, (row % 28) + 1)),
                3 => data.push_str(&format!("Category_{}", row % 10)),
                _ => unreachable!(),
            }
        }
        data.push('\n');
    }

    data
}

/// Benchmark parsing CSV uploads of various sizes.
fn bench_parse_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_csv_data(*rows, 10);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse_source("bench.csv", data.as_bytes()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark parsing with varying column counts.
fn bench_parse_column_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_column_scaling");

    for cols in [5, 10, 20, 50].iter() {
        let data = generate_csv_data(1_000, *cols);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("cols", cols), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark inference of a single sampled column.
fn bench_infer_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer_column");
    let inferrer = TypeInferrer::new();

    let columns: [(&str, Vec<String>); 3] = [
        ("integer", (0..100).map(|i| i.to_string()).collect()),
        ("date", (0..100).map(|i| format!("{:02}/15/2024", i % 12 + 1)).collect()),
        ("text", (0..100).map(|i| format!("value {}", i)).collect()),
    ];

    for (name, values) in columns.iter() {
        group.bench_with_input(BenchmarkId::new("kind", name), values, |b, values| {
            b.iter(|| black_box(inferrer.infer(values.iter().map(|v| Some(v.as_str())))))
        });
    }

    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_column_name", |b| {
        b.iter(|| black_box(sanitize_column_name(black_box("Total Revenue (USD) 2024"))))
    });
}

criterion_group!(
    benches,
    bench_parse_csv,
    bench_parse_column_scaling,
    bench_infer_column,
    bench_sanitize,
);
criterion_main!(benches);
