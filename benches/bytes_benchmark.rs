use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_handle::DataHandle;
use rand::prelude::*;
use std::fs;
use tempdir::TempDir;

fn generate_random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

fn generate_random_text(size: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
        .collect()
}

fn bytes_on_memory_payloads(c: &mut Criterion) {
    let inputs = [
        ("bytes_small", 1024),
        ("bytes_medium", 65536),
        ("bytes_large", 1048576),
    ];

    for (name, size) in inputs.iter() {
        let mut group = c.benchmark_group(name.to_string());
        group.measurement_time(std::time::Duration::from_secs(5));

        let mut raw = DataHandle::with_source(generate_random_data(*size));
        group.bench_function("raw_bytes", |b| {
            b.iter(|| {
                black_box(raw.bytes().expect("bytes returned an error"));
            });
        });

        let text = generate_random_text(*size);
        let mut latin1 = DataHandle::with_source(text.clone());
        latin1.set_encoding("latin1");
        group.bench_function("latin1_text", |b| {
            b.iter(|| {
                black_box(latin1.bytes().expect("bytes returned an error"));
            });
        });

        let chars: Vec<char> = text.chars().collect();
        group.bench_function("chars_materialize", |b| {
            b.iter(|| {
                let mut handle = DataHandle::with_source(chars.clone());
                black_box(handle.size().expect("size returned an error"));
            });
        });

        group.finish();
    }
}

fn bytes_on_files_benchmark(c: &mut Criterion) {
    let dir = TempDir::new("bytes_benchmark").unwrap();
    let path = dir.path().join("payload.bin");
    fs::write(&path, generate_random_data(1048576)).unwrap();

    let mut handle = DataHandle::from_source(path.as_path(), false);
    let mut group = c.benchmark_group("file_payload");
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("read_file", |b| {
        b.iter(|| {
            black_box(handle.bytes().expect("bytes returned an error"));
        });
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bytes_on_memory_payloads, bytes_on_files_benchmark
);
criterion_main!(benches);
