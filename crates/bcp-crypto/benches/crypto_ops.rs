//! Throughput of setup and the hybrid encrypt/decrypt paths.

#![allow(missing_docs)]

use std::hint::black_box;

use bcp_crypto::{SetupConfig, decrypt, encrypt, generate_keypair, master_decrypt, setup};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const LEVELS: [u32; 2] = [64, 128];

fn config(security_level: u32) -> SetupConfig {
    SetupConfig { security_level, ..Default::default() }
}

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("setup");
    group.sample_size(10);
    for level in LEVELS {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| setup(black_box(&config(level))));
        });
    }
    group.finish();
}

fn bench_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_1kb");
    let data = vec![0u8; 1024];
    for level in LEVELS {
        let params = setup(&config(level)).unwrap();
        let pair = generate_keypair(&params).unwrap();
        group.bench_function(BenchmarkId::from_parameter(level), |b| {
            b.iter(|| encrypt(&params, black_box(&pair.public), black_box(&data)));
        });
    }
    group.finish();
}

fn bench_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("decrypt_1kb");
    let data = vec![0u8; 1024];
    for level in LEVELS {
        let params = setup(&config(level)).unwrap();
        let pair = generate_keypair(&params).unwrap();
        let ct = encrypt(&params, &pair.public, &data).unwrap();

        group.bench_function(BenchmarkId::new("holder", level), |b| {
            b.iter(|| decrypt(&params, black_box(&ct), black_box(&pair.secret)));
        });
        if params.escrow_enabled() {
            group.bench_function(BenchmarkId::new("master", level), |b| {
                b.iter(|| master_decrypt(&params, black_box(&ct), black_box(&pair.public)));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_setup, bench_encrypt, bench_decrypt);
criterion_main!(benches);
