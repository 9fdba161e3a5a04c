//! Benchmarks for block-encoder construction and emission
//!
//! Run with: cargo bench -p qbm-encode

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qbm_encode::{BlockEncoder, EncodingScheme, Hamiltonian};

/// Benchmark encoder construction (matrix assembly vs amplitude vector)
fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder_construction");

    for n in &[2usize, 4, 6, 8] {
        let h = Hamiltonian::transverse_field_ising(*n, 1.0, 0.5).unwrap();
        for scheme in [EncodingScheme::General, EncodingScheme::Lcu] {
            group.bench_with_input(BenchmarkId::new(scheme.to_string(), n), &h, |b, h| {
                b.iter(|| BlockEncoder::from_hamiltonian(black_box(h.clone()), scheme).unwrap());
            });
        }
    }

    group.finish();
}

/// Benchmark LCU circuit emission
fn bench_lcu_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("lcu_emission");

    for n in &[4usize, 8, 16, 32] {
        let h = Hamiltonian::transverse_field_ising(*n, 1.0, 0.5).unwrap();
        let encoder = BlockEncoder::from_hamiltonian(h, EncodingScheme::Lcu).unwrap();
        group.bench_with_input(BenchmarkId::new("tfi", n), &encoder, |b, enc| {
            b.iter(|| enc.build_circuit().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construction, bench_lcu_emission);
criterion_main!(benches);
