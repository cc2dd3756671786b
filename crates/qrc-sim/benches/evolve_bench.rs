//! Benchmarks for reservoir dynamics
//!
//! Run with: cargo bench -p qrc-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qrc_sim::dynamics::{
    DynamicsEngine, EngineOptions, SplittingOrder, StatevectorEngine, TimeSchedule,
};
use qrc_sim::hamiltonian::{HamiltonianBuilder, HamiltonianParams};
use qrc_sim::layout::generate_sites;

/// Benchmark one full evolution as the site count grows
fn bench_evolve_sites(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve_sites");
    group.sample_size(10);

    let schedule = TimeSchedule::new(vec![0.0, 0.25, 0.5, 0.75, 1.0]).unwrap();
    let engine = StatevectorEngine::default();

    for num_sites in &[2, 4, 6, 8, 10] {
        let layout = generate_sites(*num_sites, 6.0).unwrap();
        let builder = HamiltonianBuilder::new(&layout, HamiltonianParams::new(6.0, 1.0)).unwrap();
        let h = builder.build(&[1.0, -2.0]).unwrap();

        group.bench_with_input(BenchmarkId::new("statevector", num_sites), &h, |b, h| {
            b.iter(|| engine.evolve(black_box(h), black_box(&schedule)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark first- vs second-order splitting at a fixed size
fn bench_splitting_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitting_order");
    group.sample_size(10);

    let layout = generate_sites(6, 6.0).unwrap();
    let builder = HamiltonianBuilder::new(&layout, HamiltonianParams::new(6.0, 1.0)).unwrap();
    let h = builder.build(&[3.0, -1.5, 0.5]).unwrap();
    let schedule = TimeSchedule::new(vec![0.0, 0.5, 1.0]).unwrap();

    for (name, order) in [
        ("first", SplittingOrder::First),
        ("second", SplittingOrder::Second),
    ] {
        let engine = StatevectorEngine::new(EngineOptions {
            order,
            ..EngineOptions::default()
        })
        .unwrap();
        group.bench_function(name, |b| {
            b.iter(|| engine.evolve(black_box(&h), black_box(&schedule)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark Hamiltonian construction per sample
fn bench_build_hamiltonian(c: &mut Criterion) {
    let layout = generate_sites(10, 6.0).unwrap();
    let builder = HamiltonianBuilder::new(&layout, HamiltonianParams::new(6.0, 1.0)).unwrap();
    let sample = [1.0, -2.0, 3.0, -4.0];

    c.bench_function("build_hamiltonian", |b| {
        b.iter(|| builder.build(black_box(&sample)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_evolve_sites,
    bench_splitting_order,
    bench_build_hamiltonian,
);
criterion_main!(benches);
