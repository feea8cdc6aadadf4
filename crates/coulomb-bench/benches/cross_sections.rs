//! Criterion micro-benchmarks for cross-section evaluation and lookups.

use std::hint::black_box;

use coulomb_bench::reference_profile;
use coulomb_core::ParticleDef;
use coulomb_msc::MscConfig;
use coulomb_test_utils::fixtures;
use coulomb_xs::SingleScatteringSet;
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark: direct per-volume transport cross section in lead.
fn bench_direct_transport_lead(c: &mut Criterion) {
    let (stepper, couples) = reference_profile(MscConfig::default());
    let lead = couples.get(fixtures::LEAD).unwrap();
    let evaluator = *stepper.evaluator();

    c.bench_function("direct_transport_lead", |b| {
        b.iter(|| {
            black_box(evaluator.transport_cross_section_per_volume_at(
                &ParticleDef::PROTON,
                lead,
                black_box(150.0),
            ))
        });
    });
}

/// Benchmark: table lookup of the transport mean free path.
fn bench_table_lookup(c: &mut Criterion) {
    let (mut stepper, couples) = reference_profile(MscConfig::default());
    let water = couples.get(fixtures::WATER).unwrap();
    stepper.start_tracking(&ParticleDef::ELECTRON);

    c.bench_function("table_lookup_water", |b| {
        b.iter(|| black_box(stepper.transport_mean_free_path(water, black_box(12.5))));
    });
}

/// Benchmark: filling the single-scattering working set for air.
fn bench_working_set_fill(c: &mut Criterion) {
    let (stepper, couples) = reference_profile(MscConfig::default());
    let air = couples.get(fixtures::AIR).unwrap();
    let evaluator = *stepper.evaluator();
    let kin = evaluator.kinematics(&ParticleDef::ELECTRON, 5.0, air.material());
    let mut set = SingleScatteringSet::new();

    c.bench_function("working_set_fill_air", |b| {
        b.iter(|| {
            black_box(evaluator.transport_cross_section_per_volume(
                &kin,
                air.material(),
                air.cuts().electron_energy,
                black_box(0.999),
                &mut set,
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_direct_transport_lead,
    bench_table_lookup,
    bench_working_set_fill
);
criterion_main!(benches);
