//! Integration test: drive the stepper through whole tracks.
//!
//! A minimal tracking loop steps particles through a sequence of
//! materials with constant stopping power, and checks reproducibility,
//! cache refreshes, step-limit bounds and the vacuum limit.

use std::sync::Arc;

use coulomb_core::units::MEV;
use coulomb_core::{CoupleId, CoupleTable, ParticleDef, Vec3};
use coulomb_msc::{
    MscConfig, PreStepPoint, ScatteringMode, SharedTables, StepStatus, WentzelStepper,
};
use coulomb_test_utils::{fixtures, ConstantStoppingPower};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ── Helpers ──────────────────────────────────────────────────────────

const DEDX: f64 = 2.0;

fn setup(config: MscConfig) -> (WentzelStepper, Arc<CoupleTable>) {
    let couples = Arc::new(fixtures::standard_couples());
    let tables = SharedTables::build(
        Arc::clone(&couples),
        &[ParticleDef::PROTON, ParticleDef::ELECTRON, ParticleDef::MUON_PLUS],
        &config,
    )
    .unwrap();
    let stepper = WentzelStepper::new(
        config,
        Arc::new(tables),
        Arc::new(ConstantStoppingPower::new(DEDX)),
    )
    .unwrap();
    (stepper, couples)
}

/// End state of one step: position and direction.
type StepRecord = (Vec3, Vec3);

/// Track `particle` through `materials`, `steps_per_material` steps each,
/// starting at `energy`.
fn run_track(
    stepper: &mut WentzelStepper,
    couples: &CoupleTable,
    particle: &ParticleDef,
    materials: &[CoupleId],
    steps_per_material: usize,
    energy: f64,
    seed: u64,
) -> Vec<StepRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut records = Vec::new();
    let mut position = Vec3::ZERO;
    let mut direction = Vec3::Z_AXIS;
    let mut energy = energy;
    stepper.start_tracking(particle);

    for &id in materials {
        let couple = couples.get(id).unwrap();
        for i in 0..steps_per_material {
            if energy <= 1.0 {
                return records;
            }
            let pre = PreStepPoint {
                kinetic_energy: energy,
                position,
                direction,
                couple: Arc::clone(couple),
                safety: 0.2,
                status: if i == 0 {
                    StepStatus::GeomBoundary
                } else {
                    StepStatus::Other
                },
            };
            let limit = stepper.compute_true_path_length_limit(&pre, 1.0);
            let t = stepper.compute_true_step_length(limit.geom_length);
            let outcome = stepper.sample_scattering(direction, 0.2, &mut rng);
            position = position + direction * limit.geom_length + outcome.displacement;
            direction = outcome.direction;
            energy -= t * DEDX;
            records.push((position, direction));
        }
    }
    records
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn same_seed_reproduces_track() {
    let (mut a, couples) = setup(MscConfig::default());
    let mut b = a.for_worker();
    let materials = [fixtures::WATER, fixtures::LEAD];
    let ra = run_track(&mut a, &couples, &ParticleDef::PROTON, &materials, 30, 150.0, 42);
    let rb = run_track(&mut b, &couples, &ParticleDef::PROTON, &materials, 30, 150.0, 42);
    assert!(!ra.is_empty());
    assert_eq!(ra, rb);
    assert_eq!(a.metrics(), b.metrics());
}

#[test]
fn different_seeds_diverge() {
    let (mut a, couples) = setup(MscConfig::default());
    let materials = [fixtures::LEAD];
    let r1 = run_track(&mut a, &couples, &ParticleDef::ELECTRON, &materials, 20, 50.0, 1);
    let r2 = run_track(&mut a, &couples, &ParticleDef::ELECTRON, &materials, 20, 50.0, 2);
    assert_ne!(r1, r2);
}

#[test]
fn material_changes_refresh_cache_once_each() {
    let (mut s, couples) = setup(MscConfig::default());
    let materials = [fixtures::WATER, fixtures::ALUMINIUM, fixtures::LEAD];
    let records = run_track(&mut s, &couples, &ParticleDef::MUON_PLUS, &materials, 5, 1.0e4, 3);
    assert_eq!(records.len(), 15);
    assert_eq!(s.metrics().material_refreshes, 3);
    assert_eq!(s.metrics().particle_setups, 1);
    assert_eq!(s.metrics().steps, 15);
}

#[test]
fn cross_sections_follow_the_current_material() {
    let (mut s, couples) = setup(MscConfig::default());
    s.start_tracking(&ParticleDef::PROTON);
    for id in [fixtures::WATER, fixtures::ALUMINIUM, fixtures::LEAD, fixtures::WATER] {
        let couple = couples.get(id).unwrap();
        let energy = 100.0 * MEV;
        let from_table = s.transport_cross_section_per_volume(couple, energy);
        let direct = s.evaluator().transport_cross_section_per_volume_at(
            &ParticleDef::PROTON,
            couple,
            energy,
        );
        assert!(
            (from_table / direct - 1.0).abs() < 0.01,
            "{}: table {from_table} direct {direct}",
            couple.material().name()
        );
        let mfp = s.transport_mean_free_path(couple, energy);
        assert!((mfp * from_table - 1.0).abs() < 1e-12);
    }
    assert_eq!(s.metrics().material_refreshes, 4);
}

/// Inverse transport mean free path [1/mm] of protons in a one-element
/// material, from the screened Rutherford law written out in full.
fn screened_rutherford_inverse_mfp(ekin: f64, z: f64, a: f64, density: f64, cut: f64) -> f64 {
    use coulomb_core::units::{
        AVOGADRO, CLASSIC_ELECTRON_RADIUS, CM3, ELECTRON_MASS_C2, FERMI, FINE_STRUCTURE, HBARC,
    };
    let me = ELECTRON_MASS_C2;
    let m = ParticleDef::PROTON.mass;
    let p2 = ekin * (ekin + 2.0 * m);
    let invbeta2 = 1.0 + m * m / p2;
    let fb = 0.5 / invbeta2;
    let alpha2 = FINE_STRUCTURE * FINE_STRUCTURE;
    let screen = 0.5 * alpha2 * (me / 0.88534).powi(2)
        * (1.0 + (-z * z * 0.001).exp())
        * z.powf(2.0 / 3.0)
        * (z * invbeta2).min(1.13 + 3.76 * z * z * invbeta2 * alpha2)
        / p2;
    let k = 2.0 * std::f64::consts::PI * (CLASSIC_ELECTRON_RADIUS * me).powi(2) * invbeta2 / p2;
    // nucleus up to the nuclear-size angle, electrons up to the cut
    let u_nuc = (0.5 * (HBARC / FERMI).powi(2) * a.powf(-2.0 / 3.0) / p2).min(2.0);
    let (ratio, tau) = (me / m, ekin / m);
    let tmax = 2.0 * me * tau * (tau + 2.0) / (1.0 + 2.0 * ratio * (tau + 1.0) + ratio * ratio);
    let u_elec = cut.min(tmax) * me / p2;
    let moment = |u: f64| {
        let x = u / screen;
        let l = x.ln_1p();
        l - x / (1.0 + x) - screen * fb * (x - 2.0 * l + x / (1.0 + x))
    };
    let atoms = AVOGADRO * density / a / CM3;
    atoms * k * (z * z * moment(u_nuc) + z * moment(u_elec))
}

#[test]
fn aluminium_matches_screened_rutherford_by_hand() {
    let (mut s, couples) = setup(MscConfig::default());
    s.start_tracking(&ParticleDef::PROTON);
    let al = couples.get(fixtures::ALUMINIUM).unwrap();
    let expected = screened_rutherford_inverse_mfp(100.0 * MEV, 13.0, 26.982, 2.699, 1.0e-3);
    let from_table = s.transport_cross_section_per_volume(al, 100.0 * MEV);
    assert!(
        (from_table / expected - 1.0).abs() < 0.01,
        "table {from_table} by hand {expected}"
    );
    // about 17 m, in line with the Highland width for 1 cm of aluminium
    let mfp = s.transport_mean_free_path(al, 100.0 * MEV);
    assert!(mfp > 1.5e4 && mfp < 2.0e4, "λ = {mfp} mm");
}

#[test]
fn heavier_material_scatters_more() {
    let (mut s, couples) = setup(MscConfig::default());
    s.start_tracking(&ParticleDef::PROTON);
    let water = s.transport_mean_free_path(couples.get(fixtures::WATER).unwrap(), 200.0);
    let lead = s.transport_mean_free_path(couples.get(fixtures::LEAD).unwrap(), 200.0);
    assert!(lead < water);
}

#[test]
fn vacuum_transports_in_straight_lines() {
    let (mut s, couples) = setup(MscConfig::default());
    let records = run_track(
        &mut s,
        &couples,
        &ParticleDef::ELECTRON,
        &[fixtures::VACUUM],
        10,
        20.0,
        11,
    );
    assert_eq!(records.len(), 10);
    for (position, direction) in &records {
        assert_eq!(*direction, Vec3::Z_AXIS);
        assert_eq!(position.x, 0.0);
        assert_eq!(position.y, 0.0);
    }
    assert_eq!(s.mode(), ScatteringMode::Single);
    assert_eq!(s.metrics().hard_scatterings, 0);
}

#[test]
fn fixed_cut_changes_per_step_quantities_only() {
    let (mut s, couples) = setup(MscConfig::default());
    let mut cut = s.for_worker();
    cut.set_fixed_cut(Some(1.0 * MEV));
    assert_eq!(cut.fixed_cut(), Some(1.0 * MEV));

    // tables keep the cut they were built with
    s.start_tracking(&ParticleDef::ELECTRON);
    cut.start_tracking(&ParticleDef::ELECTRON);
    let water = couples.get(fixtures::WATER).unwrap();
    assert_eq!(
        s.transport_cross_section_per_volume(water, 5.0),
        cut.transport_cross_section_per_volume(water, 5.0)
    );

    // the working set and the condensed part do not
    let plain = run_track(&mut s, &couples, &ParticleDef::ELECTRON, &[fixtures::WATER], 20, 8.0, 17);
    let with_cut =
        run_track(&mut cut, &couples, &ParticleDef::ELECTRON, &[fixtures::WATER], 20, 8.0, 17);
    assert_eq!(plain.len(), with_cut.len());
    assert_ne!(plain, with_cut);
}

#[test]
fn second_moment_keeps_sampling_valid() {
    let config = MscConfig {
        use_second_moment: true,
        ..MscConfig::default()
    };
    let (mut s, couples) = setup(config);
    assert!(s
        .second_moment_table(&ParticleDef::PROTON)
        .unwrap()
        .is_enabled());
    let records = run_track(
        &mut s,
        &couples,
        &ParticleDef::PROTON,
        &[fixtures::ALUMINIUM, fixtures::LEAD],
        25,
        300.0,
        8,
    );
    for (_, direction) in &records {
        assert!(direction.is_unit(1e-9));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn step_limit_stays_within_range(
        energy in 1.0e-2f64..1.0e5,
        request in 0.0f64..1.0e4,
        safety in 0.0f64..10.0,
        material in 0u32..7,
    ) {
        let (mut s, couples) = setup(MscConfig::default());
        s.start_tracking(&ParticleDef::PROTON);
        let couple = couples.get(CoupleId(material)).unwrap();
        let pre = PreStepPoint {
            kinetic_energy: energy,
            position: Vec3::ZERO,
            direction: Vec3::Z_AXIS,
            couple: Arc::clone(couple),
            safety,
            status: StepStatus::Other,
        };
        let limit = s.compute_true_path_length_limit(&pre, request);
        let range = energy / DEDX;
        prop_assert!(limit.true_length >= 0.0);
        prop_assert!(limit.true_length <= range.min(request) * (1.0 + 1e-12));
        prop_assert!(limit.geom_length >= 0.0);
        prop_assert!(limit.geom_length <= limit.true_length * (1.0 + 1e-12));
        let t = s.compute_true_step_length(0.5 * limit.geom_length);
        prop_assert!(t >= 0.5 * limit.geom_length);
        prop_assert!(t <= limit.true_length * (1.0 + 1e-9));
    }
}
