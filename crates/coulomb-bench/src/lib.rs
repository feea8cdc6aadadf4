//! Benchmark profiles for the coulomb scattering crates.
//!
//! - [`reference_profile`]: the standard fixture materials with tables
//!   for electrons, protons and muons, and a constant stopping power
//! - [`run_steps`]: a fixed-length tracking loop in one couple

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use coulomb_core::{CoupleId, CoupleTable, ParticleDef, Vec3};
use coulomb_msc::{MscConfig, PreStepPoint, SharedTables, StepStatus, WentzelStepper};
use coulomb_test_utils::{fixtures, ConstantStoppingPower};
use rand::Rng;

/// Stopping power of the reference profile [MeV/mm].
pub const REFERENCE_DEDX: f64 = 2.0;

/// Build the reference profile with `config`.
///
/// Panics if `config` is invalid.
pub fn reference_profile(config: MscConfig) -> (WentzelStepper, Arc<CoupleTable>) {
    let couples = Arc::new(fixtures::standard_couples());
    let tables = SharedTables::build(
        Arc::clone(&couples),
        &[
            ParticleDef::ELECTRON,
            ParticleDef::PROTON,
            ParticleDef::MUON_MINUS,
        ],
        &config,
    )
    .expect("reference config is valid");
    let stepper = WentzelStepper::new(
        config,
        Arc::new(tables),
        Arc::new(ConstantStoppingPower::new(REFERENCE_DEDX)),
    )
    .expect("reference config is valid");
    (stepper, couples)
}

/// Run `steps` full steps of `particle` starting at `energy` in `couple`,
/// requesting at most `max_step` each; returns the final direction.
///
/// The energy is reset whenever it drops below 1 MeV.
#[allow(clippy::too_many_arguments)]
pub fn run_steps<R: Rng>(
    stepper: &mut WentzelStepper,
    couples: &CoupleTable,
    couple: CoupleId,
    particle: &ParticleDef,
    energy: f64,
    max_step: f64,
    steps: usize,
    rng: &mut R,
) -> Vec3 {
    let couple = Arc::clone(couples.get(couple).expect("couple is registered"));
    let mut direction = Vec3::Z_AXIS;
    let mut e = energy;
    stepper.start_tracking(particle);
    for _ in 0..steps {
        let pre = PreStepPoint {
            kinetic_energy: e,
            position: Vec3::ZERO,
            direction,
            couple: Arc::clone(&couple),
            safety: 0.1,
            status: StepStatus::Other,
        };
        let limit = stepper.compute_true_path_length_limit(&pre, max_step);
        let t = stepper.compute_true_step_length(limit.geom_length);
        direction = stepper.sample_scattering(direction, 0.1, rng).direction;
        e -= t * REFERENCE_DEDX;
        if e < 1.0 {
            e = energy;
        }
    }
    direction
}
