//! Coulomb: Wentzel-VI multiple and single Coulomb scattering of charged
//! particles, as used inside a Monte Carlo transport engine.
//!
//! This is the facade crate re-exporting the public API of the coulomb
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use coulomb::prelude::*;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // Stopping power of 2 MeV/mm in every material.
//! struct Linear;
//! impl EnergyLossTables for Linear {
//!     fn range(&self, _: &ParticleDef, e: f64, _: &MaterialCutsCouple) -> f64 { e / 2.0 }
//!     fn energy(&self, _: &ParticleDef, r: f64, _: &MaterialCutsCouple) -> f64 { r * 2.0 }
//! }
//!
//! let water = Material::builder("water", 1.0)
//!     .element_by_atoms(Element::new("H", 1, 1.008).unwrap(), 2)
//!     .element_by_atoms(Element::new("O", 8, 15.999).unwrap(), 1)
//!     .build()
//!     .unwrap();
//! let mut couples = CoupleTable::new();
//! let id = couples.register(Arc::new(water), ProductionCuts::default());
//! let couples = Arc::new(couples);
//!
//! let config = MscConfig::default();
//! let tables = SharedTables::build(Arc::clone(&couples), &[ParticleDef::PROTON], &config).unwrap();
//! let mut stepper = WentzelStepper::new(config, Arc::new(tables), Arc::new(Linear)).unwrap();
//!
//! stepper.start_tracking(&ParticleDef::PROTON);
//! let pre = PreStepPoint {
//!     kinetic_energy: 100.0,
//!     position: Vec3::ZERO,
//!     direction: Vec3::Z_AXIS,
//!     couple: Arc::clone(couples.get(id).unwrap()),
//!     safety: 1.0,
//!     status: StepStatus::Other,
//! };
//! let limit = stepper.compute_true_path_length_limit(&pre, 10.0);
//! let t = stepper.compute_true_step_length(limit.geom_length);
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let outcome = stepper.sample_scattering(Vec3::Z_AXIS, 1.0, &mut rng);
//! assert!(t <= 10.0);
//! assert!(outcome.direction.is_unit(1e-9));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `coulomb-core` | Materials, couples, particles, vectors, units, collaborator traits |
//! | [`xs`] | `coulomb-xs` | Wentzel kernel, cross sections, shared physics tables |
//! | [`msc`] | `coulomb-msc` | Configuration, step limitation, path-length conversion, sampling |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Materials, couples, particles and collaborator traits (`coulomb-core`).
///
/// Also holds the unit constants in [`types::units`].
pub use coulomb_core as types;

/// Single-scattering cross sections and physics tables (`coulomb-xs`).
///
/// [`xs::CrossSectionEvaluator`] computes per-atom and per-volume cross
/// sections; [`xs::TransportTable`] and [`xs::SecondMomentTable`] cache
/// them per density index.
pub use coulomb_xs as xs;

/// The scattering stepper (`coulomb-msc`).
///
/// [`msc::WentzelStepper`] is the per-worker entry point;
/// [`msc::SharedTables`] holds the tables shared between workers.
pub use coulomb_msc as msc;

/// Common imports for typical usage.
///
/// ```rust
/// use coulomb::prelude::*;
/// ```
pub mod prelude {
    // Materials and particles
    pub use coulomb_core::{
        CoupleId, CoupleTable, Element, Material, MaterialCutsCouple, ParticleDef,
        ProductionCuts, Vec3,
    };

    // Collaborators and diagnostics
    pub use coulomb_core::{
        DiagnosticsSink, EnergyLossTables, GeometryNavigator, StderrSink, Verbosity,
    };

    // Errors
    pub use coulomb_core::MaterialError;
    pub use coulomb_msc::ConfigError;
    pub use coulomb_xs::TableError;

    // Stepper
    pub use coulomb_msc::{
        MscConfig, PreStepPoint, ScatteringMode, ScatteringOutcome, SharedTables,
        StepLimit, StepLimitType, StepMetrics, StepStatus, WentzelStepper,
    };
}
