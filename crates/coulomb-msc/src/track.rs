//! Step-point data passed in by the tracking manager.

use std::sync::Arc;

use coulomb_core::{MaterialCutsCouple, Vec3};

/// How the pre-step point was reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepStatus {
    /// The previous step ended on a geometry boundary.
    GeomBoundary,
    /// Any other reason (physics limit, first step of a track, ...).
    #[default]
    Other,
}

/// State of the particle at the start of a step.
#[derive(Clone, Debug)]
pub struct PreStepPoint {
    /// Kinetic energy [MeV].
    pub kinetic_energy: f64,
    /// Position [mm].
    pub position: Vec3,
    /// Unit momentum direction.
    pub direction: Vec3,
    /// Material-cuts couple of the current volume.
    pub couple: Arc<MaterialCutsCouple>,
    /// Isotropic safety known at this point [mm].
    pub safety: f64,
    /// How this point was reached.
    pub status: StepStatus,
}

/// Result of [`compute_true_path_length_limit`].
///
/// [`compute_true_path_length_limit`]: crate::WentzelStepper::compute_true_path_length_limit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepLimit {
    /// Proposed true path length [mm].
    pub true_length: f64,
    /// Its geometric image [mm], to be clipped by the navigator.
    pub geom_length: f64,
}
