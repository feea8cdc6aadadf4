//! Traits through which the stepper talks to the rest of the transport
//! engine.
//!
//! Both collaborators are external to this workspace: a transport engine
//! supplies its own stopping-power tables and its own navigator.
//! Reference implementations for tests live in `coulomb-test-utils`.

use crate::couple::MaterialCutsCouple;
use crate::particle::ParticleDef;
use crate::vector::Vec3;

/// Continuous-slowing-down range and its inverse.
///
/// Implementations are read-only after construction and shared between
/// worker threads.
pub trait EnergyLossTables: Send + Sync {
    /// Residual range [mm] of `particle` with `kinetic_energy` in `couple`.
    fn range(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        couple: &MaterialCutsCouple,
    ) -> f64;

    /// Kinetic energy [MeV] corresponding to a residual `range`.
    ///
    /// Inverse of [`range`](Self::range); returns zero for a zero range.
    fn energy(&self, particle: &ParticleDef, range: f64, couple: &MaterialCutsCouple) -> f64;
}

/// Geometry queries needed for step limitation.
///
/// Navigators carry per-worker state and are owned by one stepper.
pub trait GeometryNavigator: Send {
    /// Isotropic safety at `position`: distance to the nearest boundary
    /// in any direction. The search may stop early once the safety is
    /// known to exceed `max_length`.
    fn compute_safety(&mut self, position: Vec3, max_length: f64) -> f64;

    /// Distance along `direction` to the next boundary, or a value of at
    /// least `max_length` if no boundary is closer.
    fn distance_to_boundary(&mut self, position: Vec3, direction: Vec3, max_length: f64) -> f64;
}
