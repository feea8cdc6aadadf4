//! Test utilities and mock collaborators for Coulomb development.
//!
//! Provides simple implementations of the collaborator traits
//! ([`EnergyLossTables`], [`GeometryNavigator`], [`DiagnosticsSink`]) and
//! a [`fixtures`] module with standard elements, materials and a couple
//! table.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::fmt;
use std::sync::{Arc, Mutex};

use coulomb_core::{
    DiagnosticsSink, EnergyLossTables, GeometryNavigator, MaterialCutsCouple, ParticleDef, Vec3,
};

/// Energy loss at a constant rate in every material and for every species.
///
/// `range = E / dedx` and `energy = range · dedx`, so the two are exact
/// inverses.
#[derive(Clone, Copy, Debug)]
pub struct ConstantStoppingPower {
    pub dedx: f64,
}

impl ConstantStoppingPower {
    /// Stopping power `dedx` [MeV/mm].
    pub fn new(dedx: f64) -> Self {
        assert!(dedx > 0.0, "stopping power must be > 0");
        Self { dedx }
    }
}

impl EnergyLossTables for ConstantStoppingPower {
    fn range(&self, _: &ParticleDef, kinetic_energy: f64, _: &MaterialCutsCouple) -> f64 {
        kinetic_energy / self.dedx
    }

    fn energy(&self, _: &ParticleDef, range: f64, _: &MaterialCutsCouple) -> f64 {
        range * self.dedx
    }
}

/// Navigator for a world without boundaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct InfiniteMedium;

impl GeometryNavigator for InfiniteMedium {
    fn compute_safety(&mut self, _: Vec3, _: f64) -> f64 {
        f64::INFINITY
    }

    fn distance_to_boundary(&mut self, _: Vec3, _: Vec3, _: f64) -> f64 {
        f64::INFINITY
    }
}

/// Navigator for a slab `z_min ≤ z ≤ z_max`, infinite in x and y.
///
/// Counts the queries it answers so tests can check when the stepper
/// consults the geometry.
#[derive(Clone, Debug)]
pub struct SlabNavigator {
    pub z_min: f64,
    pub z_max: f64,
    pub safety_queries: usize,
    pub distance_queries: usize,
}

impl SlabNavigator {
    pub fn new(z_min: f64, z_max: f64) -> Self {
        assert!(z_min < z_max, "slab must have positive thickness");
        Self {
            z_min,
            z_max,
            safety_queries: 0,
            distance_queries: 0,
        }
    }
}

impl GeometryNavigator for SlabNavigator {
    fn compute_safety(&mut self, position: Vec3, _: f64) -> f64 {
        self.safety_queries += 1;
        (position.z - self.z_min).min(self.z_max - position.z).max(0.0)
    }

    fn distance_to_boundary(&mut self, position: Vec3, direction: Vec3, _: f64) -> f64 {
        self.distance_queries += 1;
        if direction.z > 0.0 {
            ((self.z_max - position.z) / direction.z).max(0.0)
        } else if direction.z < 0.0 {
            ((self.z_min - position.z) / direction.z).max(0.0)
        } else {
            f64::INFINITY
        }
    }
}

/// Sink that stores every line in a shared buffer.
///
/// Clones share the buffer, so a test can keep one clone and hand the
/// other to the code under test.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticsSink for RecordingSink {
    fn write_line(&mut self, args: fmt::Arguments<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(args.to_string());
        }
    }
}
