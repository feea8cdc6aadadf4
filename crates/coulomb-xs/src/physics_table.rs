//! Per-density-index tables shared between worker threads.
//!
//! A [`PhysicsTable`] holds one [`PhysicsLogVector`] slot per density
//! index. Slots are filled either up front (single-threaded, during
//! initialisation) or on first use. Each slot is a [`OnceLock`], so at
//! most one thread computes a given entry and every reader observes the
//! same immutable vector afterwards. Clearing requires `&mut self` and
//! therefore cannot race with readers.

use std::sync::OnceLock;

use coulomb_core::{Material, MaterialCutsCouple};

use crate::physics_vector::{PhysicsLogVector, TableGrid};

/// One lazily-filled vector per density index.
#[derive(Debug)]
pub struct PhysicsTable {
    grid: TableGrid,
    entries: Vec<OnceLock<PhysicsLogVector>>,
}

impl PhysicsTable {
    /// Empty table with `len` slots on `grid`.
    pub fn new(grid: TableGrid, len: usize) -> Self {
        Self {
            grid,
            entries: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    /// The energy grid.
    pub fn grid(&self) -> &TableGrid {
        &self.grid
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no slot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The vector in slot `index`, if built.
    pub fn get(&self, index: usize) -> Option<&PhysicsLogVector> {
        self.entries.get(index).and_then(OnceLock::get)
    }

    /// Returns `true` if slot `index` is built.
    pub fn is_built(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of built slots.
    pub fn built_count(&self) -> usize {
        self.entries.iter().filter(|e| e.get().is_some()).count()
    }

    /// The vector in slot `index`, building it with `build` if empty.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn get_or_build(
        &self,
        index: usize,
        build: impl FnOnce(&TableGrid) -> PhysicsLogVector,
    ) -> &PhysicsLogVector {
        assert!(
            index < self.entries.len(),
            "density index {index} out of range for table of {}",
            self.entries.len()
        );
        self.entries[index].get_or_init(|| build(&self.grid))
    }

    /// Value of a per-volume quantity for `couple` at `energy`.
    ///
    /// Inside the grid the couple's slot is used (built on first use
    /// from the couple's own material, normalised by its density factor)
    /// and scaled by the density factor. Outside the grid `compute` is
    /// called directly.
    pub fn value_for(
        &self,
        couple: &MaterialCutsCouple,
        energy: f64,
        compute: impl Fn(f64, &Material) -> f64,
    ) -> f64 {
        let material = couple.material();
        if !self.grid.contains(energy) {
            return compute(energy, material);
        }
        let factor = couple.density_factor();
        let vector = self.get_or_build(couple.density_index(), |grid| {
            PhysicsLogVector::build(grid, |e| compute(e, material) / factor)
        });
        vector.value(energy) * factor
    }

    /// Drop every built vector; later lookups rebuild on demand.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.take();
        }
    }
}
