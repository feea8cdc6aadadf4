//! Second transport moment, tabulated per density index.
//!
//! The stepper reads this once per condensed sub-step when the
//! second-moment correction is enabled. When it is disabled the table is
//! never filled and every lookup returns zero.

use coulomb_core::{CoupleTable, MaterialCutsCouple, ParticleDef};

use crate::evaluator::CrossSectionEvaluator;
use crate::physics_table::PhysicsTable;
use crate::physics_vector::TableGrid;

/// `Σ nᵢ ∫(1 − cos θ)² dσᵢ` for one particle species.
#[derive(Debug)]
pub struct SecondMomentTable {
    evaluator: CrossSectionEvaluator,
    particle: ParticleDef,
    fixed_cut: Option<f64>,
    enabled: bool,
    table: PhysicsTable,
}

impl SecondMomentTable {
    /// Empty table with `density_count` slots.
    pub fn new(
        evaluator: CrossSectionEvaluator,
        particle: ParticleDef,
        grid: TableGrid,
        density_count: usize,
        fixed_cut: Option<f64>,
        enabled: bool,
    ) -> Self {
        Self {
            evaluator,
            particle,
            fixed_cut,
            enabled,
            table: PhysicsTable::new(grid, density_count),
        }
    }

    /// Whether lookups compute anything.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Build every slot up front. Does nothing when disabled.
    pub fn build_all(&self, couples: &CoupleTable) {
        if !self.enabled {
            return;
        }
        for index in 0..couples.density_index_count().min(self.table.len()) {
            if let Some(reference) = couples.reference_couple(index) {
                self.second_moment(reference, self.table.grid().emin());
            }
        }
    }

    /// Second moment per volume [1/mm] in `couple` at `kinetic_energy`;
    /// zero when disabled.
    pub fn second_moment(&self, couple: &MaterialCutsCouple, kinetic_energy: f64) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let cut = self.fixed_cut.unwrap_or(couple.cuts().electron_energy);
        self.table.value_for(couple, kinetic_energy, |e, material| {
            self.evaluator
                .second_moment_per_volume(&self.particle, e, material, cut)
        })
    }

    /// Returns `true` if the slot of `density_index` is built.
    pub fn is_built(&self, density_index: usize) -> bool {
        self.table.is_built(density_index)
    }

    /// Number of built slots.
    pub fn built_count(&self) -> usize {
        self.table.built_count()
    }

    /// Drop every built slot; later lookups recompute.
    pub fn force_rebuild(&mut self) {
        self.table.clear();
    }
}
