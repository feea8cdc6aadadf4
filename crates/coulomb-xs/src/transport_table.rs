//! Inverse transport mean free path, tabulated per density index.

use coulomb_core::{CoupleTable, MaterialCutsCouple, ParticleDef};

use crate::evaluator::CrossSectionEvaluator;
use crate::physics_table::PhysicsTable;
use crate::physics_vector::TableGrid;

/// `1/λ(E)` for one particle species over all density indices of a
/// [`CoupleTable`].
#[derive(Debug)]
pub struct TransportTable {
    evaluator: CrossSectionEvaluator,
    particle: ParticleDef,
    fixed_cut: Option<f64>,
    table: PhysicsTable,
}

impl TransportTable {
    /// Empty table with `density_count` slots.
    ///
    /// `fixed_cut`, when set, replaces every couple's electron cut.
    pub fn new(
        evaluator: CrossSectionEvaluator,
        particle: ParticleDef,
        grid: TableGrid,
        density_count: usize,
        fixed_cut: Option<f64>,
    ) -> Self {
        Self {
            evaluator,
            particle,
            fixed_cut,
            table: PhysicsTable::new(grid, density_count),
        }
    }

    /// Build the slot of every density index up front.
    pub fn build_all(&self, couples: &CoupleTable) {
        for index in 0..couples.density_index_count().min(self.table.len()) {
            if let Some(reference) = couples.reference_couple(index) {
                let e = self.table.grid().emin();
                self.inverse_mfp(reference, e);
            }
        }
    }

    /// The particle species.
    pub fn particle(&self) -> &ParticleDef {
        &self.particle
    }

    /// Inverse transport mean free path [1/mm] in `couple` at
    /// `kinetic_energy`.
    pub fn inverse_mfp(&self, couple: &MaterialCutsCouple, kinetic_energy: f64) -> f64 {
        let cut = self.fixed_cut.unwrap_or(couple.cuts().electron_energy);
        self.table.value_for(couple, kinetic_energy, |e, material| {
            self.evaluator
                .inverse_transport_mfp(&self.particle, e, material, cut)
        })
    }

    /// Transport mean free path [mm]; infinite where nothing scatters.
    pub fn mean_free_path(&self, couple: &MaterialCutsCouple, kinetic_energy: f64) -> f64 {
        let inv = self.inverse_mfp(couple, kinetic_energy);
        if inv > 0.0 {
            1.0 / inv
        } else {
            f64::INFINITY
        }
    }

    /// Returns `true` if the slot of `density_index` is built.
    pub fn is_built(&self, density_index: usize) -> bool {
        self.table.is_built(density_index)
    }

    /// Drop every built slot.
    pub fn force_rebuild(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{DEFAULT_HIGH_ENERGY_LIMIT, DEFAULT_LOW_ENERGY_LIMIT};
    use coulomb_core::{Element, Material, ProductionCuts};
    use coulomb_test_utils::fixtures;

    fn table(couples: &CoupleTable) -> TransportTable {
        let evaluator = CrossSectionEvaluator::new(
            crate::kernel::WentzelKernel::new(std::f64::consts::PI, true),
            DEFAULT_LOW_ENERGY_LIMIT,
            DEFAULT_HIGH_ENERGY_LIMIT,
        );
        TransportTable::new(
            evaluator,
            ParticleDef::PROTON,
            TableGrid::new(DEFAULT_LOW_ENERGY_LIMIT, DEFAULT_HIGH_ENERGY_LIMIT, 20).unwrap(),
            couples.density_index_count(),
            None,
        )
    }

    #[test]
    fn table_agrees_with_direct_evaluation() {
        let couples = fixtures::standard_couples();
        let t = table(&couples);
        let ev = t.evaluator;
        for couple in couples.iter() {
            for &e in &[1.0, 37.0, 850.0, 2.2e4] {
                let direct =
                    ev.transport_cross_section_per_volume_at(&ParticleDef::PROTON, couple, e);
                let tabulated = t.inverse_mfp(couple, e);
                if direct == 0.0 {
                    assert_eq!(tabulated, 0.0);
                } else {
                    assert!(
                        (tabulated / direct - 1.0).abs() < 0.01,
                        "{} at {e}: {tabulated} vs {direct}",
                        couple.material().name()
                    );
                }
            }
        }
    }

    #[test]
    fn same_named_materials_keep_their_own_values() {
        let lead = Material::builder("target", 11.35)
            .element_by_atoms(Element::new("Pb", 82, 207.2).unwrap(), 1)
            .build()
            .unwrap();
        let water = Material::builder("target", 1.0)
            .element_by_atoms(Element::new("H", 1, 1.008).unwrap(), 2)
            .element_by_atoms(Element::new("O", 8, 15.999).unwrap(), 1)
            .build()
            .unwrap();
        let mut couples = CoupleTable::new();
        let cuts = ProductionCuts::default();
        let water_id = couples.register(Arc::new(water), cuts);
        let lead_id = couples.register(Arc::new(lead), cuts);
        let t = table(&couples);
        let ev = t.evaluator;
        for id in [water_id, lead_id] {
            let couple = couples.get(id).unwrap();
            for &e in &[1.0, 850.0] {
                let direct =
                    ev.transport_cross_section_per_volume_at(&ParticleDef::PROTON, couple, e);
                let tabulated = t.inverse_mfp(couple, e);
                assert!(
                    (tabulated / direct - 1.0).abs() < 0.01,
                    "couple {id} at {e}: {tabulated} vs {direct}"
                );
            }
        }
    }

    #[test]
    fn build_all_fills_every_slot() {
        let couples = fixtures::standard_couples();
        let t = table(&couples);
        t.build_all(&couples);
        for index in 0..couples.density_index_count() {
            assert!(t.is_built(index));
        }
    }

    #[test]
    fn vacuum_has_infinite_mfp() {
        let couples = fixtures::standard_couples();
        let t = table(&couples);
        let vacuum = couples.get(fixtures::VACUUM).unwrap();
        assert_eq!(t.mean_free_path(vacuum, 10.0), f64::INFINITY);
    }

    #[test]
    fn force_rebuild_empties() {
        let couples = fixtures::standard_couples();
        let mut t = table(&couples);
        let water = couples.get(fixtures::WATER).unwrap();
        let before = t.inverse_mfp(water, 10.0);
        t.force_rebuild();
        assert!(!t.is_built(water.density_index()));
        assert_eq!(t.inverse_mfp(water, 10.0), before);
    }
}
