//! Standard elements, materials and couple table.
//!
//! [`standard_couples`] registers, in this order:
//!
//! | ID | Couple | Notes |
//! |----|--------|-------|
//! | [`WATER`] | liquid water | |
//! | [`ALUMINIUM`] | aluminium | |
//! | [`LEAD`] | lead | |
//! | [`AIR`] | dry air | three elements |
//! | [`WATER_VAPOUR`] | water at 1/1000 density | shares water's density index |
//! | [`VACUUM`] | water at zero density | |
//! | [`SILICON`] | silicon | |

use std::sync::Arc;

use coulomb_core::{CoupleId, CoupleTable, Element, Material, ProductionCuts};

pub const WATER: CoupleId = CoupleId(0);
pub const ALUMINIUM: CoupleId = CoupleId(1);
pub const LEAD: CoupleId = CoupleId(2);
pub const AIR: CoupleId = CoupleId(3);
pub const WATER_VAPOUR: CoupleId = CoupleId(4);
pub const VACUUM: CoupleId = CoupleId(5);
pub const SILICON: CoupleId = CoupleId(6);

fn element(symbol: &str, z: u32, molar_mass: f64) -> Element {
    Element::new(symbol, z, molar_mass).expect("fixture element is valid")
}

pub fn hydrogen() -> Element {
    element("H", 1, 1.008)
}

pub fn nitrogen() -> Element {
    element("N", 7, 14.007)
}

pub fn oxygen() -> Element {
    element("O", 8, 15.999)
}

pub fn aluminium_element() -> Element {
    element("Al", 13, 26.982)
}

pub fn silicon_element() -> Element {
    element("Si", 14, 28.085)
}

pub fn argon() -> Element {
    element("Ar", 18, 39.948)
}

pub fn lead_element() -> Element {
    element("Pb", 82, 207.2)
}

pub fn water() -> Material {
    Material::builder("water", 1.0)
        .element_by_atoms(hydrogen(), 2)
        .element_by_atoms(oxygen(), 1)
        .build()
        .expect("fixture material is valid")
}

pub fn aluminium() -> Material {
    Material::builder("aluminium", 2.699)
        .element_by_atoms(aluminium_element(), 1)
        .build()
        .expect("fixture material is valid")
}

pub fn lead() -> Material {
    Material::builder("lead", 11.35)
        .element_by_atoms(lead_element(), 1)
        .build()
        .expect("fixture material is valid")
}

pub fn silicon() -> Material {
    Material::builder("silicon", 2.33)
        .element_by_atoms(silicon_element(), 1)
        .build()
        .expect("fixture material is valid")
}

pub fn air() -> Material {
    Material::builder("air", 1.205e-3)
        .element_by_mass(nitrogen(), 0.7553)
        .element_by_mass(oxygen(), 0.2318)
        .element_by_mass(argon(), 0.0129)
        .build()
        .expect("fixture material is valid")
}

/// The standard couple table, all with default production cuts.
pub fn standard_couples() -> CoupleTable {
    let water = water();
    let vapour = water
        .with_density("water_vapour", 1.0e-3)
        .expect("fixture material is valid");
    let vacuum = water
        .with_density("vacuum", 0.0)
        .expect("fixture material is valid");

    let mut table = CoupleTable::new();
    let cuts = ProductionCuts::default();
    for material in [water, aluminium(), lead(), air(), vapour, vacuum, silicon()] {
        table.register(Arc::new(material), cuts);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_registration_order() {
        let table = standard_couples();
        assert_eq!(table.len(), 7);
        let names: Vec<&str> = [WATER, ALUMINIUM, LEAD, AIR, WATER_VAPOUR, VACUUM, SILICON]
            .iter()
            .map(|&id| table.get(id).unwrap().material().name())
            .collect();
        assert_eq!(
            names,
            ["water", "aluminium", "lead", "air", "water_vapour", "vacuum", "silicon"]
        );
    }

    #[test]
    fn vapour_shares_water_index() {
        let table = standard_couples();
        let water = table.get(WATER).unwrap();
        let vapour = table.get(WATER_VAPOUR).unwrap();
        let vacuum = table.get(VACUUM).unwrap();
        assert_eq!(water.density_index(), vapour.density_index());
        assert!((vapour.density_factor() - 1.0e-3).abs() < 1e-15);
        assert_ne!(vacuum.density_index(), water.density_index());
        assert_eq!(table.density_index_count(), 6);
    }
}
