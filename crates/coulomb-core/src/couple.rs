//! Material-and-cuts couples and their registry.
//!
//! A couple pairs a [`Material`] with production cuts. The
//! [`CoupleTable`] assigns every couple a *density index*: couples whose
//! materials share a [`CompositionId`] and carry identical cuts share one
//! index and differ only by a density factor, so per-index
//! physics tables can be built once and scaled.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::MaterialError;
use crate::id::{CompositionId, CoupleFingerprint, CoupleId, CoupleTableId};
use crate::material::Material;

/// Electron production cuts of a couple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProductionCuts {
    /// Electron production threshold [MeV].
    pub electron_energy: f64,
    /// Electron production range cut [mm].
    pub electron_range: f64,
}

impl ProductionCuts {
    /// Create production cuts.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::InvalidCut`] if either value is negative
    /// or not finite.
    pub fn new(electron_energy: f64, electron_range: f64) -> Result<Self, MaterialError> {
        for value in [electron_energy, electron_range] {
            if !value.is_finite() || value < 0.0 {
                return Err(MaterialError::InvalidCut { value });
            }
        }
        Ok(Self {
            electron_energy,
            electron_range,
        })
    }
}

impl Default for ProductionCuts {
    /// 1 keV energy threshold, 0.7 mm range cut.
    fn default() -> Self {
        Self {
            electron_energy: 1.0e-3,
            electron_range: 0.7,
        }
    }
}

/// A material paired with production cuts, as registered in a
/// [`CoupleTable`].
#[derive(Clone, Debug)]
pub struct MaterialCutsCouple {
    fingerprint: CoupleFingerprint,
    material: Arc<Material>,
    cuts: ProductionCuts,
    density_index: usize,
    density_factor: f64,
}

impl MaterialCutsCouple {
    /// Couple index within its table.
    pub fn id(&self) -> CoupleId {
        self.fingerprint.couple
    }

    /// Identity that survives table rebuilds.
    pub fn fingerprint(&self) -> CoupleFingerprint {
        self.fingerprint
    }

    /// The material.
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Production cuts.
    pub fn cuts(&self) -> ProductionCuts {
        self.cuts
    }

    /// Index of the shared physics-table entry for this couple.
    pub fn density_index(&self) -> usize {
        self.density_index
    }

    /// Ratio of this couple's density to the density of the table entry's
    /// reference couple.
    pub fn density_factor(&self) -> f64 {
        self.density_factor
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct DensityKey {
    composition: CompositionId,
    cut_bits: u64,
    /// Set for couples that cannot share an entry (zero density).
    solo: Option<u32>,
}

#[derive(Clone, Debug)]
struct DensityGroup {
    reference: CoupleId,
    density: f64,
}

/// Registry of material-cuts couples for one geometry.
///
/// Populated single-threaded before transport starts, then shared
/// read-only (typically behind an `Arc`).
#[derive(Debug)]
pub struct CoupleTable {
    instance: CoupleTableId,
    couples: Vec<Arc<MaterialCutsCouple>>,
    groups: IndexMap<DensityKey, DensityGroup>,
}

impl CoupleTable {
    /// Create an empty table with a fresh instance ID.
    pub fn new() -> Self {
        Self {
            instance: CoupleTableId::next(),
            couples: Vec::new(),
            groups: IndexMap::new(),
        }
    }

    /// Register a couple and return its ID.
    ///
    /// The couple joins an existing density index if a couple of the
    /// same composition with the same electron cut energy is already
    /// registered and both densities are positive. Names play no part:
    /// two materials built separately never share an index.
    pub fn register(&mut self, material: Arc<Material>, cuts: ProductionCuts) -> CoupleId {
        let id = CoupleId(self.couples.len() as u32);
        let density = material.density();
        let key = DensityKey {
            composition: material.composition(),
            cut_bits: cuts.electron_energy.to_bits(),
            solo: (density <= 0.0).then_some(id.0),
        };

        let (density_index, density_factor) = match self.groups.get_full(&key) {
            Some((index, _, group)) => (index, density / group.density),
            None => {
                let (index, _) = self.groups.insert_full(
                    key,
                    DensityGroup {
                        reference: id,
                        density,
                    },
                );
                (index, 1.0)
            }
        };

        self.couples.push(Arc::new(MaterialCutsCouple {
            fingerprint: CoupleFingerprint {
                table: self.instance,
                couple: id,
            },
            material,
            cuts,
            density_index,
            density_factor,
        }));
        id
    }

    /// Look up a couple by ID.
    pub fn get(&self, id: CoupleId) -> Option<&Arc<MaterialCutsCouple>> {
        self.couples.get(id.0 as usize)
    }

    /// All couples in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MaterialCutsCouple>> {
        self.couples.iter()
    }

    /// Number of registered couples.
    pub fn len(&self) -> usize {
        self.couples.len()
    }

    /// Returns `true` if no couple is registered.
    pub fn is_empty(&self) -> bool {
        self.couples.is_empty()
    }

    /// Number of distinct density indices.
    pub fn density_index_count(&self) -> usize {
        self.groups.len()
    }

    /// The couple whose density defines table entry `density_index`.
    pub fn reference_couple(&self, density_index: usize) -> Option<&Arc<MaterialCutsCouple>> {
        let (_, group) = self.groups.get_index(density_index)?;
        self.get(group.reference)
    }

    /// Instance ID of this table.
    pub fn instance_id(&self) -> CoupleTableId {
        self.instance
    }
}

impl Default for CoupleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn water(density: f64) -> Material {
        Material::builder("water", density)
            .element_by_atoms(Element::new("H", 1, 1.008).unwrap(), 2)
            .element_by_atoms(Element::new("O", 8, 15.999).unwrap(), 1)
            .build()
            .unwrap()
    }

    #[test]
    fn cuts_validation() {
        assert!(ProductionCuts::new(1e-3, 0.7).is_ok());
        assert!(ProductionCuts::new(-1.0, 0.7).is_err());
        assert!(ProductionCuts::new(1e-3, f64::INFINITY).is_err());
    }

    #[test]
    fn sequential_ids() {
        let mut table = CoupleTable::new();
        let a = table.register(Arc::new(water(1.0)), ProductionCuts::default());
        let b = table.register(Arc::new(water(1.0)), ProductionCuts::new(0.01, 1.0).unwrap());
        assert_eq!(a, CoupleId(0));
        assert_eq!(b, CoupleId(1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b).unwrap().id(), b);
    }

    #[test]
    fn density_variants_share_an_index() {
        let base = water(1.0);
        let steam = base.with_density("steam", 0.002).unwrap();
        let mut table = CoupleTable::new();
        let a = table.register(Arc::new(base), ProductionCuts::default());
        let b = table.register(Arc::new(steam), ProductionCuts::default());
        let (ca, cb) = (table.get(a).unwrap(), table.get(b).unwrap());
        assert_eq!(ca.density_index(), cb.density_index());
        assert_eq!(ca.density_factor(), 1.0);
        assert!((cb.density_factor() - 0.002).abs() < 1e-15);
        assert_eq!(table.density_index_count(), 1);
        assert_eq!(table.reference_couple(0).unwrap().id(), a);
    }

    #[test]
    fn different_cuts_get_separate_indices() {
        let w = Arc::new(water(1.0));
        let mut table = CoupleTable::new();
        table.register(Arc::clone(&w), ProductionCuts::default());
        table.register(Arc::clone(&w), ProductionCuts::new(0.1, 1.0).unwrap());
        table.register(w, ProductionCuts::default());
        assert_eq!(table.density_index_count(), 2);
    }

    #[test]
    fn same_name_different_composition_get_separate_indices() {
        let lead = Material::builder("target", 11.35)
            .element_by_atoms(Element::new("Pb", 82, 207.2).unwrap(), 1)
            .build()
            .unwrap();
        let water = Material::builder("target", 1.0)
            .element_by_atoms(Element::new("H", 1, 1.008).unwrap(), 2)
            .element_by_atoms(Element::new("O", 8, 15.999).unwrap(), 1)
            .build()
            .unwrap();
        let mut table = CoupleTable::new();
        let a = table.register(Arc::new(lead), ProductionCuts::default());
        let b = table.register(Arc::new(water), ProductionCuts::default());
        let (ca, cb) = (table.get(a).unwrap(), table.get(b).unwrap());
        assert_ne!(ca.density_index(), cb.density_index());
        assert_eq!(cb.density_factor(), 1.0);
        assert_eq!(table.reference_couple(cb.density_index()).unwrap().id(), b);
        assert_eq!(table.density_index_count(), 2);
    }

    #[test]
    fn zero_density_never_shares() {
        let mut table = CoupleTable::new();
        let a = table.register(Arc::new(water(0.0)), ProductionCuts::default());
        let b = table.register(Arc::new(water(0.0)), ProductionCuts::default());
        assert_ne!(
            table.get(a).unwrap().density_index(),
            table.get(b).unwrap().density_index()
        );
        assert_eq!(table.get(b).unwrap().density_factor(), 1.0);
    }

    #[test]
    fn fingerprints_differ_between_tables() {
        let mut t1 = CoupleTable::new();
        let mut t2 = CoupleTable::new();
        let a = t1.register(Arc::new(water(1.0)), ProductionCuts::default());
        let b = t2.register(Arc::new(water(1.0)), ProductionCuts::default());
        assert_eq!(a, b);
        assert_ne!(
            t1.get(a).unwrap().fingerprint(),
            t2.get(b).unwrap().fingerprint()
        );
    }
}
