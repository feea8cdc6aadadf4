//! Materials: element composition, atom densities and derived bulk
//! quantities.
//!
//! Materials are constructed via [`Material::builder`], giving either
//! atom counts per molecule or mass fractions for each element. A
//! material may be derived from another one at a different density with
//! [`Material::with_density`]; derived materials keep the
//! [`CompositionId`] of their base so that tables can be shared across
//! densities.

use smallvec::SmallVec;

use crate::element::Element;
use crate::error::MaterialError;
use crate::id::CompositionId;
use crate::units::{AVOGADRO, CM3};

/// Tolerance on the sum of mass fractions.
const FRACTION_SUM_TOLERANCE: f64 = 1.0e-3;

/// One element of a material with its number density.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    /// The element.
    pub element: Element,
    /// Atoms of this element per mm³.
    pub atoms_per_volume: f64,
    /// Fraction of the material's atoms that are of this element.
    pub atom_fraction: f64,
}

/// A homogeneous material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    name: String,
    density: f64,
    components: SmallVec<[Component; 4]>,
    total_atoms_per_volume: f64,
    electrons_per_volume: f64,
    radiation_length: f64,
    inv_a23: f64,
    composition: CompositionId,
}

#[derive(Clone, Copy, Debug)]
enum Proportion {
    Atoms(u32),
    Mass(f64),
}

/// Builder for [`Material`].
///
/// All elements must be given the same way, either all by atom count or
/// all by mass fraction.
pub struct MaterialBuilder {
    name: String,
    density: f64,
    parts: Vec<(Element, Proportion)>,
    composition: Option<CompositionId>,
}

impl Material {
    /// Start building a material of the given mass density [g/cm³].
    pub fn builder(name: &str, density: f64) -> MaterialBuilder {
        MaterialBuilder {
            name: name.to_string(),
            density,
            parts: Vec::new(),
            composition: None,
        }
    }

    /// Same composition at a different density.
    ///
    /// The new material shares this one's [`CompositionId`].
    pub fn with_density(&self, name: &str, density: f64) -> Result<Material, MaterialError> {
        let mut builder = Material::builder(name, density);
        builder.composition = Some(self.composition);
        let mass_total: f64 = self
            .components
            .iter()
            .map(|c| c.atom_fraction * c.element.molar_mass())
            .sum();
        for c in &self.components {
            let w = c.atom_fraction * c.element.molar_mass() / mass_total;
            builder = builder.element_by_mass(c.element.clone(), w);
        }
        builder.build()
    }

    /// Material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mass density [g/cm³].
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Element composition.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Total atoms per mm³.
    pub fn total_atoms_per_volume(&self) -> f64 {
        self.total_atoms_per_volume
    }

    /// Electrons per mm³.
    pub fn electrons_per_volume(&self) -> f64 {
        self.electrons_per_volume
    }

    /// Radiation length [mm]; infinite for a material with no atoms.
    pub fn radiation_length(&self) -> f64 {
        self.radiation_length
    }

    /// Inverse of the mean mass number to the power 2/3.
    ///
    /// The mean is weighted by atom fraction, so it does not depend on
    /// density.
    pub fn inv_a23(&self) -> f64 {
        self.inv_a23
    }

    /// Composition identity, shared by all density variants of one
    /// material and by nothing else.
    pub fn composition(&self) -> CompositionId {
        self.composition
    }
}

impl MaterialBuilder {
    /// Add `count` atoms of `element` per molecule.
    pub fn element_by_atoms(mut self, element: Element, count: u32) -> Self {
        self.parts.push((element, Proportion::Atoms(count)));
        self
    }

    /// Add `element` with the given mass fraction.
    pub fn element_by_mass(mut self, element: Element, fraction: f64) -> Self {
        self.parts.push((element, Proportion::Mass(fraction)));
        self
    }

    /// Build the material, validating the composition.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - no element was added
    /// - the density is negative or not finite
    /// - atom counts and mass fractions are mixed
    /// - an atom count is zero or a mass fraction is not in (0, 1]
    /// - mass fractions do not sum to one
    pub fn build(self) -> Result<Material, MaterialError> {
        if self.parts.is_empty() {
            return Err(MaterialError::EmptyComposition {
                material: self.name,
            });
        }
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(MaterialError::InvalidDensity {
                value: self.density,
            });
        }

        let by_atoms = matches!(self.parts[0].1, Proportion::Atoms(_));
        let mut mass_fractions: SmallVec<[f64; 4]> = SmallVec::new();
        for (element, proportion) in &self.parts {
            match (proportion, by_atoms) {
                (Proportion::Atoms(0), true) => {
                    return Err(MaterialError::InvalidFraction {
                        reason: format!("{}: atom count must be > 0", element.symbol()),
                    });
                }
                (Proportion::Atoms(n), true) => {
                    mass_fractions.push(f64::from(*n) * element.molar_mass());
                }
                (Proportion::Mass(w), false) => {
                    if !w.is_finite() || *w <= 0.0 || *w > 1.0 {
                        return Err(MaterialError::InvalidFraction {
                            reason: format!(
                                "{}: mass fraction must be in (0, 1], got {w}",
                                element.symbol()
                            ),
                        });
                    }
                    mass_fractions.push(*w);
                }
                _ => {
                    return Err(MaterialError::InvalidFraction {
                        reason: format!(
                            "material '{}' mixes atom counts and mass fractions",
                            self.name
                        ),
                    });
                }
            }
        }

        let sum: f64 = mass_fractions.iter().sum();
        if !by_atoms && (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(MaterialError::InvalidFraction {
                reason: format!("mass fractions of '{}' sum to {sum}", self.name),
            });
        }

        // moles per gram of material for each element
        let moles: SmallVec<[f64; 4]> = self
            .parts
            .iter()
            .zip(&mass_fractions)
            .map(|((element, _), w)| w / sum / element.molar_mass())
            .collect();
        let total_moles: f64 = moles.iter().sum();

        let mut components: SmallVec<[Component; 4]> = SmallVec::new();
        let mut mean_a = 0.0;
        for ((element, _), mol) in self.parts.into_iter().zip(&moles) {
            let atom_fraction = mol / total_moles;
            mean_a += atom_fraction * element.molar_mass();
            components.push(Component {
                atoms_per_volume: AVOGADRO * self.density * mol / CM3,
                atom_fraction,
                element,
            });
        }

        let total_atoms_per_volume = components.iter().map(|c| c.atoms_per_volume).sum();
        let electrons_per_volume = components
            .iter()
            .map(|c| c.atoms_per_volume * c.element.zf())
            .sum();
        let inv_x0: f64 = components
            .iter()
            .map(|c| c.atoms_per_volume * c.element.rad_tsai())
            .sum();
        let radiation_length = if inv_x0 > 0.0 {
            1.0 / inv_x0
        } else {
            f64::INFINITY
        };

        Ok(Material {
            name: self.name,
            density: self.density,
            components,
            total_atoms_per_volume,
            electrons_per_volume,
            radiation_length,
            inv_a23: mean_a.powf(-2.0 / 3.0),
            composition: self.composition.unwrap_or_else(CompositionId::next),
        })
    }
}
