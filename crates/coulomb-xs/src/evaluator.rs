//! Per-atom and per-volume cross sections on top of the Wentzel kernel.
//!
//! [`CrossSectionEvaluator`] applies the model's validity range (energies
//! below the low-energy limit are clamped up to it, energies above the
//! high-energy limit give zero) and folds per-atom quantities with the
//! atom number densities of a material.

use coulomb_core::units::{KEV, TEV};
use coulomb_core::{Material, MaterialCutsCouple, ParticleDef};

use crate::kernel::{Kinematics, WentzelKernel};
use crate::working_set::SingleScatteringSet;

/// Default lower end of the validity range [MeV].
///
/// Around 16 keV for α on lead, and lower for lighter projectiles and
/// targets, the screening angle reaches a radian and the per-atom cross
/// section starts rising with energy. Clamping up to this limit keeps it
/// monotone for charges up to 2 on every element.
pub const DEFAULT_LOW_ENERGY_LIMIT: f64 = 50.0 * KEV;

/// Default upper end of the validity range [MeV].
pub const DEFAULT_HIGH_ENERGY_LIMIT: f64 = 100.0 * TEV;

/// Thin adapter over [`WentzelKernel`] computing the quantities the
/// stepper and the tables need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrossSectionEvaluator {
    kernel: WentzelKernel,
    low_energy_limit: f64,
    high_energy_limit: f64,
}

impl CrossSectionEvaluator {
    /// Create an evaluator valid for kinetic energies in
    /// `[low_energy_limit, high_energy_limit]`.
    pub fn new(kernel: WentzelKernel, low_energy_limit: f64, high_energy_limit: f64) -> Self {
        Self {
            kernel,
            low_energy_limit,
            high_energy_limit,
        }
    }

    /// The underlying kernel.
    pub fn kernel(&self) -> &WentzelKernel {
        &self.kernel
    }

    /// Lower energy bound [MeV].
    pub fn low_energy_limit(&self) -> f64 {
        self.low_energy_limit
    }

    /// Upper energy bound [MeV].
    pub fn high_energy_limit(&self) -> f64 {
        self.high_energy_limit
    }

    /// Apply the low-energy clamp.
    ///
    /// # Panics
    ///
    /// Panics if `kinetic_energy` is not finite and positive.
    pub fn clamp_energy(&self, kinetic_energy: f64) -> f64 {
        assert!(
            kinetic_energy.is_finite() && kinetic_energy > 0.0,
            "kinetic energy must be finite and > 0, got {kinetic_energy}"
        );
        kinetic_energy.max(self.low_energy_limit)
    }

    /// Kinematics of `particle` at `kinetic_energy` in `material`.
    pub fn kinematics(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        material: &Material,
    ) -> Kinematics {
        let e = self.clamp_energy(kinetic_energy);
        self.kernel.kinematics(particle, e, material.inv_a23())
    }

    /// Transport cross section per atom [mm²] of element (`z`, `molar_mass`).
    ///
    /// Integrated up to the model's largest deflection. The electron cut
    /// is `min(cut_low, cut_high)`; a cut above the kinematic maximum
    /// energy transfer is treated as no cut.
    ///
    /// # Panics
    ///
    /// Panics if `kinetic_energy` is not finite and positive or `z` is zero.
    pub fn cross_section_per_atom(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        z: u32,
        molar_mass: f64,
        cut_low: f64,
        cut_high: f64,
    ) -> f64 {
        assert!(z > 0, "atomic number must be > 0");
        let e = self.clamp_energy(kinetic_energy);
        if e > self.high_energy_limit {
            return 0.0;
        }
        let kin = self
            .kernel
            .kinematics(particle, e, molar_mass.powf(-2.0 / 3.0));
        kin.target_za(z, molar_mass, cut_low.min(cut_high))
            .transport_cross_section(self.kernel.cos_theta_max())
    }

    /// Inverse transport mean free path [1/mm] over the full angular range.
    pub fn inverse_transport_mfp(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        material: &Material,
        cut: f64,
    ) -> f64 {
        let kin = self.kinematics(particle, kinetic_energy, material);
        if kin.kinetic_energy() > self.high_energy_limit {
            return 0.0;
        }
        let cos_limit = self.kernel.cos_theta_max();
        material
            .components()
            .iter()
            .map(|c| {
                c.atoms_per_volume * kin.target(&c.element, cut).transport_cross_section(cos_limit)
            })
            .sum()
    }

    /// [`inverse_transport_mfp`](Self::inverse_transport_mfp) for a couple,
    /// using the couple's electron cut.
    pub fn transport_cross_section_per_volume_at(
        &self,
        particle: &ParticleDef,
        couple: &MaterialCutsCouple,
        kinetic_energy: f64,
    ) -> f64 {
        self.inverse_transport_mfp(
            particle,
            kinetic_energy,
            couple.material(),
            couple.cuts().electron_energy,
        )
    }

    /// Second transport moment per volume `Σ nᵢ ∫(1 − cos θ)² dσᵢ` [1/mm].
    pub fn second_moment_per_volume(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        material: &Material,
        cut: f64,
    ) -> f64 {
        let kin = self.kinematics(particle, kinetic_energy, material);
        if kin.kinetic_energy() > self.high_energy_limit {
            return 0.0;
        }
        let cos_limit = self.kernel.cos_theta_max();
        material
            .components()
            .iter()
            .map(|c| {
                c.atoms_per_volume * kin.target(&c.element, cut).second_transport_moment(cos_limit)
            })
            .sum()
    }

    /// Fill `set` for deflections beyond `cos_theta_min` and return the
    /// transport coefficient [1/mm] of deflections below it.
    ///
    /// For every element whose nuclear cut-off lies beyond the threshold,
    /// the set receives its total nuclear-plus-electron cross section
    /// between the threshold and the cut-off and the electron share of it.
    /// Elements whose cut-off lies inside the threshold contribute nothing
    /// to either quantity.
    pub fn transport_cross_section_per_volume(
        &self,
        kin: &Kinematics,
        material: &Material,
        cut: f64,
        cos_theta_min: f64,
        set: &mut SingleScatteringSet,
    ) -> f64 {
        set.begin(cos_theta_min);
        let mut transport = 0.0;
        let above_limit = kin.kinetic_energy() > self.high_energy_limit;
        for component in material.components() {
            let target = kin.target(&component.element, cut);
            let density = component.atoms_per_volume;
            let cos_max = target.cos_tet_max_nuc();
            let mut sigma = 0.0;
            let mut electron_ratio = 0.0;
            if !above_limit && cos_max < cos_theta_min {
                if cos_theta_min < 1.0 {
                    transport += density * target.transport_cross_section(cos_theta_min);
                }
                let nuclear = target.nuclear_cross_section(cos_theta_min, cos_max);
                let electron = target.electron_cross_section(cos_theta_min, cos_max);
                let total = nuclear + electron;
                if total > 0.0 {
                    electron_ratio = electron / total;
                }
                sigma = density * total;
            }
            set.push(target, sigma, electron_ratio);
        }
        set.set_transport(transport);
        transport
    }
}
