//! Charged particle definitions.

use crate::units::{ALPHA_MASS_C2, ELECTRON_MASS_C2, MUON_MASS_C2, PROTON_MASS_C2};
use std::fmt;

/// Static properties of a charged particle species.
///
/// Charge is in units of the elementary charge, spin in units of ħ.
/// Species identity is the PDG code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleDef {
    /// Short human-readable name.
    pub name: &'static str,
    /// PDG Monte Carlo particle code.
    pub pdg: i32,
    /// Rest energy [MeV].
    pub mass: f64,
    /// Charge in units of e.
    pub charge: f64,
    /// Spin in units of ħ.
    pub spin: f64,
}

impl ParticleDef {
    /// Electron.
    pub const ELECTRON: ParticleDef = ParticleDef {
        name: "e-",
        pdg: 11,
        mass: ELECTRON_MASS_C2,
        charge: -1.0,
        spin: 0.5,
    };

    /// Positron.
    pub const POSITRON: ParticleDef = ParticleDef {
        name: "e+",
        pdg: -11,
        mass: ELECTRON_MASS_C2,
        charge: 1.0,
        spin: 0.5,
    };

    /// Negative muon.
    pub const MUON_MINUS: ParticleDef = ParticleDef {
        name: "mu-",
        pdg: 13,
        mass: MUON_MASS_C2,
        charge: -1.0,
        spin: 0.5,
    };

    /// Positive muon.
    pub const MUON_PLUS: ParticleDef = ParticleDef {
        name: "mu+",
        pdg: -13,
        mass: MUON_MASS_C2,
        charge: 1.0,
        spin: 0.5,
    };

    /// Proton.
    pub const PROTON: ParticleDef = ParticleDef {
        name: "proton",
        pdg: 2212,
        mass: PROTON_MASS_C2,
        charge: 1.0,
        spin: 0.5,
    };

    /// Alpha particle.
    pub const ALPHA: ParticleDef = ParticleDef {
        name: "alpha",
        pdg: 1_000_020_040,
        mass: ALPHA_MASS_C2,
        charge: 2.0,
        spin: 0.0,
    };

    /// Returns `true` for the electron.
    pub fn is_electron(&self) -> bool {
        self.pdg == 11
    }

    /// Returns `true` for the electron or the positron.
    pub fn is_light_lepton(&self) -> bool {
        self.pdg.abs() == 11
    }

    /// Same species as `other` (by PDG code).
    pub fn same_species(&self, other: &ParticleDef) -> bool {
        self.pdg == other.pdg
    }
}

impl fmt::Display for ParticleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
