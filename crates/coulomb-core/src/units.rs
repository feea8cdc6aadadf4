//! Units and physical constants.
//!
//! The workspace works in a fixed internal system: lengths in
//! millimetres, energies in MeV, mass densities in g/cm³. Multiply a
//! value by a unit constant to convert it into the internal system
//! (`5.0 * CM` is 50 mm), divide to convert back.

// ============================================================================
// Length
// ============================================================================

/// Millimetre (internal length unit).
pub const MM: f64 = 1.0;

/// Centimetre.
pub const CM: f64 = 10.0 * MM;

/// Metre.
pub const M: f64 = 1000.0 * MM;

/// Micrometre.
pub const UM: f64 = 1.0e-3 * MM;

/// Nanometre.
pub const NM: f64 = 1.0e-6 * MM;

/// Femtometre.
pub const FERMI: f64 = 1.0e-12 * MM;

/// Cubic centimetre expressed in mm³.
pub const CM3: f64 = CM * CM * CM;

// ============================================================================
// Energy
// ============================================================================

/// Mega-electronvolt (internal energy unit).
pub const MEV: f64 = 1.0;

/// Electronvolt.
pub const EV: f64 = 1.0e-6 * MEV;

/// Kilo-electronvolt.
pub const KEV: f64 = 1.0e-3 * MEV;

/// Giga-electronvolt.
pub const GEV: f64 = 1.0e3 * MEV;

/// Tera-electronvolt.
pub const TEV: f64 = 1.0e6 * MEV;

// ============================================================================
// Physical constants
// ============================================================================

/// Electron rest energy, m_e c² [MeV].
pub const ELECTRON_MASS_C2: f64 = 0.510_998_950 * MEV;

/// Proton rest energy [MeV].
pub const PROTON_MASS_C2: f64 = 938.272_088_16 * MEV;

/// Muon rest energy [MeV].
pub const MUON_MASS_C2: f64 = 105.658_375_5 * MEV;

/// Alpha particle rest energy [MeV].
pub const ALPHA_MASS_C2: f64 = 3727.379_411_8 * MEV;

/// Fine-structure constant α.
pub const FINE_STRUCTURE: f64 = 7.297_352_569_3e-3;

/// Classical electron radius r_e [mm].
pub const CLASSIC_ELECTRON_RADIUS: f64 = 2.817_940_326_2e-12 * MM;

/// ħc [MeV·mm].
pub const HBARC: f64 = 197.326_980_4e-12 * MEV * MM;

/// Avogadro constant [1/mol].
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Tolerance on the length of a direction vector handed to the stepper.
pub const UNIT_TOLERANCE: f64 = 1.0e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_conversions() {
        assert_eq!(5.0 * CM, 50.0);
        assert_eq!(CM3, 1000.0);
        assert!((1.0 * FERMI / NM - 1.0e-6).abs() < 1e-18);
    }

    #[test]
    fn energy_conversions() {
        assert_eq!(2.0 * GEV, 2000.0);
        assert!((1.0 * KEV / EV - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn hbarc_in_fermi_mev() {
        let hbarc_fm = HBARC / FERMI;
        assert!((hbarc_fm - 197.327).abs() < 1e-3);
    }
}
