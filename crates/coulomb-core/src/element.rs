//! Chemical elements and their per-atom derived quantities.

use crate::error::MaterialError;
use crate::units::{CLASSIC_ELECTRON_RADIUS, FINE_STRUCTURE};

/// Largest atomic number accepted by [`Element::new`].
pub const MAX_Z: u32 = 120;

/// Radiation logarithms `(L_rad, L'_rad)` for Z = 1..=4, where the
/// Thomas-Fermi expressions are inaccurate.
const LIGHT_RAD_LOGS: [(f64, f64); 4] = [
    (5.31, 6.144),
    (4.79, 5.621),
    (4.74, 5.805),
    (4.71, 5.924),
];

/// A chemical element: atomic number and molar mass plus cached powers.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    symbol: String,
    z: u32,
    molar_mass: f64,
    z13: f64,
    z23: f64,
    a027: f64,
    rad_tsai: f64,
}

impl Element {
    /// Create an element.
    ///
    /// `molar_mass` is in g/mol (numerically the mass number A used by
    /// the scattering formulas).
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError::InvalidElement`] if `z` is zero or above
    /// [`MAX_Z`], or if `molar_mass` is not finite and positive.
    pub fn new(symbol: &str, z: u32, molar_mass: f64) -> Result<Self, MaterialError> {
        if z == 0 || z > MAX_Z {
            return Err(MaterialError::InvalidElement {
                reason: format!("{symbol}: atomic number {z} outside 1..={MAX_Z}"),
            });
        }
        if !molar_mass.is_finite() || molar_mass <= 0.0 {
            return Err(MaterialError::InvalidElement {
                reason: format!("{symbol}: molar mass must be finite and > 0, got {molar_mass}"),
            });
        }
        let zf = f64::from(z);
        Ok(Self {
            symbol: symbol.to_string(),
            z,
            molar_mass,
            z13: zf.cbrt(),
            z23: zf.cbrt().powi(2),
            a027: molar_mass.powf(0.27),
            rad_tsai: tsai_factor(z),
        })
    }

    /// Chemical symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Atomic number.
    pub fn z(&self) -> u32 {
        self.z
    }

    /// Atomic number as `f64`.
    pub fn zf(&self) -> f64 {
        f64::from(self.z)
    }

    /// Molar mass [g/mol].
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Z^(1/3).
    pub fn z13(&self) -> f64 {
        self.z13
    }

    /// Z^(2/3).
    pub fn z23(&self) -> f64 {
        self.z23
    }

    /// A^0.27, used by the nuclear form factor.
    pub fn a027(&self) -> f64 {
        self.a027
    }

    /// Per-atom contribution to the inverse radiation length [mm²].
    ///
    /// Multiply by the atom number density to get 1/X₀.
    pub fn rad_tsai(&self) -> f64 {
        self.rad_tsai
    }
}

/// Tsai's per-atom radiation-length factor
/// `4 α r_e² [Z² (L_rad − f_c) + Z L'_rad]`.
fn tsai_factor(z: u32) -> f64 {
    let zf = f64::from(z);
    let (lrad, lprad) = match z {
        1..=4 => LIGHT_RAD_LOGS[(z - 1) as usize],
        _ => (
            (184.15 / zf.cbrt()).ln(),
            (1194.0 / zf.cbrt().powi(2)).ln(),
        ),
    };
    let fc = coulomb_correction(zf);
    4.0 * FINE_STRUCTURE
        * CLASSIC_ELECTRON_RADIUS
        * CLASSIC_ELECTRON_RADIUS
        * (zf * zf * (lrad - fc) + zf * lprad)
}

/// Coulomb correction function f(αZ) of the Bethe-Heitler cross section.
fn coulomb_correction(z: f64) -> f64 {
    let az2 = (FINE_STRUCTURE * z).powi(2);
    let az4 = az2 * az2;
    az2 * (1.0 / (1.0 + az2) + 0.20206 - 0.0369 * az2 + 0.0083 * az4 - 0.002 * az2 * az4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_atomic_number() {
        assert!(Element::new("X", 0, 1.0).is_err());
        assert!(Element::new("X", MAX_Z + 1, 300.0).is_err());
    }

    #[test]
    fn rejects_bad_molar_mass() {
        assert!(Element::new("H", 1, 0.0).is_err());
        assert!(Element::new("H", 1, f64::NAN).is_err());
    }

    #[test]
    fn cached_powers() {
        let pb = Element::new("Pb", 82, 207.2).unwrap();
        assert!((pb.z13().powi(3) - 82.0).abs() < 1e-9);
        assert!((pb.z23() - pb.z13() * pb.z13()).abs() < 1e-12);
        assert!((pb.a027() - 207.2f64.powf(0.27)).abs() < 1e-12);
    }

    #[test]
    fn coulomb_correction_is_small_for_light_elements() {
        assert!(coulomb_correction(1.0) < 1e-4);
        assert!(coulomb_correction(82.0) > 0.3);
    }

    #[test]
    fn tsai_factor_grows_with_z() {
        let mut prev = 0.0;
        for z in 1..=92 {
            let f = tsai_factor(z);
            assert!(f > prev, "Z={z}");
            prev = f;
        }
    }
}
