//! Wentzel single Coulomb scattering kernel.
//!
//! The differential cross section per atom, in the variable
//! `u = 1 − cos θ`, is the screened Rutherford law
//!
//! ```text
//! dσ/du = K · (1 − f_B·u) / (u + A)²
//! ```
//!
//! with kinematic factor `K = 2π r_e² (m_e c²)² Z² q² / (p²c² β²)` for the
//! nucleus, Moliere screening parameter `A`, and spin factor `f_B = s·β²`.
//! The Z atomic electrons together contribute `K/Z` times the same law.
//! Nuclear scattering is cut off at the angle where the momentum transfer
//! resolves the nucleus; electron targets are cut off by the electron
//! production threshold. A nuclear form factor enters only through
//! rejection when sampling single scatterings.
//!
//! Both cut-offs are kept as `u` values rather than cosines. At TeV
//! energies the electron cut-off sits within a few ulps of `cos θ = 1`,
//! where a cosine can no longer resolve it.
//!
//! Values are split into a per-(species, energy, material) [`Kinematics`]
//! and a per-element [`Target`], both `Copy` so the sampler can keep one
//! target per element of the current material.

use coulomb_core::units::{
    CLASSIC_ELECTRON_RADIUS, ELECTRON_MASS_C2, FERMI, FINE_STRUCTURE, HBARC, MEV,
};
use coulomb_core::{Element, ParticleDef, Vec3};
use rand::Rng;

/// Below this value of `(1 − cos θ_max)/A` the integrals use series.
const SERIES_LIMIT: f64 = 0.1;

/// `2π r_e² (m_e c²)²` [mm²·MeV²].
const COEFF: f64 = 2.0
    * std::f64::consts::PI
    * CLASSIC_ELECTRON_RADIUS
    * CLASSIC_ELECTRON_RADIUS
    * ELECTRON_MASS_C2
    * ELECTRON_MASS_C2;

/// `½ (ħc / fm)²` [MeV²]: momentum-transfer scale of the nuclear size.
const FACTOR_A2: f64 = 0.5 * (HBARC / FERMI) * (HBARC / FERMI);

/// Thomas-Fermi radius prefactor `½ α² (m_e c² / 0.88534)²` [MeV²].
const SCREEN_FACTOR: f64 = 0.5
    * FINE_STRUCTURE
    * FINE_STRUCTURE
    * (ELECTRON_MASS_C2 / 0.88534)
    * (ELECTRON_MASS_C2 / 0.88534);

/// Exponential nuclear form factor of hydrogen [1/MeV²].
const FORM_FACTOR_H: f64 = 3.097e-6 / (MEV * MEV);

/// Form factor scale for heavier nuclei, multiplied by A^0.54 [1/MeV²].
const FORM_FACTOR_SCALE: f64 = 6.937e-6 / (MEV * MEV);

/// Particles heavier than this use the heavy-projectile electron
/// kinematics.
const HEAVY_MASS: f64 = 1.0 * MEV;

/// Model-level settings of the kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WentzelKernel {
    cos_theta_max: f64,
    u_theta_max: f64,
    combined: bool,
}

impl WentzelKernel {
    /// Create a kernel.
    ///
    /// `polar_angle_limit` is the largest deflection the model handles;
    /// values at or above π impose no limit. In `combined` mode the
    /// nuclear-size cut-off also applies.
    pub fn new(polar_angle_limit: f64, combined: bool) -> Self {
        let (cos_theta_max, u_theta_max) = if polar_angle_limit < std::f64::consts::PI {
            let half = (0.5 * polar_angle_limit).sin();
            (polar_angle_limit.cos(), 2.0 * half * half)
        } else {
            (-1.0, 2.0)
        };
        Self {
            cos_theta_max,
            u_theta_max,
            combined,
        }
    }

    /// Cosine of the largest deflection handled by the model.
    pub fn cos_theta_max(&self) -> f64 {
        self.cos_theta_max
    }

    /// Whether the nuclear-size cut-off is applied.
    pub fn is_combined(&self) -> bool {
        self.combined
    }

    /// Kinematic quantities for `particle` at `kinetic_energy` in a
    /// medium with mean A^(-2/3) equal to `inv_a23`.
    pub fn kinematics(
        &self,
        particle: &ParticleDef,
        kinetic_energy: f64,
        inv_a23: f64,
    ) -> Kinematics {
        let mass = particle.mass;
        let mom2 = kinetic_energy * (kinetic_energy + 2.0 * mass);
        let invbeta2 = 1.0 + mass * mass / mom2;
        let charge2 = particle.charge * particle.charge;
        let u_max_nuc = if self.combined {
            self.u_theta_max.min(FACTOR_A2 * inv_a23 / mom2)
        } else {
            self.u_theta_max
        };
        Kinematics {
            kinetic_energy,
            mass,
            charge2,
            mom2,
            invbeta2,
            fact_b: particle.spin / invbeta2,
            kin_factor: COEFF * charge2 * invbeta2 / mom2,
            u_max_nuc,
            is_electron: particle.is_electron(),
        }
    }
}

/// Quantities that depend on species, energy and medium but not on the
/// target element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    kinetic_energy: f64,
    mass: f64,
    charge2: f64,
    mom2: f64,
    invbeta2: f64,
    fact_b: f64,
    kin_factor: f64,
    u_max_nuc: f64,
    is_electron: bool,
}

impl Kinematics {
    /// Kinetic energy [MeV].
    pub fn kinetic_energy(&self) -> f64 {
        self.kinetic_energy
    }

    /// Squared momentum p²c² [MeV²].
    pub fn mom2(&self) -> f64 {
        self.mom2
    }

    /// 1/β².
    pub fn invbeta2(&self) -> f64 {
        self.invbeta2
    }

    /// Cosine of the nuclear-size cut-off angle.
    pub fn cos_tet_max_nuc(&self) -> f64 {
        1.0 - self.u_max_nuc
    }

    /// Target parameters for `element` with electron cut `cut` [MeV].
    pub fn target(&self, element: &Element, cut: f64) -> Target {
        self.make_target(element.z(), element.z23(), element.a027(), cut)
    }

    /// Target parameters from bare atomic number and molar mass.
    pub fn target_za(&self, z: u32, molar_mass: f64, cut: f64) -> Target {
        let zf = f64::from(z);
        self.make_target(z, zf.cbrt().powi(2), molar_mass.powf(0.27), cut)
    }

    fn make_target(&self, z: u32, z23: f64, a027: f64, cut: f64) -> Target {
        let zf = f64::from(z);
        let screen_r2 = SCREEN_FACTOR * (1.0 + (-zf * zf * 0.001).exp()) * z23;
        let mut screen_z = screen_r2 / self.mom2;
        if z > 1 {
            let alpha2 = FINE_STRUCTURE * FINE_STRUCTURE;
            screen_z *= (zf * self.invbeta2)
                .min(1.13 + 3.76 * zf * zf * self.invbeta2 * alpha2 * self.charge2);
        }
        let form_factor = if z == 1 {
            FORM_FACTOR_H
        } else {
            FORM_FACTOR_SCALE * a027 * a027
        };
        Target {
            z: zf,
            kin_factor: self.kin_factor * zf * zf,
            screen_z,
            formfact_a: form_factor * self.mom2,
            fact_b: self.fact_b,
            u_max_nuc: self.u_max_nuc,
            u_max_elec: self.u_max_elec(cut),
        }
    }

    /// `1 − cos θ` of the largest deflection on atomic electrons
    /// compatible with the cut.
    fn u_max_elec(&self, cut: f64) -> f64 {
        let tkin = self.kinetic_energy;
        if self.mass > HEAVY_MASS {
            let ratio = ELECTRON_MASS_C2 / self.mass;
            let tau = tkin / self.mass;
            let tmax = 2.0 * ELECTRON_MASS_C2 * tau * (tau + 2.0)
                / (1.0 + 2.0 * ratio * (tau + 1.0) + ratio * ratio);
            return (cut.min(tmax) * ELECTRON_MASS_C2 / self.mom2).min(2.0);
        }
        let tmax = if self.is_electron { 0.5 * tkin } else { tkin };
        let t = cut.min(tmax);
        if t <= 0.0 {
            return 0.0;
        }
        let t1 = tkin - t;
        if t1 <= 0.0 {
            return 1.0;
        }
        // 1 − cos θ = (q² − (p − p₁)²) / (2 p p₁), with p − p₁ taken from
        // p² − p₁² = t (2T − t + 2M) so nothing cancels.
        let mom21 = t * (t + 2.0 * ELECTRON_MASS_C2);
        let mom = self.mom2.sqrt();
        let mom1 = (t1 * (t1 + 2.0 * self.mass)).sqrt();
        let dmom = t * (2.0 * tkin - t + 2.0 * self.mass) / (mom + mom1);
        let u = ((mom21 - dmom * dmom) * 0.5 / (mom * mom1)).max(0.0);
        if self.is_electron {
            u.min(1.0)
        } else {
            u.min(2.0)
        }
    }
}

/// Per-element scattering parameters for one [`Kinematics`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    z: f64,
    kin_factor: f64,
    screen_z: f64,
    formfact_a: f64,
    fact_b: f64,
    u_max_nuc: f64,
    u_max_elec: f64,
}

impl Target {
    /// Atomic number.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Screening parameter A.
    pub fn screen_z(&self) -> f64 {
        self.screen_z
    }

    /// Cosine of the nuclear cut-off angle.
    pub fn cos_tet_max_nuc(&self) -> f64 {
        1.0 - self.u_max_nuc
    }

    /// `1 − cos θ` at the electron-target cut-off.
    pub fn u_max_elec(&self) -> f64 {
        self.u_max_elec
    }

    /// Transport cross section [mm²] for deflections with
    /// `cos θ > cos_limit`, summed over nucleus and atomic electrons.
    pub fn transport_cross_section(&self, cos_limit: f64) -> f64 {
        let u = 1.0 - cos_limit;
        let elec = self.moment_integral(u.min(self.u_max_elec), first_moment);
        let nuc = self.moment_integral(u.min(self.u_max_nuc), first_moment);
        self.kin_factor / self.z * (elec + self.z * nuc)
    }

    /// Second transport moment `∫ (1 − cos θ)² dσ` [mm²] for deflections
    /// with `cos θ > cos_limit`.
    pub fn second_transport_moment(&self, cos_limit: f64) -> f64 {
        let u = 1.0 - cos_limit;
        let elec = self.moment_integral(u.min(self.u_max_elec), second_moment);
        let nuc = self.moment_integral(u.min(self.u_max_nuc), second_moment);
        self.kin_factor / self.z * (elec + self.z * nuc)
    }

    /// Total nuclear cross section [mm²] for `cos_max < cos θ < cos_min`.
    pub fn nuclear_cross_section(&self, cos_min: f64, cos_max: f64) -> f64 {
        self.screened_total(1.0 - cos_min, 1.0 - cos_max) * self.kin_factor
    }

    /// Total cross section on atomic electrons [mm²] for
    /// `cos_max < cos θ < cos_min`, clipped to the electron cut-off.
    pub fn electron_cross_section(&self, cos_min: f64, cos_max: f64) -> f64 {
        let u1 = (1.0 - cos_min).min(self.u_max_elec);
        let u2 = (1.0 - cos_max).min(self.u_max_elec);
        self.screened_total(u1, u2) * self.kin_factor / self.z
    }

    /// `∫ du/(u + A)²` over `u1 < u < u2`; zero for an empty interval.
    fn screened_total(&self, u1: f64, u2: f64) -> f64 {
        if u2 <= u1 {
            return 0.0;
        }
        (u2 - u1) / ((u1 + self.screen_z) * (u2 + self.screen_z))
    }

    /// Sample one deflection with `cos_max < cos θ < cos_min`.
    ///
    /// The target is an atomic electron with probability `elec_ratio`,
    /// otherwise the nucleus. Returns the new direction in the frame
    /// where the incoming direction is +z. Form-factor and spin
    /// corrections are applied by rejection; a rejected trial is a null
    /// collision and returns +z unchanged.
    pub fn sample_single<R: Rng + ?Sized>(
        &self,
        cos_min: f64,
        cos_max: f64,
        elec_ratio: f64,
        rng: &mut R,
    ) -> Vec3 {
        let mut formf = self.formfact_a;
        let mut u1 = 1.0 - cos_min;
        let mut u2 = 1.0 - cos_max;
        if elec_ratio > 0.0 && rng.random::<f64>() <= elec_ratio {
            formf = 0.0;
            u1 = u1.min(self.u_max_elec);
            u2 = u2.min(self.u_max_elec);
        }
        if u2 <= u1 {
            return Vec3::Z_AXIS;
        }

        let w1 = u1 + self.screen_z;
        let w2 = u2 + self.screen_z;
        let w3 = u2 - u1;
        let z1 = w1 * w2 / (w1 + rng.random::<f64>() * w3) - self.screen_z;

        let ff = 1.0 / (1.0 + formf * z1);
        let grej = ff * ff * (1.0 - self.fact_b * z1);
        if rng.random::<f64>() > grej {
            return Vec3::Z_AXIS;
        }

        let cost = (1.0 - z1).clamp(-1.0, 1.0);
        let sint = (z1 * (2.0 - z1)).max(0.0).sqrt();
        let phi = std::f64::consts::TAU * rng.random::<f64>();
        Vec3::from_polar(cost, sint, phi)
    }

    /// Integral of `w(u)·(1 − f_B u)/(u + A)²` from 0 to `u_limit`,
    /// without the kinematic factor.
    fn moment_integral(&self, u_limit: f64, moment: fn(f64, f64, f64) -> f64) -> f64 {
        if u_limit <= 0.0 {
            return 0.0;
        }
        let x = u_limit / self.screen_z;
        moment(x, self.screen_z, self.fact_b).max(0.0)
    }
}

/// `∫ u (1 − f_B u)/(u + A)² du`, with `x = U/A`.
fn first_moment(x: f64, a: f64, fact_b: f64) -> f64 {
    log_minus_ratio(x) - a * fact_b * quadratic_remainder(x)
}

/// `∫ u² (1 − f_B u)/(u + A)² du`, with `x = U/A`.
fn second_moment(x: f64, a: f64, fact_b: f64) -> f64 {
    a * quadratic_remainder(x) - fact_b * a * a * cubic_remainder(x)
}

/// `ln(1 + x) − x/(1 + x)`.
fn log_minus_ratio(x: f64) -> f64 {
    if x < SERIES_LIMIT {
        x * x * (0.5 + x * (-2.0 / 3.0 + x * (0.75 + x * (-0.8 + x * 5.0 / 6.0))))
    } else {
        x.ln_1p() - x / (1.0 + x)
    }
}

/// `x − 2 ln(1 + x) + x/(1 + x)`.
fn quadratic_remainder(x: f64) -> f64 {
    if x < SERIES_LIMIT {
        x * x * x * (1.0 / 3.0 + x * (-0.5 + x * (0.6 + x * (-2.0 / 3.0 + x * 5.0 / 7.0))))
    } else {
        x - 2.0 * x.ln_1p() + x / (1.0 + x)
    }
}

/// `x²/2 − 2x + 3 ln(1 + x) − x/(1 + x)`.
fn cubic_remainder(x: f64) -> f64 {
    if x < SERIES_LIMIT {
        x * x * x * x * (0.25 + x * (-0.4 + x * (0.5 - x * 4.0 / 7.0)))
    } else {
        0.5 * x * x - 2.0 * x + 3.0 * x.ln_1p() - x / (1.0 + x)
    }
}
