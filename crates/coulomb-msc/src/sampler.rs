//! Scattering mode selection and per-step angular sampling.
//!
//! A step is sampled in one of two closed modes:
//!
//! - [`ScatteringMode::Multiple`]: the condensed deflection of one or two
//!   sub-steps is drawn from an exponential law in `z = (1 − cos θ)/2`
//!   (optionally mixed with a Γ(2) law of the same mean), interleaved
//!   with explicit hard single scatterings beyond the threshold angle.
//! - [`ScatteringMode::Single`]: only explicit single scatterings, with
//!   exponentially distributed gaps.
//!
//! Sampling happens in the frame where the incoming direction is +z and
//! the end point of the straight step is the origin; the stepper rotates
//! the result into the global frame.

use coulomb_core::Vec3;
use coulomb_xs::SingleScatteringSet;
use rand::Rng;

use crate::config::MscConfig;

/// Condensed sub-steps are split in two above this mean `z`.
const TWO_SUBSTEP_LIMIT: f64 = 0.05;

/// The Γ(2) mixture is only used below this mean `z`.
const MIXING_LIMIT: f64 = 1.0;

/// How a step's deflection is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScatteringMode {
    /// Condensed multiple scattering plus explicit hard scatterings.
    Multiple,
    /// Explicit single scatterings only.
    Single,
}

/// Per-step quantities the mode decision depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeInputs {
    /// True path length [mm].
    pub true_length: f64,
    /// Transport mean free path λ [mm].
    pub lambda: f64,
    /// Total single-scattering cross section per volume [1/mm].
    pub single_cross_section: f64,
    /// Pre-step safety [mm].
    pub safety: f64,
}

/// Configured mode thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeThresholds {
    /// Minimum expected collisions per step for condensed sampling.
    pub min_collisions: f64,
    /// Safety below this multiple of λ forces single scattering.
    pub boundary_safety_factor: f64,
}

impl From<&MscConfig> for ModeThresholds {
    fn from(config: &MscConfig) -> Self {
        Self {
            min_collisions: config.min_collisions,
            boundary_safety_factor: config.boundary_safety_factor,
        }
    }
}

/// Decide the mode of one step.
///
/// Single scattering is chosen when λ is not positive and finite, when
/// fewer than `min_collisions` collisions are expected, or when the
/// safety is below `boundary_safety_factor · λ`.
pub fn select_mode(inputs: &ModeInputs, thresholds: &ModeThresholds) -> ScatteringMode {
    let lambda = inputs.lambda;
    if !(lambda > 0.0 && lambda.is_finite()) {
        return ScatteringMode::Single;
    }
    if inputs.true_length * inputs.single_cross_section < thresholds.min_collisions {
        return ScatteringMode::Single;
    }
    if inputs.safety < thresholds.boundary_safety_factor * lambda {
        return ScatteringMode::Single;
    }
    ScatteringMode::Multiple
}

/// Result of sampling one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatteringOutcome {
    /// New unit direction.
    pub direction: Vec3,
    /// Displacement of the end point relative to the straight step [mm].
    pub displacement: Vec3,
}

impl ScatteringOutcome {
    /// No deflection, no displacement, along `direction`.
    pub fn unchanged(direction: Vec3) -> Self {
        Self {
            direction,
            displacement: Vec3::ZERO,
        }
    }
}

/// Inputs of [`sample_step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSample {
    /// Mode of the step.
    pub mode: ScatteringMode,
    /// True path length [mm].
    pub true_length: f64,
    /// Geometric path length [mm].
    pub geom_length: f64,
    /// Half the inverse transport mean free path of the condensed part
    /// [1/mm]; unused in single-scattering mode.
    pub half_inv_lambda: f64,
    /// Second transport moment per volume [1/mm]; zero disables mixing.
    pub second_moment: f64,
    /// Sample lateral displacement of condensed sub-steps.
    pub lateral_displacement: bool,
}

/// Event counts of one sampled step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleTally {
    /// Condensed sub-steps.
    pub substeps: u64,
    /// Explicit single scatterings.
    pub hard_scatterings: u64,
}

/// Sample the deflection of one step in the local frame.
///
/// Hard scatterings use `set`, which must have been filled for the
/// step's threshold; an empty set or zero total cross section means no
/// hard scattering. Without lateral displacement the returned
/// displacement is zero.
pub fn sample_step<R: Rng + ?Sized>(
    step: &StepSample,
    set: &SingleScatteringSet,
    rng: &mut R,
) -> (ScatteringOutcome, SampleTally) {
    let t = step.true_length;
    let mut tally = SampleTally::default();
    if t <= 0.0 {
        return (ScatteringOutcome::unchanged(Vec3::Z_AXIS), tally);
    }

    let mscfac = step.geom_length / t;
    let xtsec = set.total();
    let mut dir = Vec3::Z_AXIS;
    let mut disp = Vec3::new(0.0, 0.0, -step.geom_length);

    match step.mode {
        ScatteringMode::Single => {
            let mut travelled = 0.0;
            if xtsec > 0.0 {
                loop {
                    let gap = exponential_gap(xtsec, rng);
                    if travelled + gap >= t {
                        break;
                    }
                    travelled += gap;
                    disp += dir * (gap * mscfac);
                    dir = hard_scatter(set, dir, rng);
                    tally.hard_scatterings += 1;
                }
            }
            disp += dir * ((t - travelled) * mscfac);
        }
        ScatteringMode::Multiple => {
            let mut x0 = t;
            let mut z0 = t * step.half_inv_lambda;
            let mut substeps = 1;
            if z0 > TWO_SUBSTEP_LIMIT {
                x0 *= 0.5;
                z0 *= 0.5;
                substeps = 2;
            }
            let prob2 = gamma_mixing_probability(step.second_moment, x0, z0);

            let mut next_single = if xtsec > 0.0 {
                exponential_gap(xtsec, rng)
            } else {
                f64::INFINITY
            };
            let mut to_substep = x0;
            while substeps > 0 {
                if next_single <= to_substep {
                    disp += dir * (next_single * mscfac);
                    to_substep -= next_single;
                    dir = hard_scatter(set, dir, rng);
                    tally.hard_scatterings += 1;
                    next_single = exponential_gap(xtsec, rng);
                    continue;
                }

                let segment = to_substep * mscfac;
                disp += dir * segment;
                next_single -= to_substep;
                to_substep = x0;
                substeps -= 1;
                tally.substeps += 1;

                let z = sample_condensed_z(z0, prob2, rng);
                let cost = 1.0 - 2.0 * z;
                let sint = (4.0 * z * (1.0 - z)).max(0.0).sqrt();
                let phi = std::f64::consts::TAU * rng.random::<f64>();
                let (vx, vy) = (sint * phi.cos(), sint * phi.sin());

                if step.lateral_displacement {
                    // the lateral offset keeps the segment length
                    let rms = (2.0 * z0 / 12.0).sqrt();
                    let r = segment;
                    let (g1, g2) = gaussian_pair(rng);
                    let dx = r * (0.5 * vx + rms * g1);
                    let dy = r * (0.5 * vy + rms * g2);
                    let d = r * r - dx * dx - dy * dy;
                    if d >= 0.0 {
                        disp += Vec3::new(dx, dy, d.sqrt() - r).rotate_uz(dir);
                    }
                }
                dir = Vec3::new(vx, vy, cost).rotate_uz(dir);
            }
        }
    }

    let displacement = if step.lateral_displacement {
        disp
    } else {
        Vec3::ZERO
    };
    (
        ScatteringOutcome {
            direction: dir.unit(),
            displacement,
        },
        tally,
    )
}

/// Probability of drawing the condensed `z` from the Γ(2) law.
///
/// Chosen so the mixture's second moment matches
/// `z0² + x0·k₂/4`, the compound-Poisson estimate for a sub-step of
/// length `x0` with second transport moment `k₂` per volume.
pub fn gamma_mixing_probability(second_moment: f64, x0: f64, z0: f64) -> f64 {
    if second_moment <= 0.0 || z0 <= 0.0 || z0 >= MIXING_LIMIT {
        return 0.0;
    }
    (2.0 * (1.0 - x0 * second_moment / (4.0 * z0 * z0))).clamp(0.0, 1.0)
}

/// Draw `z = (1 − cos θ)/2` of one condensed sub-step with mean about
/// `z0`, restricted to `[0, 1]`.
pub fn sample_condensed_z<R: Rng + ?Sized>(z0: f64, prob2: f64, rng: &mut R) -> f64 {
    if prob2 > 0.0 && rng.random::<f64>() < prob2 {
        loop {
            let u1 = 1.0 - rng.random::<f64>();
            let u2 = 1.0 - rng.random::<f64>();
            let z = -0.5 * z0 * (u1 * u2).ln();
            if z <= 1.0 {
                return z;
            }
        }
    }
    // exponential truncated at one by inverse transform
    let tail = (-1.0 / z0).exp();
    -z0 * (1.0 - (1.0 - tail) * rng.random::<f64>()).ln()
}

/// Two independent standard normal samples (Box-Muller).
fn gaussian_pair<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    let rho = (-2.0 * u1.ln()).sqrt();
    let phi = std::f64::consts::TAU * u2;
    (rho * phi.cos(), rho * phi.sin())
}

fn exponential_gap<R: Rng + ?Sized>(cross_section: f64, rng: &mut R) -> f64 {
    -(1.0 - rng.random::<f64>()).ln() / cross_section
}

fn hard_scatter<R: Rng + ?Sized>(set: &SingleScatteringSet, dir: Vec3, rng: &mut R) -> Vec3 {
    let i = if set.len() > 1 {
        set.select_element(rng.random())
    } else {
        0
    };
    let target = set.target(i);
    target
        .sample_single(
            set.cos_theta_min(),
            target.cos_tet_max_nuc(),
            set.electron_ratio(i),
            rng,
        )
        .rotate_uz(dir)
}
