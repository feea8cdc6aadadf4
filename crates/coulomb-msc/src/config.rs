//! Stepper configuration, validation, and error types.
//!
//! [`MscConfig`] is immutable once a stepper is built; every worker
//! receives its own clone. [`validate()`](MscConfig::validate) checks all
//! numeric invariants before any table is built.

use std::error::Error;
use std::fmt;

use coulomb_core::units::NM;
use coulomb_core::Verbosity;
use coulomb_xs::{TableError, TableGrid, DEFAULT_HIGH_ENERGY_LIMIT, DEFAULT_LOW_ENERGY_LIMIT};

// ── StepLimitType ──────────────────────────────────────────────────

/// How the true path length is limited near geometry boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepLimitType {
    /// Range and radiation-length limits only; no safety-based limit.
    Minimal,
    /// Limit by the isotropic safety when the particle may leave the
    /// safety sphere.
    #[default]
    UseSafety,
    /// As [`UseSafety`](Self::UseSafety), and on the first step after a
    /// boundary crossing also limit by the distance to the next boundary.
    UseDistanceToBoundary,
}

// ── TableConfig ────────────────────────────────────────────────────

/// Energy grid of the shared physics tables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableConfig {
    /// Lowest tabulated kinetic energy [MeV]. Default: 50 keV.
    pub emin: f64,
    /// Highest tabulated kinetic energy [MeV]. Default: 100 TeV.
    pub emax: f64,
    /// Log-spaced bins per decade. Default: 20.
    pub bins_per_decade: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            emin: DEFAULT_LOW_ENERGY_LIMIT,
            emax: DEFAULT_HIGH_ENERGY_LIMIT,
            bins_per_decade: 20,
        }
    }
}

impl TableConfig {
    /// The grid these settings describe.
    pub fn grid(&self) -> Result<TableGrid, TableError> {
        TableGrid::new(self.emin, self.emax, self.bins_per_decade)
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`MscConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The table energy grid is invalid.
    Table(TableError),
    /// The single-scattering factor must exceed 0.05.
    SingleScatteringFactor {
        /// The invalid value.
        value: f64,
    },
    /// A factor that must be finite and positive is not.
    NonPositiveFactor {
        /// Name of the offending field.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// A factor that must be finite and non-negative is not.
    NegativeFactor {
        /// Name of the offending field.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// The model energy limits are not `0 < low < high`.
    InvalidEnergyLimits {
        /// Configured lower limit [MeV].
        low: f64,
        /// Configured upper limit [MeV].
        high: f64,
    },
    /// The polar angle limit is outside `(0, π]`.
    InvalidPolarAngle {
        /// The invalid value [rad].
        value: f64,
    },
    /// The fixed electron cut is negative or not finite.
    InvalidFixedCut {
        /// The invalid value [MeV].
        value: f64,
    },
    /// No particle species was requested.
    NoParticles,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "table: {e}"),
            Self::SingleScatteringFactor { value } => {
                write!(f, "single_scattering_factor must be > 0.05, got {value}")
            }
            Self::NonPositiveFactor { name, value } => {
                write!(f, "{name} must be finite and > 0, got {value}")
            }
            Self::NegativeFactor { name, value } => {
                write!(f, "{name} must be finite and >= 0, got {value}")
            }
            Self::InvalidEnergyLimits { low, high } => {
                write!(f, "energy limits must satisfy 0 < low < high, got [{low}, {high}]")
            }
            Self::InvalidPolarAngle { value } => {
                write!(f, "polar_angle_limit must be in (0, pi], got {value}")
            }
            Self::InvalidFixedCut { value } => {
                write!(f, "fixed_cut must be finite and >= 0, got {value}")
            }
            Self::NoParticles => write!(f, "no particle species requested"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for ConfigError {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ── MscConfig ──────────────────────────────────────────────────────

/// Complete configuration of the scattering stepper.
#[derive(Clone, Debug, PartialEq)]
pub struct MscConfig {
    /// Ratio of the single-scattering threshold angle to the mean
    /// condensed deflection of a step. Default: 1.25. Must exceed 0.05.
    pub single_scattering_factor: f64,
    /// Expected hard collisions per step below which the step is
    /// sampled in single-scattering mode. Default: 10.
    pub min_collisions: f64,
    /// Single-scattering mode is forced when the safety is below this
    /// multiple of λ. Default: 0 (disabled).
    pub boundary_safety_factor: f64,
    /// Steps longer than this fraction of λ re-evaluate λ at the
    /// mid-step energy. Default: 0.1.
    pub numlimit: f64,
    /// Fraction of the range a step may cover. Default: 0.2.
    pub range_factor: f64,
    /// Fraction of the safety a step may cover at low energy. Default: 0.6.
    pub safety_factor: f64,
    /// Minimum number of steps per radiation length (×1/50) and per
    /// volume. Default: 2.5.
    pub geom_factor: f64,
    /// Smallest true step [mm]. Default: 1 nm.
    pub min_step: f64,
    /// Energies below this are clamped up to it [MeV]. Default: 50 keV,
    /// the lowest energy at which cross sections still fall with energy.
    pub low_energy_limit: f64,
    /// Cross sections vanish above this [MeV]. Default: 100 TeV.
    pub high_energy_limit: f64,
    /// Largest deflection handled by the model [rad]. Default: π.
    pub polar_angle_limit: f64,
    /// Apply the nuclear-size cut-off. Default: true.
    pub combined: bool,
    /// Mix the condensed angular law using the second transport moment.
    /// Default: false.
    pub use_second_moment: bool,
    /// Sample lateral displacement. Default: true.
    pub lateral_displacement: bool,
    /// Electron cut [MeV] replacing every couple's cut. Default: none.
    pub fixed_cut: Option<f64>,
    /// Step limitation algorithm. Default: [`StepLimitType::UseSafety`].
    pub step_limit: StepLimitType,
    /// Diagnostics level. Default: [`Verbosity::Silent`].
    pub verbosity: Verbosity,
    /// Shared table grid.
    pub table: TableConfig,
}

impl Default for MscConfig {
    fn default() -> Self {
        Self {
            single_scattering_factor: 1.25,
            min_collisions: 10.0,
            boundary_safety_factor: 0.0,
            numlimit: 0.1,
            range_factor: 0.2,
            safety_factor: 0.6,
            geom_factor: 2.5,
            min_step: NM,
            low_energy_limit: DEFAULT_LOW_ENERGY_LIMIT,
            high_energy_limit: DEFAULT_HIGH_ENERGY_LIMIT,
            polar_angle_limit: std::f64::consts::PI,
            combined: true,
            use_second_moment: false,
            lateral_displacement: true,
            fixed_cut: None,
            step_limit: StepLimitType::UseSafety,
            verbosity: Verbosity::Silent,
            table: TableConfig::default(),
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveFactor { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeFactor { name, value })
    }
}

impl MscConfig {
    /// Validate all numeric invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Single-scattering factor.
        let ss = self.single_scattering_factor;
        if !ss.is_finite() || ss <= 0.05 {
            return Err(ConfigError::SingleScatteringFactor { value: ss });
        }
        // 2. Step-limit factors.
        positive("range_factor", self.range_factor)?;
        positive("safety_factor", self.safety_factor)?;
        positive("geom_factor", self.geom_factor)?;
        positive("min_step", self.min_step)?;
        positive("numlimit", self.numlimit)?;
        // 3. Mode thresholds.
        non_negative("min_collisions", self.min_collisions)?;
        non_negative("boundary_safety_factor", self.boundary_safety_factor)?;
        // 4. Model limits.
        let (low, high) = (self.low_energy_limit, self.high_energy_limit);
        if !(low > 0.0 && high > low && high.is_finite()) {
            return Err(ConfigError::InvalidEnergyLimits { low, high });
        }
        let angle = self.polar_angle_limit;
        if !(angle > 0.0 && angle <= std::f64::consts::PI) {
            return Err(ConfigError::InvalidPolarAngle { value: angle });
        }
        if let Some(cut) = self.fixed_cut {
            if !cut.is_finite() || cut < 0.0 {
                return Err(ConfigError::InvalidFixedCut { value: cut });
            }
        }
        // 5. Table grid.
        self.table.grid()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(MscConfig::default().validate(), Ok(()));
    }

    #[test]
    fn single_scattering_factor_floor() {
        let config = MscConfig {
            single_scattering_factor: 0.05,
            ..MscConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SingleScatteringFactor { value: 0.05 })
        );
    }

    #[test]
    fn rejects_bad_factors() {
        let config = MscConfig {
            geom_factor: 0.0,
            ..MscConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveFactor { name: "geom_factor", .. })
        ));

        let config = MscConfig {
            min_collisions: f64::NAN,
            ..MscConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeFactor { name: "min_collisions", .. })
        ));
    }

    #[test]
    fn rejects_bad_limits() {
        let config = MscConfig {
            low_energy_limit: 1.0,
            high_energy_limit: 0.5,
            ..MscConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEnergyLimits { .. })
        ));

        let config = MscConfig {
            polar_angle_limit: 4.0,
            ..MscConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPolarAngle { .. })
        ));

        let config = MscConfig {
            fixed_cut: Some(-1.0),
            ..MscConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidFixedCut { value: -1.0 })
        );
    }

    #[test]
    fn table_error_is_wrapped() {
        let config = MscConfig {
            table: TableConfig {
                bins_per_decade: 0,
                ..TableConfig::default()
            },
            ..MscConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err, ConfigError::Table(TableError::NoBins));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("table:"));
    }
}
