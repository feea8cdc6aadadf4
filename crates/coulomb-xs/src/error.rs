//! Error type for physics-table construction.

use std::error::Error;
use std::fmt;

/// Errors from building a log-energy grid or table.
#[derive(Clone, Debug, PartialEq)]
pub enum TableError {
    /// Energy bounds are not finite, positive and increasing.
    InvalidRange {
        /// Lower bound [MeV].
        emin: f64,
        /// Upper bound [MeV].
        emax: f64,
    },
    /// Fewer than one bin.
    NoBins,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { emin, emax } => write!(
                f,
                "energy range must satisfy 0 < emin < emax < inf, got [{emin}, {emax}]"
            ),
            Self::NoBins => write!(f, "energy grid needs at least one bin"),
        }
    }
}

impl Error for TableError {}
