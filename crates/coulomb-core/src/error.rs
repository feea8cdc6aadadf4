//! Error types for material and couple construction.

use std::error::Error;
use std::fmt;

/// Errors from building elements, materials and couples.
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialError {
    /// A material was built without any element.
    EmptyComposition {
        /// Name of the offending material.
        material: String,
    },
    /// Mass density is negative, NaN or infinite.
    InvalidDensity {
        /// The invalid value [g/cm³].
        value: f64,
    },
    /// Atomic number or molar mass out of range.
    InvalidElement {
        /// Description of the failure.
        reason: String,
    },
    /// A mass fraction or atom count is invalid, or fractions were mixed.
    InvalidFraction {
        /// Description of the failure.
        reason: String,
    },
    /// Production cut energy or range is negative, NaN or infinite.
    InvalidCut {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyComposition { material } => {
                write!(f, "material '{material}' has no elements")
            }
            Self::InvalidDensity { value } => {
                write!(f, "density must be finite and >= 0, got {value}")
            }
            Self::InvalidElement { reason } => write!(f, "invalid element: {reason}"),
            Self::InvalidFraction { reason } => write!(f, "invalid fraction: {reason}"),
            Self::InvalidCut { value } => {
                write!(f, "production cut must be finite and >= 0, got {value}")
            }
        }
    }
}

impl Error for MaterialError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_material() {
        let e = MaterialError::EmptyComposition {
            material: "heavy_water".into(),
        };
        assert!(e.to_string().contains("heavy_water"));
    }

    #[test]
    fn display_reports_value() {
        let e = MaterialError::InvalidDensity { value: -1.5 };
        assert!(e.to_string().contains("-1.5"));
    }
}
