//! Core types and traits for the Coulomb scattering workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! units and physical constants, particle definitions, elements,
//! materials and material-cuts couples, the collaborator traits the
//! stepper talks through (energy-loss tables, geometry navigation,
//! diagnostics), and a small 3-vector type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod couple;
pub mod diagnostics;
pub mod element;
pub mod error;
pub mod id;
pub mod material;
pub mod particle;
pub mod traits;
pub mod units;
pub mod vector;

pub use couple::{CoupleTable, MaterialCutsCouple, ProductionCuts};
pub use diagnostics::{DiagnosticsSink, StderrSink, Verbosity};
pub use element::Element;
pub use error::MaterialError;
pub use id::{CompositionId, CoupleFingerprint, CoupleId, CoupleTableId};
pub use material::{Component, Material, MaterialBuilder};
pub use particle::ParticleDef;
pub use traits::{EnergyLossTables, GeometryNavigator};
pub use vector::Vec3;
