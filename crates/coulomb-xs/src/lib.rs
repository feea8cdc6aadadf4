//! Wentzel single-scattering cross sections and shared physics tables.
//!
//! - [`kernel`]: the screened-Rutherford (Wentzel) model with nuclear
//!   form factor, spin correction and electron targets.
//! - [`evaluator`]: per-atom and per-volume cross sections on top of the
//!   kernel, including the per-element single-scattering working set.
//! - [`physics_vector`] / [`physics_table`]: log-spaced energy vectors
//!   and per-density-index tables built once and shared read-only.
//! - [`second_moment`] / [`transport_table`]: the two tables the stepper
//!   reads per step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod kernel;
pub mod physics_table;
pub mod physics_vector;
pub mod second_moment;
pub mod transport_table;
pub mod working_set;

pub use error::TableError;
pub use evaluator::{CrossSectionEvaluator, DEFAULT_HIGH_ENERGY_LIMIT, DEFAULT_LOW_ENERGY_LIMIT};
pub use kernel::{Kinematics, Target, WentzelKernel};
pub use physics_table::PhysicsTable;
pub use physics_vector::{PhysicsLogVector, TableGrid};
pub use second_moment::SecondMomentTable;
pub use transport_table::TransportTable;
pub use working_set::{SetKey, SingleScatteringSet};
