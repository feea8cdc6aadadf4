//! Wentzel-VI multiple/single Coulomb scattering for charged-particle
//! transport.
//!
//! A [`WentzelStepper`] limits each step, converts between true and
//! geometric path length, and samples the deflection and lateral
//! displacement at the end of the step. Small-angle scattering is
//! condensed; scatterings beyond a per-step threshold angle are sampled
//! one by one from the Wentzel single-scattering cross section.
//!
//! Physics tables live in [`SharedTables`], built once and shared
//! read-only across worker threads behind an `Arc`; everything mutable
//! is owned by each worker's stepper.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod material_cache;
pub mod metrics;
pub mod path_length;
pub mod physics;
pub mod sampler;
pub mod stepper;
pub mod track;

pub use config::{ConfigError, MscConfig, StepLimitType, TableConfig};
pub use material_cache::MaterialCache;
pub use metrics::StepMetrics;
pub use path_length::PathLengthConverter;
pub use physics::{SharedTables, SpeciesTables};
pub use sampler::{ScatteringMode, ScatteringOutcome};
pub use stepper::WentzelStepper;
pub use track::{PreStepPoint, StepLimit, StepStatus};
