//! Per-stepper counters.
//!
//! [`StepMetrics`] accumulates over the lifetime of a stepper. Each
//! worker owns its stepper, so counters are plain integers; aggregate
//! across workers by summing.

use std::ops::AddAssign;

/// Counters collected by a [`WentzelStepper`](crate::WentzelStepper).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Steps whose scattering was sampled.
    pub steps: u64,
    /// Steps sampled in single-scattering mode.
    pub single_scattering_steps: u64,
    /// Condensed sub-steps sampled in multiple-scattering mode.
    pub msc_substeps: u64,
    /// Explicit hard single scatterings, both modes.
    pub hard_scatterings: u64,
    /// Material-cache refreshes.
    pub material_refreshes: u64,
    /// Particle-species setups.
    pub particle_setups: u64,
    /// Single-scattering working-set refills.
    pub working_set_fills: u64,
}

impl AddAssign<&StepMetrics> for StepMetrics {
    fn add_assign(&mut self, other: &StepMetrics) {
        self.steps += other.steps;
        self.single_scattering_steps += other.single_scattering_steps;
        self.msc_substeps += other.msc_substeps;
        self.hard_scatterings += other.hard_scatterings;
        self.material_refreshes += other.material_refreshes;
        self.particle_setups += other.particle_setups;
        self.working_set_fills += other.working_set_fills;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.steps, 0);
        assert_eq!(m.single_scattering_steps, 0);
        assert_eq!(m.msc_substeps, 0);
        assert_eq!(m.hard_scatterings, 0);
        assert_eq!(m.material_refreshes, 0);
        assert_eq!(m.particle_setups, 0);
        assert_eq!(m.working_set_fills, 0);
    }

    #[test]
    fn metrics_sum() {
        let mut total = StepMetrics::default();
        let worker = StepMetrics {
            steps: 3,
            hard_scatterings: 7,
            ..StepMetrics::default()
        };
        total += &worker;
        total += &worker;
        assert_eq!(total.steps, 6);
        assert_eq!(total.hard_scatterings, 14);
        assert_eq!(total.msc_substeps, 0);
    }
}
