//! Per-element working set for explicit single scattering.
//!
//! Holds, for the current material and effective energy, one kernel
//! [`Target`] per element together with the cumulative macroscopic cross
//! section for deflections between the single-scattering threshold and
//! the nuclear cut-off. The set is keyed by couple, energy and threshold;
//! callers check [`is_current`](SingleScatteringSet::is_current) before
//! refilling it.

use coulomb_core::CoupleFingerprint;
use smallvec::SmallVec;

use crate::kernel::Target;

/// Cache key of a filled working set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetKey {
    /// Couple the set was built for.
    pub couple: CoupleFingerprint,
    /// Effective kinetic energy [MeV].
    pub energy: f64,
    /// Single-scattering threshold cosine.
    pub cos_theta_min: f64,
}

/// Per-element single-scattering data for the current material.
#[derive(Clone, Debug, Default)]
pub struct SingleScatteringSet {
    targets: SmallVec<[Target; 4]>,
    cumulative: SmallVec<[f64; 4]>,
    electron_ratio: SmallVec<[f64; 4]>,
    cos_theta_min: f64,
    transport: f64,
    key: Option<SetKey>,
}

impl SingleScatteringSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the set and start a new fill for threshold `cos_theta_min`.
    pub fn begin(&mut self, cos_theta_min: f64) {
        self.targets.clear();
        self.cumulative.clear();
        self.electron_ratio.clear();
        self.cos_theta_min = cos_theta_min;
        self.transport = 0.0;
        self.key = None;
    }

    /// Append one element.
    ///
    /// `cross_section` is this element's macroscopic single-scattering
    /// cross section [1/mm]; `electron_ratio` the fraction of it due to
    /// atomic electrons.
    pub fn push(&mut self, target: Target, cross_section: f64, electron_ratio: f64) {
        let previous = self.cumulative.last().copied().unwrap_or(0.0);
        self.targets.push(target);
        self.cumulative.push(previous + cross_section);
        self.electron_ratio.push(electron_ratio);
    }

    /// Record the macroscopic transport coefficient for deflections below
    /// the threshold.
    pub fn set_transport(&mut self, transport: f64) {
        self.transport = transport;
    }

    /// Mark the fill as complete for `key`.
    pub fn finish(&mut self, key: SetKey) {
        self.key = Some(key);
    }

    /// Returns `true` if the set was filled for exactly `key`.
    pub fn is_current(&self, key: &SetKey) -> bool {
        self.key.as_ref() == Some(key)
    }

    /// Force the next lookup to refill.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if the set holds no element.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Total macroscopic single-scattering cross section Σ [1/mm].
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Macroscopic transport coefficient below the threshold [1/mm].
    pub fn transport(&self) -> f64 {
        self.transport
    }

    /// Threshold cosine the set was filled for.
    pub fn cos_theta_min(&self) -> f64 {
        self.cos_theta_min
    }

    /// Kernel target of element `i`.
    pub fn target(&self, i: usize) -> &Target {
        &self.targets[i]
    }

    /// Fraction of element `i`'s cross section due to atomic electrons.
    pub fn electron_ratio(&self, i: usize) -> f64 {
        self.electron_ratio[i]
    }

    /// Pick the element of the next event from a uniform variate in [0, 1).
    pub fn select_element(&self, uniform: f64) -> usize {
        let threshold = uniform * self.total();
        self.cumulative
            .iter()
            .position(|&c| threshold < c)
            .unwrap_or(self.targets.len().saturating_sub(1))
    }

    /// Per-element selection probabilities.
    ///
    /// Sums to one for any non-empty set; a set with zero total cross
    /// section reports uniform weights.
    pub fn selection_probabilities(&self) -> SmallVec<[f64; 4]> {
        let n = self.cumulative.len();
        let total = self.total();
        if total <= 0.0 {
            return (0..n).map(|_| 1.0 / n as f64).collect();
        }
        let mut previous = 0.0;
        self.cumulative
            .iter()
            .map(|&c| {
                let p = (c - previous) / total;
                previous = c;
                p
            })
            .collect()
    }
}
