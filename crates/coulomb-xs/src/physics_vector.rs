//! Log-spaced energy vector with log-log interpolation.

use crate::error::TableError;

/// Log-spaced energy grid shared by all vectors of a table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableGrid {
    emin: f64,
    emax: f64,
    bins: usize,
}

impl TableGrid {
    /// Grid from `emin` to `emax` [MeV] with `bins_per_decade` bins per
    /// factor of ten (at least one bin overall).
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidRange`] unless `0 < emin < emax < ∞`,
    /// and [`TableError::NoBins`] if `bins_per_decade` is zero.
    pub fn new(emin: f64, emax: f64, bins_per_decade: usize) -> Result<Self, TableError> {
        if !(emin > 0.0 && emax > emin && emax.is_finite()) {
            return Err(TableError::InvalidRange { emin, emax });
        }
        if bins_per_decade == 0 {
            return Err(TableError::NoBins);
        }
        let decades = (emax / emin).log10();
        let bins = ((bins_per_decade as f64 * decades - 1e-9).ceil() as usize).max(1);
        Ok(Self { emin, emax, bins })
    }

    /// Lowest node [MeV].
    pub fn emin(&self) -> f64 {
        self.emin
    }

    /// Highest node [MeV].
    pub fn emax(&self) -> f64 {
        self.emax
    }

    /// Number of bins (nodes minus one).
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Returns `true` if `energy` lies within the grid.
    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.emin && energy <= self.emax
    }

    /// Energy of node `i`.
    pub fn node(&self, i: usize) -> f64 {
        if i >= self.bins {
            return self.emax;
        }
        self.emin * (self.emax / self.emin).powf(i as f64 / self.bins as f64)
    }
}

/// Values of one physics quantity on a [`TableGrid`].
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsLogVector {
    log_emin: f64,
    inv_dlog: f64,
    energies: Vec<f64>,
    values: Vec<f64>,
}

impl PhysicsLogVector {
    /// Tabulate `f` at every node of `grid`.
    pub fn build(grid: &TableGrid, mut f: impl FnMut(f64) -> f64) -> Self {
        let energies: Vec<f64> = (0..=grid.bins()).map(|i| grid.node(i)).collect();
        let values = energies.iter().map(|&e| f(e)).collect();
        Self {
            log_emin: grid.emin().ln(),
            inv_dlog: grid.bins() as f64 / (grid.emax() / grid.emin()).ln(),
            energies,
            values,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    /// Always `false`: a vector has at least two nodes.
    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// Node energies.
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Node values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Interpolated value at `energy`; clamped to the end values outside
    /// the grid.
    ///
    /// Interpolation is log-log when both neighbouring nodes are positive
    /// and linear otherwise.
    pub fn value(&self, energy: f64) -> f64 {
        let last = self.energies.len() - 1;
        if energy <= self.energies[0] {
            return self.values[0];
        }
        if energy >= self.energies[last] {
            return self.values[last];
        }

        let mut idx = (((energy.ln() - self.log_emin) * self.inv_dlog) as usize).min(last - 1);
        // float rounding can put the estimate one bin off
        if idx > 0 && energy < self.energies[idx] {
            idx -= 1;
        } else if idx + 1 < last && energy >= self.energies[idx + 1] {
            idx += 1;
        }

        let (e1, e2) = (self.energies[idx], self.energies[idx + 1]);
        let (y1, y2) = (self.values[idx], self.values[idx + 1]);
        if y1 > 0.0 && y2 > 0.0 {
            let t = (energy / e1).ln() / (e2 / e1).ln();
            (y1.ln() + t * (y2 / y1).ln()).exp()
        } else {
            y1 + (y2 - y1) * (energy - e1) / (e2 - e1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn grid_validation() {
        assert!(TableGrid::new(0.0, 1.0, 10).is_err());
        assert!(TableGrid::new(1.0, 1.0, 10).is_err());
        assert!(TableGrid::new(1.0, f64::INFINITY, 10).is_err());
        assert_eq!(TableGrid::new(1.0, 10.0, 0), Err(TableError::NoBins));
    }

    #[test]
    fn grid_nodes() {
        let g = TableGrid::new(1.0, 1000.0, 7).unwrap();
        assert_eq!(g.bins(), 21);
        assert_eq!(g.node(0), 1.0);
        assert_eq!(g.node(21), 1000.0);
        assert!((g.node(7) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn power_law_is_exact() {
        let g = TableGrid::new(1e-3, 1e5, 10).unwrap();
        let v = PhysicsLogVector::build(&g, |e| 3.0 / (e * e));
        for &e in &[1.5e-3, 0.37, 42.0, 9.9e4] {
            assert!((v.value(e) / (3.0 / (e * e)) - 1.0).abs() < 1e-10, "e={e}");
        }
    }

    #[test]
    fn clamps_outside() {
        let g = TableGrid::new(1.0, 100.0, 5).unwrap();
        let v = PhysicsLogVector::build(&g, |e| e);
        assert_eq!(v.value(0.1), 1.0);
        assert_eq!(v.value(1e6), 100.0);
    }

    #[test]
    fn linear_fallback_near_zero() {
        let g = TableGrid::new(1.0, 10.0, 1).unwrap();
        let v = PhysicsLogVector::build(&g, |e| if e < 5.0 { 0.0 } else { 9.0 });
        assert!((v.value(5.5) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn node_values_are_reproduced() {
        let g = TableGrid::new(1e-2, 1e4, 20).unwrap();
        let v = PhysicsLogVector::build(&g, |e| (1.0 + e).ln());
        for (e, y) in v.energies().iter().zip(v.values()) {
            assert!((v.value(*e) - y).abs() <= 1e-12 * y.abs());
        }
    }

    proptest! {
        #[test]
        fn monotone_data_gives_monotone_interpolant(
            a in 1e-3f64..1e3,
            b in 1e-3f64..1e3,
        ) {
            let g = TableGrid::new(1e-3, 1e3, 4).unwrap();
            let v = PhysicsLogVector::build(&g, |e| 1.0 / (e + 0.5));
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(v.value(hi) <= v.value(lo));
        }
    }
}
