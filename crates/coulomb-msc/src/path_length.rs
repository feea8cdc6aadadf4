//! True ↔ geometric path length conversion.
//!
//! With transport mean free path λ the mean projection of a true path
//! `t` on the initial direction is
//!
//! ```text
//! z(t) = λ (1 − e^{−t/λ})
//! ```
//!
//! and its inverse `t(z) = −λ ln(1 − z/λ)`. Both are evaluated through
//! `expm1`/`ln_1p` so short steps keep full precision and round-trip.

/// Converter for one value of λ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathLengthConverter {
    lambda: f64,
}

impl PathLengthConverter {
    /// Converter for transport mean free path `lambda` [mm].
    ///
    /// An infinite λ gives the identity map.
    ///
    /// # Panics
    ///
    /// Panics if `lambda` is not positive.
    pub fn new(lambda: f64) -> Self {
        assert!(lambda > 0.0, "transport mean free path must be > 0, got {lambda}");
        Self { lambda }
    }

    /// λ [mm].
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Geometric length of a true path `t` [mm].
    ///
    /// # Panics
    ///
    /// Panics if `t` is negative or NaN.
    pub fn geom_from_true(&self, t: f64) -> f64 {
        assert!(t >= 0.0, "true path length must be >= 0, got {t}");
        if self.lambda.is_infinite() {
            return t;
        }
        -self.lambda * (-t / self.lambda).exp_m1()
    }

    /// True length of a geometric path `z` [mm]; infinite for `z ≥ λ`.
    ///
    /// # Panics
    ///
    /// Panics if `z` is negative or NaN.
    pub fn true_from_geom(&self, z: f64) -> f64 {
        assert!(z >= 0.0, "geometric path length must be >= 0, got {z}");
        if self.lambda.is_infinite() {
            return z;
        }
        if z >= self.lambda {
            return f64::INFINITY;
        }
        -self.lambda * (-z / self.lambda).ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_maps_to_zero() {
        let c = PathLengthConverter::new(3.0);
        assert_eq!(c.geom_from_true(0.0), 0.0);
        assert_eq!(c.true_from_geom(0.0), 0.0);
    }

    #[test]
    fn saturates_at_lambda() {
        let c = PathLengthConverter::new(2.0);
        let z = c.geom_from_true(1.0e3);
        assert!(z <= 2.0);
        assert!(z > 1.999_999);
        assert_eq!(c.true_from_geom(2.0), f64::INFINITY);
        assert_eq!(c.true_from_geom(5.0), f64::INFINITY);
    }

    #[test]
    fn infinite_lambda_is_identity() {
        let c = PathLengthConverter::new(f64::INFINITY);
        assert_eq!(c.geom_from_true(4.2), 4.2);
        assert_eq!(c.true_from_geom(4.2), 4.2);
    }

    #[test]
    #[should_panic(expected = "true path length")]
    fn negative_length_panics() {
        PathLengthConverter::new(1.0).geom_from_true(-1.0);
    }

    proptest! {
        #[test]
        fn round_trip(lambda in 1e-4f64..1e4, frac in 0.0f64..10.0) {
            let c = PathLengthConverter::new(lambda);
            let t = frac * lambda;
            let back = c.true_from_geom(c.geom_from_true(t));
            if t == 0.0 {
                prop_assert_eq!(back, 0.0);
            } else {
                prop_assert!((back / t - 1.0).abs() < 1e-6, "t={} back={}", t, back);
            }
        }

        #[test]
        fn strictly_increasing(lambda in 1e-3f64..1e3, a in 0.0f64..5.0, d in 1e-3f64..5.0) {
            let c = PathLengthConverter::new(lambda);
            let t1 = a * lambda;
            let t2 = (a + d) * lambda;
            prop_assert!(c.geom_from_true(t2) > c.geom_from_true(t1));
            prop_assert!(c.geom_from_true(t1) <= t1);
        }

        #[test]
        fn near_identity_for_short_steps(lambda in 1.0f64..1e6, frac in 0.0f64..1e-6) {
            let c = PathLengthConverter::new(lambda);
            let t = frac * lambda;
            prop_assert!((c.geom_from_true(t) - t).abs() <= 1e-6 * t + f64::MIN_POSITIVE);
        }
    }
}
