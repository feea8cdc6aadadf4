//! Per-stepper cache of the current material-cuts couple.

use std::sync::Arc;

use coulomb_core::{CoupleFingerprint, MaterialCutsCouple};

/// Remembers the couple of the last [`define_material`] call. Density
/// index, density factor and composition are read from that couple.
///
/// [`define_material`]: MaterialCache::define_material
#[derive(Clone, Debug, Default)]
pub struct MaterialCache {
    current: Option<Arc<MaterialCutsCouple>>,
}

impl MaterialCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `couple` current.
    ///
    /// Returns `true` if the cache was refreshed, `false` if `couple` was
    /// already current. Identity is the couple's fingerprint, so a couple
    /// of a rebuilt table never aliases one of the old table.
    pub fn define_material(&mut self, couple: &Arc<MaterialCutsCouple>) -> bool {
        if self.fingerprint() == Some(couple.fingerprint()) {
            return false;
        }
        self.current = Some(Arc::clone(couple));
        true
    }

    /// Fingerprint of the current couple, if any.
    pub fn fingerprint(&self) -> Option<CoupleFingerprint> {
        self.current.as_ref().map(|c| c.fingerprint())
    }

    /// The current couple.
    ///
    /// # Panics
    ///
    /// Panics if no material was defined.
    pub fn couple(&self) -> &Arc<MaterialCutsCouple> {
        match &self.current {
            Some(c) => c,
            None => panic!("material accessed before define_material"),
        }
    }
}
