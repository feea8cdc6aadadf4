//! Strongly-typed identifiers for material compositions, couples and
//! couple tables.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a material-cuts couple within a [`CoupleTable`](crate::CoupleTable).
///
/// Couples are registered in order and assigned sequential IDs.
/// `CoupleId(n)` corresponds to the n-th registered couple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoupleId(pub u32);

impl fmt::Display for CoupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CoupleId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`CoupleTableId`] allocation.
static COUPLE_TABLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a couple table.
///
/// Allocated from a monotonic atomic counter. A table rebuilt after the
/// geometry is reopened gets a fresh ID, so couple IDs reused by the new
/// table can never be mistaken for couples of the old one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoupleTableId(u64);

impl CoupleTableId {
    /// Allocate a fresh, unique table ID. Thread-safe.
    pub fn next() -> Self {
        Self(COUPLE_TABLE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CoupleTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter for unique [`CompositionId`] allocation.
static COMPOSITION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a material composition.
///
/// Every built [`Material`](crate::Material) gets a fresh ID, except
/// density variants made with
/// [`Material::with_density`](crate::Material::with_density), which keep
/// the ID of the material they derive from. Two materials with equal IDs
/// therefore have the same elements in the same proportions, whatever
/// their names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositionId(u64);

impl CompositionId {
    /// Allocate a fresh, unique composition ID. Thread-safe.
    pub fn next() -> Self {
        Self(COMPOSITION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a couple across table rebuilds.
///
/// Two couples compare equal only if they come from the same table
/// instance and carry the same [`CoupleId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoupleFingerprint {
    /// Table the couple was registered in.
    pub table: CoupleTableId,
    /// Couple index within that table.
    pub couple: CoupleId,
}

impl fmt::Display for CoupleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.couple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_are_unique() {
        let a = CoupleTableId::next();
        let b = CoupleTableId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn composition_ids_are_unique() {
        let a = CompositionId::next();
        let b = CompositionId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn fingerprint_distinguishes_tables() {
        let a = CoupleFingerprint {
            table: CoupleTableId::next(),
            couple: CoupleId(0),
        };
        let b = CoupleFingerprint {
            table: CoupleTableId::next(),
            couple: CoupleId(0),
        };
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn couple_id_display() {
        assert_eq!(CoupleId::from(7).to_string(), "7");
    }
}
