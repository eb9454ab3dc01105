//! Versioned records and optimistic concurrency expectations.

use crate::entity::Entity;

/// An entity whose state carries a change counter.
///
/// The version starts at 1 on creation and grows by exactly one for every accepted
/// mutation. It is never decremented or skipped.
pub trait Versioned: Entity {
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a versioned record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ExpectedVersion {
    /// Skip version checking (last write wins).
    #[default]
    Any,
    /// Require the record to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_version() {
        assert!(ExpectedVersion::Any.matches(1));
        assert!(ExpectedVersion::Any.matches(u64::MAX));
    }

    #[test]
    fn exact_requires_the_same_version() {
        assert!(ExpectedVersion::Exact(3).matches(3));
        assert!(!ExpectedVersion::Exact(2).matches(3));
    }
}
