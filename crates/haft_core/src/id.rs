//! Runtime instance identifiers

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a runtime item instance.
///
/// Definitions are identified by their string id in the registry; instances
/// created at runtime get an `InstanceId` so two stacks of the same
/// definition remain distinguishable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Create an id from its raw value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic generator for [`InstanceId`]s.
///
/// Ids are never recycled; the counter starts at 1 so the raw value 0 can
/// serve as a "never allocated" marker in debug output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceIdGen {
    next: u64,
}

impl InstanceIdGen {
    /// Create a new generator.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Resume a generator from a persisted counter.
    pub fn resume(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Get the next raw value (for persistence).
    pub fn next_raw(&self) -> u64 {
        self.next
    }
}

impl Default for InstanceIdGen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_monotonic() {
        let mut gen = InstanceIdGen::new();
        let a = gen.allocate();
        let b = gen.allocate();

        assert!(a < b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_resume() {
        let mut gen = InstanceIdGen::resume(42);
        assert_eq!(gen.allocate().raw(), 42);
    }
}
