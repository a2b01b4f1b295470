//! Slot handles
//!
//! A slot is not a data owner: it is a (storage, index) pair re-resolved
//! against the container on every access. Handles stay valid across
//! mutations because they never point into the backing storage.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Process-unique identity of a container.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

/// Non-owning handle to one slot of a container.
///
/// Equality is by (container, index). Valid handles are obtained through
/// [`crate::container::Container::slot_ref`], which checks the range; a
/// handle with an out-of-range index is a wiring bug.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// Owning container
    pub container: ContainerId,
    /// Slot index within the container
    pub index: usize,
}

impl SlotRef {
    /// Create a handle. Range validity is the caller's responsibility;
    /// prefer [`crate::container::Container::slot_ref`].
    pub fn new(container: ContainerId, index: usize) -> Self {
        Self { container, index }
    }
}

impl fmt::Debug for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotRef({}:{})", self.container.0, self.index)
    }
}
