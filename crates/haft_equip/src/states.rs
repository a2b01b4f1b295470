//! Equip states and the transition table

use serde::{Deserialize, Serialize};

/// Visibility state of the active handheld.
///
/// Exactly one state is active at a time, owned exclusively by the
/// [`crate::machine::EquipStateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipState {
    /// Nothing equipped or visible
    Hidden,
    /// Transient: playing equip audio/animation
    Equipping,
    /// Stable: item fully usable
    Equipped,
    /// Transient: playing holster audio/animation
    Holstering,
}

impl Default for EquipState {
    fn default() -> Self {
        Self::Hidden
    }
}

impl EquipState {
    /// Check if the state is a timed, transient one
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Equipping | Self::Holstering)
    }

    /// Check if the handheld is fully usable
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Equipped)
    }

    fn index(self) -> usize {
        match self {
            Self::Hidden => 0,
            Self::Equipping => 1,
            Self::Equipped => 2,
            Self::Holstering => 3,
        }
    }
}

/// Explicit (state × requested-target → allowed) matrix.
///
/// The default encodes the one-way cycle
/// Hidden → Equipping → Equipped → Holstering → Hidden. Extra edges (for
/// example interrupting Holstering with a fresh Equipping request) are
/// opted into with [`TransitionTable::allowing`]; nothing outside the
/// table ever fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTable {
    allowed: [[bool; 4]; 4],
}

impl TransitionTable {
    /// An empty table permitting nothing.
    pub fn empty() -> Self {
        Self {
            allowed: [[false; 4]; 4],
        }
    }

    /// Add an allowed edge.
    pub fn allowing(mut self, from: EquipState, to: EquipState) -> Self {
        self.allowed[from.index()][to.index()] = true;
        self
    }

    /// Check if a transition is legal.
    pub fn is_allowed(&self, from: EquipState, to: EquipState) -> bool {
        self.allowed[from.index()][to.index()]
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::empty()
            .allowing(EquipState::Hidden, EquipState::Equipping)
            .allowing(EquipState::Equipping, EquipState::Equipped)
            .allowing(EquipState::Equipped, EquipState::Holstering)
            .allowing(EquipState::Holstering, EquipState::Hidden)
    }
}
