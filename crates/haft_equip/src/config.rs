//! Equip timing and cue configuration

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Shared, hot-editable configuration handle.
///
/// The machine re-reads this at every transition entry, so authoring
/// edits made mid-session (development mode) take effect on the next
/// transition. A wait already pending keeps the duration it started with.
pub type SharedEquipConfig = Arc<RwLock<EquipConfig>>;

/// Durations and cues for equip/holster transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipConfig {
    /// Equip transition duration in seconds
    pub equip_duration: f32,
    /// Holster transition duration in seconds
    pub holster_duration: f32,
    /// Cue played when equipping starts
    pub equip_cue: String,
    /// Cue played when holstering starts
    pub holster_cue: String,
    /// Volume for both cues
    pub cue_volume: f32,
}

impl Default for EquipConfig {
    fn default() -> Self {
        Self {
            equip_duration: 0.4,
            holster_duration: 0.3,
            equip_cue: "equip".to_string(),
            holster_cue: "holster".to_string(),
            cue_volume: 1.0,
        }
    }
}

impl EquipConfig {
    /// Create a config with both durations
    pub fn new(equip_duration: f32, holster_duration: f32) -> Self {
        Self {
            equip_duration,
            holster_duration,
            ..Self::default()
        }
    }

    /// Set the equip cue
    pub fn with_equip_cue(mut self, cue: impl Into<String>) -> Self {
        self.equip_cue = cue.into();
        self
    }

    /// Set the holster cue
    pub fn with_holster_cue(mut self, cue: impl Into<String>) -> Self {
        self.holster_cue = cue.into();
        self
    }

    /// Set the cue volume
    pub fn with_cue_volume(mut self, volume: f32) -> Self {
        self.cue_volume = volume;
        self
    }

    /// Wrap into the shared handle the machine reads live.
    pub fn shared(self) -> SharedEquipConfig {
        Arc::new(RwLock::new(self))
    }
}
