//! # haft_equip - Handheld Selection and Equip Timing
//!
//! The equip layer of Haft:
//!
//! - A selector tracking which loadout slot is active
//! - A four-state equip/holster machine (Hidden, Equipping, Equipped,
//!   Holstering) with cooperative, cancellable timed transitions
//! - Audio and animation service seams (fire-and-forget collaborators)
//! - A rig composing loadout, selector and machine
//!
//! All timing runs on the simulation clock: transient states start a
//! countdown on entry and the owner resumes it with `update(dt)`. A new
//! transition request supersedes a pending wait outright.

pub mod config;
pub mod machine;
pub mod rig;
pub mod selector;
pub mod services;
pub mod states;

pub mod prelude {
    pub use crate::config::{EquipConfig, SharedEquipConfig};
    pub use crate::machine::{EquipStateMachine, StateChanged};
    pub use crate::rig::{HandheldRig, RigBuilder, RigError};
    pub use crate::selector::{
        HandheldLookup, HandheldSelector, MapLookup, SelectionChanged, NO_SELECTION,
    };
    pub use crate::services::{
        AnimationController, AudioService, BodyPart, CueAnchor, EquipContext, NullAnimation,
        NullAudio,
    };
    pub use crate::states::{EquipState, TransitionTable};
}

pub use prelude::*;
