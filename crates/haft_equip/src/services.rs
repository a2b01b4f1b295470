//! External collaborator seams
//!
//! Audio playback and animation control live outside this crate; the
//! equip machine only fires cues and parameters at them. Both seams are
//! fire-and-forget: no return value is consumed.

/// Body anchor for a positioned cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    /// The hands / held item
    Hands,
    /// Hip holster
    Hip,
    /// Back sling
    Back,
    /// Chest rig
    Chest,
}

/// Where a cue is played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueAnchor {
    /// Anchored to a body part of the listener
    BodyPart(BodyPart),
    /// A fixed world position
    Position([f32; 3]),
}

/// Audio playback service.
pub trait AudioService {
    /// Play a named cue. Fire-and-forget.
    fn play_cue(&self, cue: &str, anchor: CueAnchor, volume: f32);
}

/// Animation parameter/clip control.
pub trait AnimationController {
    /// Set a float parameter
    fn set_float(&self, param: &str, value: f32);
    /// Set a boolean parameter
    fn set_bool(&self, param: &str, value: bool);
    /// Play a named clip
    fn play(&self, clip: &str);
}

/// No-op audio service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioService for NullAudio {
    fn play_cue(&self, _cue: &str, _anchor: CueAnchor, _volume: f32) {}
}

/// No-op animation controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnimation;

impl AnimationController for NullAnimation {
    fn set_float(&self, _param: &str, _value: f32) {}
    fn set_bool(&self, _param: &str, _value: bool) {}
    fn play(&self, _clip: &str) {}
}

/// Collaborators a transition runs against.
#[derive(Clone, Copy)]
pub struct EquipContext<'a> {
    /// Audio playback
    pub audio: &'a dyn AudioService,
    /// Animation control
    pub animation: &'a dyn AnimationController,
}

impl<'a> EquipContext<'a> {
    /// Bundle the two collaborators.
    pub fn new(audio: &'a dyn AudioService, animation: &'a dyn AnimationController) -> Self {
        Self { audio, animation }
    }
}
