//! The equip/holster state machine
//!
//! Transitions run cooperatively: entering a transient state starts a
//! countdown scaled by the requested transition speed, and the owner
//! resumes it with [`EquipStateMachine::update`]. A transition request
//! arriving while a wait is pending supersedes it: the wait is cancelled
//! outright and the new sequence begins immediately.

use haft_core::signal::{Signal, SubscriberId};
use haft_core::timer::Countdown;

use crate::config::{EquipConfig, SharedEquipConfig};
use crate::services::{BodyPart, CueAnchor, EquipContext};
use crate::states::{EquipState, TransitionTable};

/// Fired exactly once per committed transition, after the entered
/// state's sequence begins. It marks the commit point, not the visual
/// completion: a transient state's wait may still be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    /// The state that was entered
    pub state: EquipState,
    /// The state that was left
    pub previous: EquipState,
}

/// Four-state cooperative equip controller.
pub struct EquipStateMachine {
    state: EquipState,
    table: TransitionTable,
    config: SharedEquipConfig,
    pending: Option<Countdown>,
    changed: Signal<StateChanged>,
}

impl EquipStateMachine {
    /// Create a machine in `Hidden` with the default transition cycle.
    pub fn new(config: SharedEquipConfig) -> Self {
        Self {
            state: EquipState::Hidden,
            table: TransitionTable::default(),
            config,
            pending: None,
            changed: Signal::new(),
        }
    }

    /// Replace the transition table
    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// The active state
    pub fn state(&self) -> EquipState {
        self.state
    }

    /// Check if an enter-wait is still running
    pub fn in_transition(&self) -> bool {
        self.pending.is_some()
    }

    /// Progress of the pending wait in `[0, 1]`, or 1 when none
    pub fn transition_progress(&self) -> f32 {
        self.pending.map(|c| c.progress()).unwrap_or(1.0)
    }

    /// Subscribe to committed transitions
    pub fn on_state_changed<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&StateChanged) + 'static,
    {
        self.changed.subscribe(handler)
    }

    /// Remove a subscription
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// Request a transition.
    ///
    /// A no-op returning false when the table forbids the move: no state
    /// mutation, no event. Otherwise: cancel any pending wait, re-read
    /// the live configuration, run the current state's exit actions,
    /// switch, run the target's enter actions (cue, animation, scaled
    /// countdown) and fire [`StateChanged`] once. Speeds at or below
    /// zero are treated as 1.
    pub fn transition_to(&mut self, target: EquipState, ctx: &EquipContext<'_>, speed: f32) -> bool {
        if !self.table.is_allowed(self.state, target) {
            log::trace!("equip: {:?} -> {:?} rejected", self.state, target);
            return false;
        }

        // A superseding request cancels the pending wait outright.
        self.pending = None;

        let config = self.config.read().clone();
        let speed = if speed > 0.0 { speed } else { 1.0 };

        let previous = self.state;
        self.exit_state(ctx);
        self.state = target;
        self.enter_state(&config, ctx, speed);

        log::debug!("equip: {:?} -> {:?} (speed {})", previous, target, speed);
        self.changed.emit(&StateChanged {
            state: target,
            previous,
        });
        true
    }

    /// Resume the pending wait with the per-step clock.
    ///
    /// Returns the state whose enter-wait just finished; the caller (the
    /// external driver) decides the follow-up transition.
    pub fn update(&mut self, dt: f32) -> Option<EquipState> {
        let timer = self.pending.as_mut()?;
        if timer.tick(dt) {
            self.pending = None;
            Some(self.state)
        } else {
            None
        }
    }

    fn exit_state(&mut self, ctx: &EquipContext<'_>) {
        match self.state {
            EquipState::Equipped => ctx.animation.set_bool("equipped", false),
            EquipState::Hidden | EquipState::Equipping | EquipState::Holstering => {}
        }
    }

    fn enter_state(&mut self, config: &EquipConfig, ctx: &EquipContext<'_>, speed: f32) {
        match self.state {
            EquipState::Hidden => {}
            EquipState::Equipping => {
                ctx.audio.play_cue(
                    &config.equip_cue,
                    CueAnchor::BodyPart(BodyPart::Hands),
                    config.cue_volume,
                );
                ctx.animation.play("equip");
                ctx.animation.set_float("equip_speed", speed);
                self.pending = Some(Countdown::start(config.equip_duration / speed));
            }
            EquipState::Equipped => ctx.animation.set_bool("equipped", true),
            EquipState::Holstering => {
                ctx.audio.play_cue(
                    &config.holster_cue,
                    CueAnchor::BodyPart(BodyPart::Hip),
                    config.cue_volume,
                );
                ctx.animation.play("holster");
                ctx.animation.set_float("equip_speed", speed);
                self.pending = Some(Countdown::start(config.holster_duration / speed));
            }
        }
    }
}

impl std::fmt::Debug for EquipStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquipStateMachine")
            .field("state", &self.state)
            .field("in_transition", &self.in_transition())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{RecordingAnimation, RecordingAudio};
    use crate::services::NullAnimation;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn machine() -> EquipStateMachine {
        EquipStateMachine::new(EquipConfig::new(0.4, 0.3).shared())
    }

    #[test]
    fn test_illegal_transition_is_a_noop() {
        let audio = RecordingAudio::default();
        let anim = NullAnimation;
        let ctx = EquipContext::new(&audio, &anim);
        let mut machine = machine();

        let events = Rc::new(RefCell::new(0));
        let e = events.clone();
        machine.on_state_changed(move |_| *e.borrow_mut() += 1);

        // Hidden -> Equipped is not in the default table.
        assert!(!machine.transition_to(EquipState::Equipped, &ctx, 1.0));
        assert_eq!(machine.state(), EquipState::Hidden);
        assert_eq!(*events.borrow(), 0);
        assert!(audio.cues.borrow().is_empty());
    }

    #[test]
    fn test_speed_scales_the_wait() {
        // Configured 0.4s at speed 2.0 waits 0.2s.
        let audio = RecordingAudio::default();
        let anim = NullAnimation;
        let ctx = EquipContext::new(&audio, &anim);
        let mut machine = machine();

        assert!(machine.transition_to(EquipState::Equipping, &ctx, 2.0));
        assert!(machine.in_transition());

        assert_eq!(machine.update(0.19), None);
        assert_eq!(machine.update(0.02), Some(EquipState::Equipping));
        assert!(!machine.in_transition());

        // External driver completes the handover.
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        machine.on_state_changed(move |c: &StateChanged| e.borrow_mut().push(c.state));
        assert!(machine.transition_to(EquipState::Equipped, &ctx, 1.0));
        assert_eq!(events.borrow().as_slice(), &[EquipState::Equipped]);
    }

    #[test]
    fn test_new_request_supersedes_pending_wait() {
        // Mid-Holstering, a fresh Equipping request cancels the wait.
        let audio = RecordingAudio::default();
        let anim = RecordingAnimation::default();
        let ctx = EquipContext::new(&audio, &anim);
        let table = TransitionTable::default().allowing(EquipState::Holstering, EquipState::Equipping);
        let mut machine =
            EquipStateMachine::new(EquipConfig::new(0.4, 0.3).shared()).with_table(table);

        machine.transition_to(EquipState::Equipping, &ctx, 1.0);
        machine.update(0.5);
        machine.transition_to(EquipState::Equipped, &ctx, 1.0);
        machine.transition_to(EquipState::Holstering, &ctx, 1.0);
        machine.update(0.1); // holster wait still pending

        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        machine.on_state_changed(move |c: &StateChanged| e.borrow_mut().push(c.state));

        assert!(machine.transition_to(EquipState::Equipping, &ctx, 1.0));
        assert_eq!(machine.state(), EquipState::Equipping);
        assert_eq!(events.borrow().as_slice(), &[EquipState::Equipping]);

        // The cancelled holster wait never completes; only the new
        // equip wait does.
        assert_eq!(machine.update(0.15), None);
        assert_eq!(machine.update(0.3), Some(EquipState::Equipping));
    }

    #[test]
    fn test_live_config_reread_at_entry() {
        let audio = RecordingAudio::default();
        let anim = NullAnimation;
        let ctx = EquipContext::new(&audio, &anim);
        let shared = EquipConfig::new(0.4, 0.3).shared();
        let mut machine = EquipStateMachine::new(shared.clone());

        machine.transition_to(EquipState::Equipping, &ctx, 1.0);

        // Editing mid-wait does not stretch the pending countdown.
        shared.write().equip_duration = 2.0;
        assert_eq!(machine.update(0.4), Some(EquipState::Equipping));

        // The next equip uses the edited duration.
        machine.transition_to(EquipState::Equipped, &ctx, 1.0);
        machine.transition_to(EquipState::Holstering, &ctx, 1.0);
        machine.update(0.3);
        machine.transition_to(EquipState::Hidden, &ctx, 1.0);
        machine.transition_to(EquipState::Equipping, &ctx, 1.0);
        assert_eq!(machine.update(0.5), None);
        assert_eq!(machine.update(1.5), Some(EquipState::Equipping));
    }

    #[test]
    fn test_cues_fire_on_transient_entries() {
        let audio = RecordingAudio::default();
        let anim = RecordingAnimation::default();
        let ctx = EquipContext::new(&audio, &anim);
        let mut machine = machine();

        machine.transition_to(EquipState::Equipping, &ctx, 1.0);
        machine.update(0.4);
        machine.transition_to(EquipState::Equipped, &ctx, 1.0);
        machine.transition_to(EquipState::Holstering, &ctx, 1.0);

        assert_eq!(audio.cues.borrow().as_slice(), &["equip", "holster"]);
        assert_eq!(anim.clips.borrow().as_slice(), &["equip", "holster"]);
    }

    #[test]
    fn test_zero_duration_completes_on_next_update() {
        // Instant equip: a 0.0 duration is a valid authoring value and
        // must not leave the machine waiting forever.
        let audio = RecordingAudio::default();
        let anim = NullAnimation;
        let ctx = EquipContext::new(&audio, &anim);
        let mut machine = EquipStateMachine::new(EquipConfig::new(0.0, 0.3).shared());

        assert!(machine.transition_to(EquipState::Equipping, &ctx, 1.0));
        assert!(machine.in_transition());

        assert_eq!(machine.update(0.1), Some(EquipState::Equipping));
        assert!(!machine.in_transition());
        assert!(machine.transition_to(EquipState::Equipped, &ctx, 1.0));
    }

    #[test]
    fn test_non_positive_speed_falls_back_to_one() {
        let audio = RecordingAudio::default();
        let anim = NullAnimation;
        let ctx = EquipContext::new(&audio, &anim);
        let mut machine = machine();

        machine.transition_to(EquipState::Equipping, &ctx, 0.0);
        assert_eq!(machine.update(0.39), None);
        assert_eq!(machine.update(0.01), Some(EquipState::Equipping));
    }
}
