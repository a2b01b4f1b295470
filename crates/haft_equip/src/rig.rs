//! Composition of loadout, selector and equip machine
//!
//! The rig is the explicitly constructed object that wires a loadout
//! container, a [`HandheldSelector`] and an [`EquipStateMachine`]
//! together. There is no ambient singleton: whoever owns the holder
//! builds a rig and passes its dependencies in.

use haft_inventory::container::{Container, SlotChangeKind, SlotChanged};
use thiserror::Error;

use crate::config::SharedEquipConfig;
use crate::machine::EquipStateMachine;
use crate::selector::{HandheldLookup, HandheldSelector};
use crate::services::EquipContext;
use crate::states::{EquipState, TransitionTable};

/// Wiring errors caught at construction.
#[derive(Debug, Error)]
pub enum RigError {
    /// No equip configuration was provided
    #[error("rig built without an equip configuration")]
    MissingConfig,
    /// No item-to-handheld lookup was provided
    #[error("rig built without a handheld lookup")]
    MissingLookup,
}

/// Builder for [`HandheldRig`].
///
/// Both the configuration and the lookup are required; a rig without
/// them is a wiring bug surfaced at build time, not at first use.
#[derive(Default)]
pub struct RigBuilder {
    config: Option<SharedEquipConfig>,
    lookup: Option<Box<dyn HandheldLookup>>,
    table: Option<TransitionTable>,
}

impl RigBuilder {
    /// Set the shared equip configuration
    pub fn config(mut self, config: SharedEquipConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the item-to-handheld lookup
    pub fn lookup(mut self, lookup: impl HandheldLookup + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    /// Override the machine's transition table
    pub fn table(mut self, table: TransitionTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Build the rig, validating required dependencies.
    pub fn build(self) -> Result<HandheldRig, RigError> {
        let config = self.config.ok_or(RigError::MissingConfig)?;
        let lookup = self.lookup.ok_or(RigError::MissingLookup)?;
        let table = self.table.unwrap_or_else(HandheldRig::interruptible_table);

        Ok(HandheldRig {
            selector: HandheldSelector::new(),
            machine: EquipStateMachine::new(config).with_table(table),
            lookup,
            queued_speed: None,
        })
    }
}

/// Handheld holder: selector plus equip machine, driven as one unit.
///
/// Selection changes holster the active handheld, then equip the newly
/// selected one once the holster wait completes; a fresh selection
/// arriving mid-holster interrupts the wait and equips immediately.
pub struct HandheldRig {
    selector: HandheldSelector,
    machine: EquipStateMachine,
    lookup: Box<dyn HandheldLookup>,
    /// Speed to equip the queued selection with, once holstered
    queued_speed: Option<f32>,
}

impl HandheldRig {
    /// Start building a rig.
    pub fn builder() -> RigBuilder {
        RigBuilder::default()
    }

    /// The default cycle plus the interrupts the rig relies on:
    /// a new selection may abort an in-flight equip or holster.
    pub fn interruptible_table() -> TransitionTable {
        TransitionTable::default()
            .allowing(EquipState::Holstering, EquipState::Equipping)
            .allowing(EquipState::Equipping, EquipState::Holstering)
    }

    /// The selector (for subscriptions and queries)
    pub fn selector(&self) -> &HandheldSelector {
        &self.selector
    }

    /// Mutable selector access (subscriptions)
    pub fn selector_mut(&mut self) -> &mut HandheldSelector {
        &mut self.selector
    }

    /// The equip machine (for subscriptions and queries)
    pub fn machine(&self) -> &EquipStateMachine {
        &self.machine
    }

    /// Mutable machine access (subscriptions)
    pub fn machine_mut(&mut self) -> &mut EquipStateMachine {
        &mut self.machine
    }

    /// Active equip state
    pub fn state(&self) -> EquipState {
        self.machine.state()
    }

    /// Select a loadout slot and drive the equip chain.
    ///
    /// Returns whether the selection actually changed. A requip refresh
    /// (same index, `allow_requip` set) re-fires the selector event for
    /// visual layers but does not restart the machine.
    pub fn select(
        &mut self,
        loadout: &Container,
        index: i32,
        allow_requip: bool,
        speed: f32,
        ctx: &EquipContext<'_>,
    ) -> bool {
        let changed =
            self.selector
                .select_at_index(loadout, self.lookup.as_ref(), index, allow_requip, speed);
        if changed {
            self.apply_selection(loadout, speed, ctx);
        }
        changed
    }

    /// Clear the selection (holsters the active handheld).
    pub fn reset_selection(&mut self, loadout: &Container, speed: f32, ctx: &EquipContext<'_>) {
        if self
            .selector
            .reset_selection(loadout, self.lookup.as_ref(), speed)
        {
            self.apply_selection(loadout, speed, ctx);
        }
    }

    /// React to a loadout slot change.
    ///
    /// The selected slot being emptied resets the selection (holsters);
    /// a new item appearing under the selection replays the equip chain
    /// with a requip refresh. Quantity-only changes leave the binding
    /// alone.
    pub fn handle_slot_change(
        &mut self,
        loadout: &Container,
        change: &SlotChanged,
        ctx: &EquipContext<'_>,
    ) {
        if change.slot.container != loadout.id() {
            return;
        }
        let selected = self.selector.selected_index();
        if selected < 0 || change.slot.index != selected as usize {
            return;
        }
        if change.kind != SlotChangeKind::ItemChanged {
            return;
        }

        if loadout.stack_at(selected as usize).is_none() {
            log::debug!("rig: selected slot {} emptied, holstering", selected);
            self.reset_selection(loadout, 1.0, ctx);
        } else {
            log::debug!("rig: selected slot {} rebound, requipping", selected);
            self.selector
                .select_at_index(loadout, self.lookup.as_ref(), selected, true, 1.0);
            self.apply_selection(loadout, 1.0, ctx);
        }
    }

    /// Advance clocks and drive follow-up transitions.
    pub fn update(&mut self, dt: f32, loadout: &Container, ctx: &EquipContext<'_>) {
        self.selector.tick(dt);

        let Some(finished) = self.machine.update(dt) else {
            return;
        };
        match finished {
            EquipState::Equipping => {
                self.machine.transition_to(EquipState::Equipped, ctx, 1.0);
            }
            EquipState::Holstering => {
                self.machine.transition_to(EquipState::Hidden, ctx, 1.0);
                if let Some(speed) = self.queued_speed.take() {
                    if self.selected_handheld(loadout).is_some() {
                        self.machine.transition_to(EquipState::Equipping, ctx, speed);
                    }
                }
            }
            EquipState::Hidden | EquipState::Equipped => {}
        }
    }

    /// Restore persisted selector indices (silent).
    pub fn load_state(&mut self, selected: i32, previous: i32) {
        self.selector.load_state(selected, previous);
    }

    /// Handheld bound to the currently selected slot's item, if any.
    pub fn selected_handheld(&self, loadout: &Container) -> Option<String> {
        let index = self.selector.selected_index();
        if index < 0 {
            return None;
        }
        let stack = loadout.stack_at(index as usize)?;
        self.lookup.handheld_for(&stack.item)
    }

    /// Drive the machine toward the new selection.
    fn apply_selection(&mut self, loadout: &Container, speed: f32, ctx: &EquipContext<'_>) {
        let target = self.selected_handheld(loadout);

        match self.machine.state() {
            EquipState::Hidden => {
                self.queued_speed = None;
                if target.is_some() {
                    self.machine.transition_to(EquipState::Equipping, ctx, speed);
                }
            }
            EquipState::Equipping | EquipState::Equipped => {
                // Put the old one away first; equip the new one when the
                // holster wait completes.
                self.queued_speed = target.is_some().then_some(speed);
                self.machine.transition_to(EquipState::Holstering, ctx, speed);
            }
            EquipState::Holstering => {
                // Interrupt the holster: the pending wait is cancelled
                // and the new equip begins immediately.
                self.queued_speed = None;
                if target.is_some() {
                    self.machine.transition_to(EquipState::Equipping, ctx, speed);
                }
            }
        }
    }
}

impl std::fmt::Debug for HandheldRig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandheldRig")
            .field("selector", &self.selector)
            .field("machine", &self.machine)
            .finish()
    }
}
