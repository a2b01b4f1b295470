//! Handheld selection within a loadout container

use std::collections::HashMap;

use haft_core::signal::{Signal, SubscriberId};
use haft_inventory::container::Container;
use haft_inventory::item::Item;

/// Sentinel index meaning "nothing selected".
pub const NO_SELECTION: i32 = -1;

/// Resolves the concrete handheld bound to an item.
///
/// Absence of a mapping simply yields `None`: not every loadout item is
/// a handheld.
pub trait HandheldLookup {
    /// Handheld id for an item, if one is bound
    fn handheld_for(&self, item: &Item) -> Option<String>;
}

/// Definition-id to handheld-id table.
#[derive(Debug, Clone, Default)]
pub struct MapLookup {
    bindings: HashMap<String, String>,
}

impl MapLookup {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a definition id to a handheld id
    pub fn bind(mut self, def_id: impl Into<String>, handheld: impl Into<String>) -> Self {
        self.bindings.insert(def_id.into(), handheld.into());
        self
    }
}

impl HandheldLookup for MapLookup {
    fn handheld_for(&self, item: &Item) -> Option<String> {
        self.bindings.get(&item.def_id).cloned()
    }
}

/// Fired exactly once per selection change (or requip refresh).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChanged {
    /// Index before the change (`-1` = none)
    pub old_index: i32,
    /// Index after the change (`-1` = none)
    pub new_index: i32,
    /// Handheld bound to the old slot's item
    pub old_handheld: Option<String>,
    /// Handheld bound to the new slot's item
    pub new_handheld: Option<String>,
    /// Transition speed requested by the caller
    pub speed: f32,
    /// Simulation time the change committed
    pub time: f32,
}

impl SelectionChanged {
    /// Check if this is a requip refresh (same slot re-selected)
    pub fn is_refresh(&self) -> bool {
        self.old_index == self.new_index
    }
}

/// Validator clamping a requested index into the legal range.
pub type IndexValidator = Box<dyn Fn(i32, usize) -> i32>;

fn clamp_validator(index: i32, capacity: usize) -> i32 {
    index.clamp(NO_SELECTION, (capacity as i32 - 1).max(NO_SELECTION))
}

/// Tracks the selected and previous slot index within the loadout.
///
/// The selector never mutates the loadout; it observes it to resolve
/// which handheld the selected item binds to.
pub struct HandheldSelector {
    selected: i32,
    previous: i32,
    validator: IndexValidator,
    changed: Signal<SelectionChanged>,
    time: f32,
}

impl HandheldSelector {
    /// Create a selector with nothing selected.
    pub fn new() -> Self {
        Self {
            selected: NO_SELECTION,
            previous: NO_SELECTION,
            validator: Box::new(clamp_validator),
            changed: Signal::new(),
            time: 0.0,
        }
    }

    /// Replace the index validator
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(i32, usize) -> i32 + 'static,
    {
        self.validator = Box::new(validator);
        self
    }

    /// Currently selected index (`-1` = none)
    pub fn selected_index(&self) -> i32 {
        self.selected
    }

    /// Previously selected index (`-1` = none)
    pub fn previous_index(&self) -> i32 {
        self.previous
    }

    /// Advance the selector's clock (event timestamps)
    pub fn tick(&mut self, dt: f32) {
        self.time += dt;
    }

    /// Subscribe to selection changes
    pub fn on_selection_changed<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&SelectionChanged) + 'static,
    {
        self.changed.subscribe(handler)
    }

    /// Remove a subscription
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// Select a loadout slot.
    ///
    /// The index is clamped by the validator first. Re-selecting the
    /// current index fires a refresh event when `allow_requip` is set
    /// (unchanged old/new index, used to replay equip visuals) and
    /// returns false either way. A different index updates
    /// previous/selected atomically and fires exactly one
    /// [`SelectionChanged`].
    pub fn select_at_index(
        &mut self,
        loadout: &Container,
        lookup: &dyn HandheldLookup,
        index: i32,
        allow_requip: bool,
        speed: f32,
    ) -> bool {
        let index = (self.validator)(index, loadout.capacity());

        if index == self.selected {
            if allow_requip {
                let handheld = self.resolve(loadout, lookup, index);
                log::debug!("selector: requip refresh at {}", index);
                self.changed.emit(&SelectionChanged {
                    old_index: index,
                    new_index: index,
                    old_handheld: handheld.clone(),
                    new_handheld: handheld,
                    speed,
                    time: self.time,
                });
            }
            return false;
        }

        let old_index = self.selected;
        let old_handheld = self.resolve(loadout, lookup, old_index);
        let new_handheld = self.resolve(loadout, lookup, index);

        self.previous = old_index;
        self.selected = index;

        log::debug!("selector: {} -> {}", old_index, index);
        self.changed.emit(&SelectionChanged {
            old_index,
            new_index: index,
            old_handheld,
            new_handheld,
            speed,
            time: self.time,
        });
        true
    }

    /// Select the sentinel `-1`.
    ///
    /// A normal selection change with the same single-fire guarantee:
    /// nothing fires when nothing was selected.
    pub fn reset_selection(
        &mut self,
        loadout: &Container,
        lookup: &dyn HandheldLookup,
        speed: f32,
    ) -> bool {
        self.select_at_index(loadout, lookup, NO_SELECTION, false, speed)
    }

    /// Restore persisted indices silently (no event). The external
    /// serializer owns the file format; this is the load hook.
    pub fn load_state(&mut self, selected: i32, previous: i32) {
        self.selected = selected.max(NO_SELECTION);
        self.previous = previous.max(NO_SELECTION);
    }

    fn resolve(
        &self,
        loadout: &Container,
        lookup: &dyn HandheldLookup,
        index: i32,
    ) -> Option<String> {
        if index < 0 {
            return None;
        }
        let stack = loadout.stack_at(index as usize)?;
        lookup.handheld_for(&stack.item)
    }
}

impl Default for HandheldSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandheldSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandheldSelector")
            .field("selected", &self.selected)
            .field("previous", &self.previous)
            .finish()
    }
}
