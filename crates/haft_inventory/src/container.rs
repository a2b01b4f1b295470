//! Fixed-capacity slot storage with tag and weight constraints

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use haft_core::signal::{Signal, SubscriberId};
use serde::{Deserialize, Serialize};

use crate::item::{ItemDefinition, ItemStack};
use crate::registry::ItemRegistry;
use crate::slot::{ContainerId, SlotRef};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Why an add was fully or partially rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Not enough slot capacity for the full amount
    ContainerFull,
    /// The weight limit stopped part or all of the amount
    WeightExceeded,
    /// The container's tag filter does not accept the item
    TagMismatch,
    /// No container in the inventory accepts the item
    NoAcceptingContainer,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContainerFull => write!(f, "container full"),
            Self::WeightExceeded => write!(f, "weight limit exceeded"),
            Self::TagMismatch => write!(f, "tag filter mismatch"),
            Self::NoAcceptingContainer => write!(f, "no accepting container"),
        }
    }
}

/// What changed about a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChangeKind {
    /// The slot's item identity changed (filled, cleared, or replaced)
    ItemChanged,
    /// Only the quantity changed
    StackChanged,
}

/// Per-slot change notification.
///
/// Exactly one fires per affected slot per mutation, after the mutation
/// is applied, in slot-index order, before the mutating call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChanged {
    /// The affected slot
    pub slot: SlotRef,
    /// Change kind
    pub kind: SlotChangeKind,
}

/// Result of an add operation.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// Amount actually placed, in `[0, requested]`
    pub added: u32,
    /// Present when the amount was fully or partially rejected
    pub rejection: Option<RejectReason>,
    /// Slot changes the operation produced, in slot-index order
    pub changes: Vec<SlotChanged>,
}

impl AddOutcome {
    fn noop() -> Self {
        Self {
            added: 0,
            rejection: None,
            changes: Vec::new(),
        }
    }

    fn rejected(reason: RejectReason) -> Self {
        Self {
            added: 0,
            rejection: Some(reason),
            changes: Vec::new(),
        }
    }

    /// Check if the full requested amount was placed
    pub fn is_complete(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Result of a remove operation.
#[derive(Debug, Clone)]
pub struct RemoveOutcome {
    /// Amount actually removed (may be less than requested)
    pub removed: u32,
    /// Slot changes the operation produced, in slot-index order
    pub changes: Vec<SlotChanged>,
}

/// Serializable content snapshot for an external serializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Container name
    pub name: String,
    /// Slot contents
    pub slots: Vec<Option<ItemStack>>,
}

/// Fixed-capacity slot storage.
///
/// Optionally restricted by a tag filter (which item tags it accepts) and
/// a maximum carried weight. After any successful mutation the sum of
/// occupied-slot weights stays within the limit; the check is prospective,
/// so no placement is ever rolled back.
pub struct Container {
    id: ContainerId,
    name: String,
    slots: Vec<Option<ItemStack>>,
    /// Accepted item tags (empty = accepts everything)
    accepted_tags: Vec<String>,
    /// Maximum weight (0 = unlimited)
    max_weight: f32,
    registry: Arc<ItemRegistry>,
    changed: Signal<SlotChanged>,
}

impl Container {
    /// Create a container with a fixed slot count.
    pub fn new(name: impl Into<String>, capacity: usize, registry: Arc<ItemRegistry>) -> Self {
        Self {
            id: ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            slots: vec![None; capacity],
            accepted_tags: Vec::new(),
            max_weight: 0.0,
            registry,
            changed: Signal::new(),
        }
    }

    /// Set the maximum carried weight
    pub fn with_max_weight(mut self, weight: f32) -> Self {
        self.max_weight = weight;
        self
    }

    /// Restrict the container to items carrying `tag`
    pub fn with_accepted_tag(mut self, tag: impl Into<String>) -> Self {
        self.accepted_tags.push(tag.into());
        self
    }

    /// Container identity
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot count
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of empty slots
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.used_slots()
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    /// Check if every slot is empty
    pub fn is_empty(&self) -> bool {
        self.used_slots() == 0
    }

    /// Maximum weight (0 = unlimited)
    pub fn max_weight(&self) -> f32 {
        self.max_weight
    }

    /// Stack at a slot index, if occupied
    pub fn stack_at(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index)?.as_ref()
    }

    /// Handle to a slot.
    ///
    /// Panics on an out-of-range index: constructing such a handle is a
    /// wiring bug, not a domain outcome.
    pub fn slot_ref(&self, index: usize) -> SlotRef {
        assert!(
            index < self.capacity(),
            "slot index {} out of range for container '{}' (capacity {})",
            index,
            self.name,
            self.capacity()
        );
        SlotRef::new(self.id, index)
    }

    /// First slot whose stack matches the predicate
    pub fn get_slot<P>(&self, predicate: P) -> Option<SlotRef>
    where
        P: Fn(&ItemStack) -> bool,
    {
        self.slots
            .iter()
            .position(|s| s.as_ref().map(&predicate).unwrap_or(false))
            .map(|index| SlotRef::new(self.id, index))
    }

    /// Total quantity across slots matching the predicate
    pub fn count_where<P>(&self, predicate: P) -> u32
    where
        P: Fn(&ItemStack) -> bool,
    {
        self.slots
            .iter()
            .flatten()
            .filter(|s| predicate(*s))
            .map(|s| s.quantity)
            .sum()
    }

    /// Total quantity of one definition
    pub fn count_item(&self, def_id: &str) -> u32 {
        self.count_where(|s| s.def_id() == def_id)
    }

    /// Sum of occupied-slot weights
    pub fn total_weight(&self) -> f32 {
        self.slots
            .iter()
            .flatten()
            .map(|s| self.registry.unit_weight(s.def_id()) * s.quantity as f32)
            .sum()
    }

    /// Check if the tag filter accepts a definition
    pub fn accepts(&self, def: &ItemDefinition) -> bool {
        self.accepted_tags.is_empty() || self.accepted_tags.iter().any(|t| def.has_tag(t))
    }

    /// Iterate over occupied slots
    pub fn stacks(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|stack| (i, stack)))
    }

    /// Raw slot contents (snapshot accessor)
    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// Subscribe to per-slot change events
    pub fn on_slot_changed<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&SlotChanged) + 'static,
    {
        self.changed.subscribe(handler)
    }

    /// Remove a slot-change subscription
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// Add a stack to the container.
    ///
    /// Merges into slots already holding a mergeable stack of the same
    /// definition in index order, then fills empty slots in index order.
    /// Never fails hard for "no space": the outcome carries the amount
    /// actually placed and a reason when any of it was rejected. Tag and
    /// weight constraints are checked for the whole call before any slot
    /// is touched.
    ///
    /// Panics if the stack references an unknown item definition.
    pub fn add_item(&mut self, stack: ItemStack) -> AddOutcome {
        let requested = stack.quantity;
        if requested == 0 {
            return AddOutcome::noop();
        }

        let def = self
            .registry
            .get(stack.def_id())
            .unwrap_or_else(|| panic!("unknown item definition '{}'", stack.def_id()))
            .clone();

        if !self.accepts(&def) {
            return AddOutcome::rejected(RejectReason::TagMismatch);
        }

        // Prospective fit: capacity by merge space plus empty slots,
        // weight by the remaining budget, both for the whole call.
        let merge_space: u64 = self
            .slots
            .iter()
            .flatten()
            .filter(|s| s.can_merge(&stack))
            .map(|s| def.max_stack.saturating_sub(s.quantity) as u64)
            .sum();
        let empty_slots = self.slots.iter().filter(|s| s.is_none()).count() as u64;
        let capacity_fit =
            (merge_space + empty_slots * def.max_stack as u64).min(requested as u64) as u32;

        let weight_fit = if self.max_weight > 0.0 && def.unit_weight > 0.0 {
            let budget = self.max_weight - self.total_weight();
            if budget <= 0.0 {
                0
            } else {
                (budget / def.unit_weight) as u32
            }
        } else {
            u32::MAX
        };

        let to_place = requested.min(capacity_fit).min(weight_fit);
        let rejection = if to_place == requested {
            None
        } else if capacity_fit < requested && capacity_fit <= weight_fit {
            Some(RejectReason::ContainerFull)
        } else {
            Some(RejectReason::WeightExceeded)
        };

        if to_place == 0 {
            return AddOutcome {
                added: 0,
                rejection,
                changes: Vec::new(),
            };
        }

        let mut remaining = to_place;
        let mut changes = Vec::new();

        // (a) merge into existing stacks, index order
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if remaining == 0 {
                break;
            }
            if let Some(existing) = slot {
                if existing.can_merge(&stack) && existing.quantity < def.max_stack {
                    let overflow = existing.add(remaining, def.max_stack);
                    if overflow < remaining {
                        changes.push(SlotChanged {
                            slot: SlotRef::new(self.id, index),
                            kind: SlotChangeKind::StackChanged,
                        });
                    }
                    remaining = overflow;
                }
            }
        }

        // (b) place the remainder into empty slots, index order
        for index in 0..self.slots.len() {
            if remaining == 0 {
                break;
            }
            if self.slots[index].is_none() {
                let amount = remaining.min(def.max_stack);
                self.slots[index] = Some(ItemStack::new(stack.item.clone(), amount));
                changes.push(SlotChanged {
                    slot: SlotRef::new(self.id, index),
                    kind: SlotChangeKind::ItemChanged,
                });
                remaining -= amount;
            }
        }
        debug_assert_eq!(remaining, 0);

        changes.sort_by_key(|c| c.slot.index);
        for change in &changes {
            self.changed.emit(change);
        }

        log::debug!(
            "container '{}': added {}/{} x '{}' ({:?})",
            self.name,
            to_place,
            requested,
            stack.def_id(),
            rejection
        );

        AddOutcome {
            added: to_place,
            rejection,
            changes,
        }
    }

    /// Remove up to `amount` items from slots matching the predicate.
    ///
    /// Scans in index order, decrementing quantities and clearing slots
    /// that reach zero, until the amount is satisfied or no matches
    /// remain. Returns the amount actually removed.
    pub fn remove_items<P>(&mut self, predicate: P, amount: u32) -> RemoveOutcome
    where
        P: Fn(&ItemStack) -> bool,
    {
        let mut remaining = amount;
        let mut changes = Vec::new();

        for index in 0..self.slots.len() {
            if remaining == 0 {
                break;
            }
            if let Some(stack) = &mut self.slots[index] {
                if predicate(stack) {
                    let removed = stack.remove(remaining);
                    if removed == 0 {
                        continue;
                    }
                    remaining -= removed;
                    let kind = if stack.is_empty() {
                        self.slots[index] = None;
                        SlotChangeKind::ItemChanged
                    } else {
                        SlotChangeKind::StackChanged
                    };
                    changes.push(SlotChanged {
                        slot: SlotRef::new(self.id, index),
                        kind,
                    });
                }
            }
        }

        for change in &changes {
            self.changed.emit(change);
        }

        let removed = amount - remaining;
        if removed > 0 {
            log::debug!("container '{}': removed {} item(s)", self.name, removed);
        }

        RemoveOutcome { removed, changes }
    }

    /// Remove up to `amount` of one definition
    pub fn remove_item(&mut self, def_id: &str, amount: u32) -> RemoveOutcome {
        self.remove_items(|s| s.def_id() == def_id, amount)
    }

    /// Take up to `amount` from one slot.
    ///
    /// Takes the whole stack when `amount` covers it, otherwise splits.
    /// Returns the removed stack for the caller to hand elsewhere.
    pub fn remove_from_slot(&mut self, index: usize, amount: u32) -> Option<ItemStack> {
        if index >= self.capacity() || amount == 0 {
            return None;
        }

        let held = self.slots[index].as_ref()?.quantity;
        let (taken, kind) = if amount >= held {
            (self.slots[index].take(), SlotChangeKind::ItemChanged)
        } else {
            let split = self.slots[index].as_mut().and_then(|s| s.split(amount));
            (split, SlotChangeKind::StackChanged)
        };

        if taken.is_some() {
            self.changed.emit(&SlotChanged {
                slot: SlotRef::new(self.id, index),
                kind,
            });
        }
        taken
    }

    /// Clear a slot outright, returning its stack
    pub fn take_slot(&mut self, index: usize) -> Option<ItemStack> {
        if index >= self.capacity() {
            return None;
        }
        let taken = self.slots[index].take();
        if taken.is_some() {
            self.changed.emit(&SlotChanged {
                slot: SlotRef::new(self.id, index),
                kind: SlotChangeKind::ItemChanged,
            });
        }
        taken
    }

    /// Content snapshot for an external serializer
    pub fn snapshot(&self) -> ContainerSnapshot {
        ContainerSnapshot {
            name: self.name.clone(),
            slots: self.slots.clone(),
        }
    }

    /// Restore contents from a snapshot, silently (no events).
    ///
    /// The snapshot is truncated or padded to the container's capacity.
    pub fn restore(&mut self, snapshot: ContainerSnapshot) {
        let capacity = self.capacity();
        let mut slots = snapshot.slots;
        slots.resize(capacity, None);
        self.slots = slots;
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capacity", &self.capacity())
            .field("used", &self.used_slots())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemDefinition};
    use haft_core::id::InstanceIdGen;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn registry() -> Arc<ItemRegistry> {
        let mut registry = ItemRegistry::new();
        registry.register(
            ItemDefinition::new("ration", "Field Ration")
                .with_max_stack(10)
                .with_unit_weight(0.5)
                .with_tag("consumable"),
        );
        registry.register(
            ItemDefinition::new("pistol", "Sidearm")
                .with_unit_weight(1.2)
                .with_tag("handheld"),
        );
        registry.register(ItemDefinition::new("brick", "Brick").with_max_stack(99));
        Arc::new(registry)
    }

    fn stack(ids: &mut InstanceIdGen, def: &str, quantity: u32) -> ItemStack {
        ItemStack::new(Item::new(ids.allocate(), def), quantity)
    }

    #[test]
    fn test_overflow_spills_into_next_slot() {
        // 2-slot container, max stack 10, empty: adding 15 fills 10 + 5.
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 2, registry());

        let outcome = pack.add_item(stack(&mut ids, "ration", 15));

        assert_eq!(outcome.added, 15);
        assert_eq!(outcome.rejection, None);
        assert_eq!(pack.stack_at(0).unwrap().quantity, 10);
        assert_eq!(pack.stack_at(1).unwrap().quantity, 5);
    }

    #[test]
    fn test_full_container_rejects_without_mutation() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 2, registry());
        pack.add_item(stack(&mut ids, "brick", 2 * 99));
        assert!(pack.is_full());

        let before: Vec<_> = pack.slots().to_vec();
        let outcome = pack.add_item(stack(&mut ids, "ration", 1));

        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.rejection, Some(RejectReason::ContainerFull));
        assert!(outcome.changes.is_empty());
        assert_eq!(pack.slots(), before.as_slice());
    }

    #[test]
    fn test_partial_fill_reports_container_full() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 1, registry());

        let outcome = pack.add_item(stack(&mut ids, "ration", 15));

        assert_eq!(outcome.added, 10);
        assert_eq!(outcome.rejection, Some(RejectReason::ContainerFull));
    }

    #[test]
    fn test_zero_quantity_is_noop() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 2, registry());

        let outcome = pack.add_item(stack(&mut ids, "ration", 0));

        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.rejection, None);
        assert!(pack.is_empty());
    }

    #[test]
    fn test_weight_limit_caps_the_portion() {
        // 0.5 each, limit 3.0: only 6 of 10 fit.
        let mut ids = InstanceIdGen::new();
        let mut pouch = Container::new("pouch", 4, registry()).with_max_weight(3.0);

        let outcome = pouch.add_item(stack(&mut ids, "ration", 10));

        assert_eq!(outcome.added, 6);
        assert_eq!(outcome.rejection, Some(RejectReason::WeightExceeded));
        assert!(pouch.total_weight() <= pouch.max_weight());

        // Budget spent: the next add places nothing and mutates nothing.
        let outcome = pouch.add_item(stack(&mut ids, "ration", 1));
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.rejection, Some(RejectReason::WeightExceeded));
    }

    #[test]
    fn test_tag_filter_rejects() {
        let mut ids = InstanceIdGen::new();
        let mut holster = Container::new("holster", 2, registry()).with_accepted_tag("handheld");

        let refused = holster.add_item(stack(&mut ids, "ration", 1));
        assert_eq!(refused.rejection, Some(RejectReason::TagMismatch));
        assert_eq!(refused.added, 0);

        let accepted = holster.add_item(stack(&mut ids, "pistol", 1));
        assert_eq!(accepted.added, 1);
        assert_eq!(accepted.rejection, None);
    }

    #[test]
    fn test_merge_prefers_existing_stacks() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 3, registry());
        pack.add_item(stack(&mut ids, "ration", 7));

        let outcome = pack.add_item(stack(&mut ids, "ration", 5));

        assert_eq!(outcome.added, 5);
        // 3 merged into slot 0, 2 into slot 1
        assert_eq!(pack.stack_at(0).unwrap().quantity, 10);
        assert_eq!(pack.stack_at(1).unwrap().quantity, 2);
        assert_eq!(
            outcome.changes[0].kind,
            SlotChangeKind::StackChanged
        );
        assert_eq!(outcome.changes[1].kind, SlotChangeKind::ItemChanged);
    }

    #[test]
    fn test_events_fire_once_per_slot_in_index_order() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 3, registry());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        pack.on_slot_changed(move |c| sink.borrow_mut().push((c.slot.index, c.kind)));

        pack.add_item(stack(&mut ids, "ration", 25));

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                (0, SlotChangeKind::ItemChanged),
                (1, SlotChangeKind::ItemChanged),
                (2, SlotChangeKind::ItemChanged),
            ]
        );
    }

    #[test]
    fn test_remove_items_scans_in_index_order() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 3, registry());
        pack.add_item(stack(&mut ids, "ration", 25));

        let outcome = pack.remove_items(|s| s.def_id() == "ration", 12);

        assert_eq!(outcome.removed, 12);
        // Slot 0 cleared (10), slot 1 decremented (2 of 10)
        assert!(pack.stack_at(0).is_none());
        assert_eq!(pack.stack_at(1).unwrap().quantity, 8);
        assert_eq!(outcome.changes[0].kind, SlotChangeKind::ItemChanged);
        assert_eq!(outcome.changes[1].kind, SlotChangeKind::StackChanged);
    }

    #[test]
    fn test_remove_more_than_held() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 2, registry());
        pack.add_item(stack(&mut ids, "ration", 4));

        let outcome = pack.remove_item("ration", 10);

        assert_eq!(outcome.removed, 4);
        assert!(pack.is_empty());
    }

    #[test]
    fn test_get_slot_first_match() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 3, registry());
        pack.add_item(stack(&mut ids, "ration", 10));
        pack.add_item(stack(&mut ids, "pistol", 1));

        let slot = pack.get_slot(|s| s.def_id() == "pistol").unwrap();
        assert_eq!(slot.index, 1);
        assert_eq!(slot.container, pack.id());
        assert!(pack.get_slot(|s| s.def_id() == "brick").is_none());
    }

    #[test]
    fn test_remove_from_slot_splits_or_takes() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 2, registry());
        pack.add_item(stack(&mut ids, "ration", 10));

        let part = pack.remove_from_slot(0, 4).unwrap();
        assert_eq!(part.quantity, 4);
        assert_eq!(pack.stack_at(0).unwrap().quantity, 6);

        let rest = pack.remove_from_slot(0, 100).unwrap();
        assert_eq!(rest.quantity, 6);
        assert!(pack.stack_at(0).is_none());
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 3, registry());
        pack.add_item(stack(&mut ids, "ration", 12));

        // Through the wire format the external serializer would use.
        let json = serde_json::to_string(&pack.snapshot()).unwrap();
        pack.remove_item("ration", 12);
        assert!(pack.is_empty());

        pack.restore(serde_json::from_str(&json).unwrap());
        assert_eq!(pack.count_item("ration"), 12);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_slot_ref_out_of_range_panics() {
        let pack = Container::new("pack", 2, registry());
        let _ = pack.slot_ref(2);
    }

    #[test]
    #[should_panic(expected = "unknown item definition")]
    fn test_unknown_definition_panics() {
        let mut ids = InstanceIdGen::new();
        let mut pack = Container::new("pack", 2, registry());
        pack.add_item(stack(&mut ids, "mystery", 1));
    }
}
