//! Container aggregation with routed operations

use std::sync::Arc;

use haft_core::signal::{Signal, SubscriberId};

use crate::container::{AddOutcome, Container, RejectReason, SlotChangeKind, SlotChanged};
use crate::item::{ItemDefinition, ItemStack};
use crate::registry::ItemRegistry;
use crate::slot::{ContainerId, SlotRef};

/// Coarse notification: something in the inventory changed.
///
/// Fires exactly once per top-level operation, no matter how many slots
/// the operation touched. Fine-grained consumers subscribe to the
/// per-slot stream instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryChanged {
    /// The last container the operation touched
    pub container: ContainerId,
}

/// Strategy resolving which container receives an incoming item.
pub trait ContainerRouter {
    /// Index of the target container, or None when nothing accepts it
    fn route(&self, containers: &[Container], def: &ItemDefinition) -> Option<usize>;
}

/// Default routing: the first container whose tag filter accepts the
/// definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagRouter;

impl ContainerRouter for TagRouter {
    fn route(&self, containers: &[Container], def: &ItemDefinition) -> Option<usize> {
        containers.iter().position(|c| c.accepts(def))
    }
}

/// Ordered collection of containers with unified operations.
///
/// Each operation resolves a target container through the router, applies
/// the mutation there, re-fires the affected slots on the aggregate
/// per-slot stream, and then fires one [`InventoryChanged`].
pub struct Inventory {
    containers: Vec<Container>,
    registry: Arc<ItemRegistry>,
    router: Box<dyn ContainerRouter>,
    changed: Signal<InventoryChanged>,
    slot_changed: Signal<SlotChanged>,
}

impl Inventory {
    /// Create an empty inventory with the default tag router.
    pub fn new(registry: Arc<ItemRegistry>) -> Self {
        Self {
            containers: Vec::new(),
            registry,
            router: Box::new(TagRouter),
            changed: Signal::new(),
            slot_changed: Signal::new(),
        }
    }

    /// Replace the routing strategy
    pub fn with_router(mut self, router: impl ContainerRouter + 'static) -> Self {
        self.router = Box::new(router);
        self
    }

    /// Append a container (order matters for routing and scans)
    pub fn with_container(mut self, container: Container) -> Self {
        self.containers.push(container);
        self
    }

    /// Append a container
    pub fn push_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    /// All containers, in order
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Container by identity
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.iter().find(|c| c.id() == id)
    }

    /// Mutable container by identity
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id() == id)
    }

    /// First container matching the predicate
    pub fn get_container<P>(&self, predicate: P) -> Option<&Container>
    where
        P: Fn(&Container) -> bool,
    {
        self.containers.iter().find(|c| predicate(c))
    }

    /// Resolve a slot handle to its stack
    pub fn stack_at(&self, slot: SlotRef) -> Option<&ItemStack> {
        self.container(slot.container)?.stack_at(slot.index)
    }

    /// Aggregated weight across all containers
    pub fn total_weight(&self) -> f32 {
        self.containers.iter().map(|c| c.total_weight()).sum()
    }

    /// Check if any slot matches the predicate
    pub fn contains_item<P>(&self, predicate: P) -> bool
    where
        P: Fn(&ItemStack) -> bool,
    {
        self.containers
            .iter()
            .any(|c| c.get_slot(&predicate).is_some())
    }

    /// Total quantity across all containers matching the predicate
    pub fn count_where<P>(&self, predicate: P) -> u32
    where
        P: Fn(&ItemStack) -> bool,
    {
        self.containers.iter().map(|c| c.count_where(&predicate)).sum()
    }

    /// Subscribe to the debounced per-operation notification
    pub fn on_changed<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&InventoryChanged) + 'static,
    {
        self.changed.subscribe(handler)
    }

    /// Subscribe to the aggregate per-slot stream
    pub fn on_slot_changed<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&SlotChanged) + 'static,
    {
        self.slot_changed.subscribe(handler)
    }

    /// Add a stack, routed to the first accepting container.
    ///
    /// Fails gracefully when nothing accepts the item: the outcome
    /// reports zero added with [`RejectReason::NoAcceptingContainer`].
    pub fn add_item(&mut self, stack: ItemStack) -> AddOutcome {
        if stack.quantity == 0 {
            return AddOutcome {
                added: 0,
                rejection: None,
                changes: Vec::new(),
            };
        }

        let def = self
            .registry
            .get(stack.def_id())
            .unwrap_or_else(|| panic!("unknown item definition '{}'", stack.def_id()))
            .clone();

        let target = match self.router.route(&self.containers, &def) {
            Some(index) => index,
            None => {
                log::debug!("inventory: no container accepts '{}'", stack.def_id());
                return AddOutcome {
                    added: 0,
                    rejection: Some(RejectReason::NoAcceptingContainer),
                    changes: Vec::new(),
                };
            }
        };

        let outcome = self.containers[target].add_item(stack);
        let container = self.containers[target].id();
        self.fan_out(container, &outcome.changes);
        outcome
    }

    /// Remove up to `amount` items matching the predicate, scanning
    /// containers in order. Returns the amount actually removed.
    ///
    /// A remove spanning several containers still counts as one
    /// operation: every affected slot re-fires, then one
    /// [`InventoryChanged`] at the end.
    pub fn remove_items<P>(&mut self, predicate: P, amount: u32) -> u32
    where
        P: Fn(&ItemStack) -> bool,
    {
        let mut remaining = amount;
        let mut touched = None;
        let mut changes = Vec::new();
        for index in 0..self.containers.len() {
            if remaining == 0 {
                break;
            }
            let outcome = self.containers[index].remove_items(&predicate, remaining);
            if outcome.removed > 0 {
                remaining -= outcome.removed;
                touched = Some(self.containers[index].id());
                changes.extend(outcome.changes);
            }
        }
        if let Some(container) = touched {
            self.fan_out(container, &changes);
        }
        amount - remaining
    }

    /// Remove the first matching slot's stack (up to `amount`) and hand
    /// it to the caller, e.g. to spawn a world pickup. Spawning is not
    /// this crate's concern.
    pub fn drop_item<P>(&mut self, predicate: P, amount: u32) -> Option<ItemStack>
    where
        P: Fn(&ItemStack) -> bool,
    {
        let (index, slot) = self
            .containers
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.get_slot(&predicate).map(|slot| (i, slot)))?;

        let taken = self.containers[index].remove_from_slot(slot.index, amount)?;
        let kind = if self.containers[index].stack_at(slot.index).is_none() {
            SlotChangeKind::ItemChanged
        } else {
            SlotChangeKind::StackChanged
        };
        let change = SlotChanged { slot, kind };
        self.fan_out(slot.container, std::slice::from_ref(&change));
        Some(taken)
    }

    /// Re-fire per-slot changes, then the single debounced notification.
    /// An operation that moved nothing stays silent.
    fn fan_out(&self, container: ContainerId, changes: &[SlotChanged]) {
        if changes.is_empty() {
            return;
        }
        for change in changes {
            self.slot_changed.emit(change);
        }
        self.changed.emit(&InventoryChanged { container });
    }
}

impl std::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory")
            .field("containers", &self.containers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemDefinition};
    use crate::registry::ItemRegistry;
    use haft_core::id::InstanceIdGen;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

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
        registry.register(ItemDefinition::new("relic", "Relic").with_tag("quest"));
        Arc::new(registry)
    }

    fn loadout_and_pack() -> Inventory {
        let registry = registry();
        Inventory::new(registry.clone())
            .with_container(Container::new("loadout", 3, registry.clone()).with_accepted_tag("handheld"))
            .with_container(Container::new("backpack", 6, registry).with_accepted_tag("consumable"))
    }

    fn stack(ids: &mut InstanceIdGen, def: &str, quantity: u32) -> ItemStack {
        ItemStack::new(Item::new(ids.allocate(), def), quantity)
    }

    #[test]
    fn test_routing_by_tag() {
        let mut ids = InstanceIdGen::new();
        let mut inventory = loadout_and_pack();

        inventory.add_item(stack(&mut ids, "pistol", 1));
        inventory.add_item(stack(&mut ids, "ration", 5));

        assert_eq!(inventory.containers()[0].count_item("pistol"), 1);
        assert_eq!(inventory.containers()[1].count_item("ration"), 5);
    }

    #[test]
    fn test_no_accepting_container_fails_gracefully() {
        let mut ids = InstanceIdGen::new();
        let mut inventory = loadout_and_pack();

        let outcome = inventory.add_item(stack(&mut ids, "relic", 1));

        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.rejection, Some(RejectReason::NoAcceptingContainer));
        assert!(!inventory.contains_item(|s| s.def_id() == "relic"));
    }

    #[test]
    fn test_one_inventory_changed_per_operation() {
        let mut ids = InstanceIdGen::new();
        let mut inventory = loadout_and_pack();

        let ops = Rc::new(RefCell::new(0));
        let slots = Rc::new(RefCell::new(0));
        let o = ops.clone();
        inventory.on_changed(move |_| *o.borrow_mut() += 1);
        let s = slots.clone();
        inventory.on_slot_changed(move |_| *s.borrow_mut() += 1);

        // 25 rations span three slots but count as one operation.
        inventory.add_item(stack(&mut ids, "ration", 25));

        assert_eq!(*ops.borrow(), 1);
        assert_eq!(*slots.borrow(), 3);
    }

    #[test]
    fn test_remove_spans_containers() {
        let registry = registry();
        let mut ids = InstanceIdGen::new();
        let mut inventory = Inventory::new(registry.clone())
            .with_container(Container::new("belt", 1, registry.clone()))
            .with_container(Container::new("pack", 2, registry));

        // Belt holds 10; stock the pack directly with 8 more.
        inventory.add_item(stack(&mut ids, "ration", 10));
        let pack_id = inventory.containers()[1].id();
        inventory
            .container_mut(pack_id)
            .unwrap()
            .add_item(stack(&mut ids, "ration", 8));

        let ops = Rc::new(RefCell::new(0));
        let slots = Rc::new(RefCell::new(0));
        let o = ops.clone();
        inventory.on_changed(move |_| *o.borrow_mut() += 1);
        let s = slots.clone();
        inventory.on_slot_changed(move |_| *s.borrow_mut() += 1);

        let removed = inventory.remove_items(|s| s.def_id() == "ration", 15);
        assert_eq!(removed, 15);
        assert_eq!(inventory.count_where(|s| s.def_id() == "ration"), 3);

        // Two containers were drained, still one operation: the belt
        // slot cleared and the pack slot decremented, one notification.
        assert_eq!(*slots.borrow(), 2);
        assert_eq!(*ops.borrow(), 1);
    }

    #[test]
    fn test_rejected_add_stays_silent() {
        let registry = registry();
        let mut ids = InstanceIdGen::new();
        let mut inventory =
            Inventory::new(registry.clone()).with_container(Container::new("belt", 1, registry));
        inventory.add_item(stack(&mut ids, "pistol", 1));

        let ops = Rc::new(RefCell::new(0));
        let o = ops.clone();
        inventory.on_changed(move |_| *o.borrow_mut() += 1);

        // The only container is full: routed, attempted, nothing moved.
        let outcome = inventory.add_item(stack(&mut ids, "relic", 1));
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.rejection, Some(RejectReason::ContainerFull));
        assert_eq!(*ops.borrow(), 0);
    }

    #[test]
    fn test_drop_item_hands_back_the_stack() {
        let mut ids = InstanceIdGen::new();
        let mut inventory = loadout_and_pack();
        inventory.add_item(stack(&mut ids, "ration", 6));

        let dropped = inventory
            .drop_item(|s| s.def_id() == "ration", 4)
            .expect("stack");

        assert_eq!(dropped.quantity, 4);
        assert_eq!(inventory.count_where(|s| s.def_id() == "ration"), 2);
        assert!(inventory.drop_item(|s| s.def_id() == "pistol", 1).is_none());
    }

    #[test]
    fn test_aggregated_weight() {
        let mut ids = InstanceIdGen::new();
        let mut inventory = loadout_and_pack();
        inventory.add_item(stack(&mut ids, "pistol", 1));
        inventory.add_item(stack(&mut ids, "ration", 4));

        assert!((inventory.total_weight() - (1.2 + 4.0 * 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_stack_at_resolves_handles() {
        let mut ids = InstanceIdGen::new();
        let mut inventory = loadout_and_pack();
        inventory.add_item(stack(&mut ids, "pistol", 1));

        let slot = inventory.containers()[0]
            .get_slot(|s| s.def_id() == "pistol")
            .unwrap();
        assert_eq!(inventory.stack_at(slot).unwrap().def_id(), "pistol");
    }
}
