//! # haft_inventory - Slot-Based Item Storage
//!
//! This crate provides the item/container layer of Haft:
//!
//! - Item definitions with tags, stack sizes and per-unit weight
//! - Runtime item instances with dynamic properties
//! - Fixed-capacity containers with tag and weight constraints
//! - Constraint-based partial fills with rejection reasons
//! - Per-slot change notification
//! - An inventory aggregating several containers with routed operations
//!
//! # Example
//!
//! ```ignore
//! use haft_inventory::prelude::*;
//!
//! let mut registry = ItemRegistry::new();
//! registry.register(
//!     ItemDefinition::new("ration", "Field Ration")
//!         .with_max_stack(10)
//!         .with_unit_weight(0.5),
//! );
//! let registry = std::sync::Arc::new(registry);
//!
//! let mut pack = Container::new("backpack", 8, registry.clone());
//! let mut ids = InstanceIdGen::new();
//! let outcome = pack.add_item(ItemStack::new(Item::new(ids.allocate(), "ration"), 15));
//! assert_eq!(outcome.added, 15);
//! ```

pub mod container;
pub mod inventory;
pub mod item;
pub mod registry;
pub mod slot;

pub mod prelude {
    pub use crate::container::{
        AddOutcome, Container, RejectReason, RemoveOutcome, SlotChangeKind, SlotChanged,
    };
    pub use crate::inventory::{ContainerRouter, Inventory, InventoryChanged, TagRouter};
    pub use crate::item::{Item, ItemDefinition, ItemProperty, ItemStack};
    pub use crate::registry::ItemRegistry;
    pub use crate::slot::{ContainerId, SlotRef};
    pub use haft_core::id::{InstanceId, InstanceIdGen};
}

pub use prelude::*;
