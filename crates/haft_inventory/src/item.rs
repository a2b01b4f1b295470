//! Item definitions, instances and stacks

use std::collections::HashMap;

use haft_core::id::InstanceId;
use serde::{Deserialize, Serialize};

/// Dynamic property value carried by item instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemProperty {
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Text value
    Text(String),
}

impl ItemProperty {
    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Immutable item template, owned by the [`crate::registry::ItemRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Maximum stack size (1 = not stackable)
    pub max_stack: u32,
    /// Weight per unit
    pub unit_weight: f32,
    /// Tags for container filtering and queries
    pub tags: Vec<String>,
}

impl ItemDefinition {
    /// Create a new item definition
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_stack: 1,
            unit_weight: 0.0,
            tags: Vec::new(),
        }
    }

    /// Set max stack size (clamped to at least 1)
    pub fn with_max_stack(mut self, max: u32) -> Self {
        self.max_stack = max.max(1);
        self
    }

    /// Set weight per unit
    pub fn with_unit_weight(mut self, weight: f32) -> Self {
        self.unit_weight = weight;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check if the definition carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Check if stackable
    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }
}

/// A runtime item instance.
///
/// References its definition by id and carries mutable dynamic state
/// (durability, charges, ...). Identity is the [`InstanceId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Runtime identity
    pub id: InstanceId,
    /// Definition id (lookup via the registry)
    pub def_id: String,
    /// Instance-specific properties (durability, enchantments, etc.)
    pub data: HashMap<String, ItemProperty>,
}

impl Item {
    /// Create a new instance of a definition
    pub fn new(id: InstanceId, def_id: impl Into<String>) -> Self {
        Self {
            id,
            def_id: def_id.into(),
            data: HashMap::new(),
        }
    }

    /// Set a dynamic property
    pub fn with_data(mut self, key: impl Into<String>, value: ItemProperty) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Set durability
    pub fn with_durability(self, current: f32, max: f32) -> Self {
        self.with_data("durability", ItemProperty::Float(current as f64))
            .with_data("max_durability", ItemProperty::Float(max as f64))
    }

    /// Get durability (current, max)
    pub fn durability(&self) -> Option<(f32, f32)> {
        let current = self.data.get("durability")?.as_float()? as f32;
        let max = self.data.get("max_durability")?.as_float()? as f32;
        Some((current, max))
    }
}

/// A stack of items.
///
/// Containers never store an empty stack: an empty slot is `None`, so
/// `quantity == 0 iff item == none` holds structurally inside storage.
/// A zero-quantity stack is only meaningful as a no-op input to
/// container operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item instance
    pub item: Item,
    /// Quantity
    pub quantity: u32,
}

impl ItemStack {
    /// Create a new stack
    pub fn new(item: Item, quantity: u32) -> Self {
        Self { item, quantity }
    }

    /// Create a single-item stack
    pub fn single(item: Item) -> Self {
        Self::new(item, 1)
    }

    /// Definition id of the stacked item
    pub fn def_id(&self) -> &str {
        &self.item.def_id
    }

    /// Check if this stack holds no items
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Add to this stack up to `max_stack` (returns overflow)
    pub fn add(&mut self, amount: u32, max_stack: u32) -> u32 {
        let space = max_stack.saturating_sub(self.quantity);
        let to_add = amount.min(space);
        self.quantity += to_add;
        amount - to_add
    }

    /// Remove from this stack (returns amount actually removed)
    pub fn remove(&mut self, amount: u32) -> u32 {
        let to_remove = amount.min(self.quantity);
        self.quantity -= to_remove;
        to_remove
    }

    /// Split off `amount` into a new stack, or None if it would not
    /// leave both stacks non-empty
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        if amount > 0 && amount < self.quantity {
            self.quantity -= amount;
            Some(ItemStack {
                item: self.item.clone(),
                quantity: amount,
            })
        } else {
            None
        }
    }

    /// Check if another stack can merge into this one.
    ///
    /// Instances with dynamic data keep their identity and never merge.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.item.def_id == other.item.def_id
            && self.item.data.is_empty()
            && other.item.data.is_empty()
    }
}
