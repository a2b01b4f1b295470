//! Read-only item definition registry

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::item::ItemDefinition;

/// Lookup of item definitions by id.
///
/// Built once from authoring data, then shared read-only (typically via
/// `Arc<ItemRegistry>`) with every container that needs stack-size and
/// weight metadata. There is no ambient global registry; whoever composes
/// the inventory passes the handle in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemRegistry {
    defs: HashMap<String, ItemDefinition>,
}

impl ItemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            defs: HashMap::new(),
        }
    }

    /// Register a definition, replacing any previous one with the same id
    pub fn register(&mut self, def: ItemDefinition) {
        self.defs.insert(def.id.clone(), def);
    }

    /// Look up a definition
    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.defs.get(id)
    }

    /// Check if a definition exists
    pub fn contains(&self, id: &str) -> bool {
        self.defs.contains_key(id)
    }

    /// Max stack size for an item (1 for unknown ids)
    pub fn max_stack(&self, id: &str) -> u32 {
        self.defs.get(id).map(|d| d.max_stack).unwrap_or(1)
    }

    /// Weight per unit for an item (0 for unknown ids)
    pub fn unit_weight(&self, id: &str) -> f32 {
        self.defs.get(id).map(|d| d.unit_weight).unwrap_or(0.0)
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate over all definitions
    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.defs.values()
    }
}
