//! Item registry

use crate::item::Item;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Resolves serialized item keys to item definitions
pub trait ItemLookup {
    /// Find the item registered under `(registry, key)`
    fn resolve(&self, registry: &str, key: u32) -> Option<Arc<Item>>;
}

/// Item definitions grouped by registry
///
/// Owned by the application and passed explicitly wherever items are
/// resolved.
#[derive(Debug, Default)]
pub struct ItemRegistry {
    registries: HashMap<String, BTreeMap<u32, Arc<Item>>>,
}

impl ItemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item under its own key pair, false if the key is taken
    pub fn register(&mut self, item: Arc<Item>) -> bool {
        let items = self
            .registries
            .entry(item.registry_key().to_string())
            .or_default();
        if items.contains_key(&item.key()) {
            log::warn!(
                "Item key {}:{} is already registered",
                item.registry_key(),
                item.key()
            );
            return false;
        }
        items.insert(item.key(), item);
        true
    }

    /// Get an item
    pub fn get(&self, registry: &str, key: u32) -> Option<&Arc<Item>> {
        self.registries.get(registry)?.get(&key)
    }

    /// Check if an item is registered
    pub fn contains(&self, registry: &str, key: u32) -> bool {
        self.get(registry, key).is_some()
    }

    /// Items of one registry, ordered by key
    pub fn items<'a>(&'a self, registry: &str) -> impl Iterator<Item = &'a Arc<Item>> + 'a {
        self.registries
            .get(registry)
            .into_iter()
            .flat_map(|items| items.values())
    }

    /// Registry keys
    pub fn registries(&self) -> impl Iterator<Item = &str> {
        self.registries.keys().map(String::as_str)
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        self.registries.values().map(BTreeMap::len).sum()
    }

    /// Check if no item is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemLookup for ItemRegistry {
    fn resolve(&self, registry: &str, key: u32) -> Option<Arc<Item>> {
        self.get(registry, key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ItemRegistry::new();
        let apple = Item::builder("food", 1).with_name("Apple").build().unwrap();
        let pear = Item::builder("food", 2).with_name("Pear").build().unwrap();
        assert!(registry.register(apple.clone()));
        assert!(registry.register(pear));
        assert!(!registry.register(Item::builder("food", 1).build().unwrap()));

        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(&registry.resolve("food", 1).unwrap(), &apple));
        assert!(registry.resolve("food", 3).is_none());
        assert!(registry.resolve("tools", 1).is_none());

        let names: Vec<_> = registry.items("food").map(|item| item.name().to_string()).collect();
        assert_eq!(names, vec!["Apple", "Pear"]);
        assert_eq!(registry.items("tools").count(), 0);
    }
}
