use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;

/// Lightweight key-value cache for values that don't deserve their own slot
/// (metadata metrics per property, vectors per record...).
#[derive(Default)]
pub struct KeyedStore {
    values: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl KeyedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value under `key` if present and of type `T`.
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.values
            .read()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) {
        self.values.write().insert(key.into(), Box::new(value));
    }

    pub fn remove(&self, key: &str) -> bool {
        self.values.write().remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = KeyedStore::new();
        assert_eq!(store.get::<u32>("nope"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let store = KeyedStore::new();
        store.set("panel", 0.3_f64);
        store.set("panel", 0.5_f64);
        assert_eq!(store.get::<f64>("panel"), Some(0.5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_wrong_type_is_absent() {
        let store = KeyedStore::new();
        store.set("flag", true);
        assert_eq!(store.get::<String>("flag"), None);
        assert_eq!(store.get::<bool>("flag"), Some(true));
    }

    #[test]
    fn test_remove_and_clear() {
        let store = KeyedStore::new();
        store.set("a", 1_u8);
        store.set("b", 2_u8);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.contains("b"));
        store.clear();
        assert!(store.is_empty());
    }
}
