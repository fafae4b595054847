use super::{KvStore, KvValue, StoreError, check_entry};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, KvValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<KvValue> {
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: KvValue) -> Result<(), StoreError> {
        check_entry(key, &value)?;
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<Option<KvValue>, StoreError> {
        Ok(self.entries.write().remove(key))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().clear();
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{get_or, put_opt};

    #[test]
    fn test_typed_reads() {
        let store = MemoryStore::new();
        store.put("name", "ana".into()).unwrap();
        store.put("visits", KvValue::Int(3)).unwrap();

        assert_eq!(get_or(&store, "name", String::new()), "ana");
        assert_eq!(get_or(&store, "visits", 0i32), 3);
        assert!(!get_or(&store, "visits", false));
        assert_eq!(get_or(&store, "missing", 1.5f64), 1.5);
    }

    #[test]
    fn test_rejects_bad_entries() {
        let store = MemoryStore::new();
        assert!(matches!(store.put("", KvValue::Bool(true)), Err(StoreError::EmptyKey)));
        assert!(matches!(
            store.put("ratio", KvValue::Double(f64::NAN)),
            Err(StoreError::Unsupported(_))
        ));
        assert!(put_opt::<i64>(&store, "id", None).is_err());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let store = MemoryStore::new();
        store.put("a", KvValue::Long(1)).unwrap();
        store.put("b", KvValue::Long(2)).unwrap();

        assert_eq!(store.remove("a").unwrap(), Some(KvValue::Long(1)));
        assert!(!store.contains_key("a"));
        store.clear().unwrap();
        assert!(store.keys().is_empty());
    }
}
