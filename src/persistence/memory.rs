use super::{KeyValueStore, PersistenceError, PersistenceResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process store; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> PersistenceResult<Vec<String>> {
        let records = self.records.lock().map_err(|_| PersistenceError::Poisoned)?;
        let mut keys: Vec<String> = records.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        let records = self.records.lock().map_err(|_| PersistenceError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let mut records = self.records.lock().map_err(|_| PersistenceError::Poisoned)?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        let mut records = self.records.lock().map_err(|_| PersistenceError::Poisoned)?;
        records.remove(key);
        Ok(())
    }
}
