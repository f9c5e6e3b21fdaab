//! In-memory store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::BaseKeyValueStore;

/// In-memory store backed by a HashMap. Shares the swallow-error contract
/// of the real stores, minus anything that can actually fail.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseKeyValueStore for MemoryStore {
    async fn set_string(&self, key: &str, value: &str) {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    async fn get_string(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    async fn remove(&self, key: &str) {
        self.data.lock().unwrap().remove(key);
    }

    async fn clear_all(&self) {
        self.data.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set_string("k", "v").await;
        assert_eq!(store.get_string("k").await.as_deref(), Some("v"));

        store.remove("k").await;
        assert_eq!(store.get_string("k").await, None);
        assert!(store.is_empty());
    }
}
