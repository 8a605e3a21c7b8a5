//! In-memory cache store, primarily for tests and ephemeral hosts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::StoredResponse;

use super::{CacheStore, StoreError};

type Generation = HashMap<String, StoredResponse>;

/// Map-backed store. `put` into an unopened generation creates it, matching
/// the create-if-absent behavior of `open`.
#[derive(Default)]
pub struct MemoryStore {
    generations: RwLock<HashMap<String, Generation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, generation: &str) -> Result<(), StoreError> {
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default();
        Ok(())
    }

    async fn get(&self, generation: &str, key: &str) -> Result<Option<StoredResponse>, StoreError> {
        let generations = self.generations.read().await;
        Ok(generations
            .get(generation)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(
        &self,
        generation: &str,
        key: &str,
        response: StoredResponse,
    ) -> Result<(), StoreError> {
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default()
            .insert(key.to_string(), response);
        Ok(())
    }

    async fn delete(&self, generation: &str) -> Result<bool, StoreError> {
        Ok(self.generations.write().await.remove(generation).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.generations.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Response, ResponseKind};

    fn stored(body: &[u8]) -> StoredResponse {
        StoredResponse::new(&Response {
            status: 200,
            headers: Vec::new(),
            body: body.to_vec(),
            kind: ResponseKind::Basic,
        })
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        store.put("v1", "GET /a", stored(b"alpha")).await.unwrap();

        let entry = store.get("v1", "GET /a").await.unwrap().unwrap();
        assert_eq!(entry.body, b"alpha");
    }

    #[tokio::test]
    async fn test_get_missing_generation_is_miss() {
        let store = MemoryStore::new();
        assert!(store.get("nope", "GET /a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = MemoryStore::new();
        store.put("v1", "GET /a", stored(b"old")).await.unwrap();
        store.put("v1", "GET /a", stored(b"new")).await.unwrap();

        let entry = store.get("v1", "GET /a").await.unwrap().unwrap();
        assert_eq!(entry.body, b"new");
    }

    #[tokio::test]
    async fn test_delete_removes_generation() {
        let store = MemoryStore::new();
        store.open("v1").await.unwrap();
        store.put("v1", "GET /a", stored(b"alpha")).await.unwrap();

        assert!(store.delete("v1").await.unwrap());
        assert!(!store.delete("v1").await.unwrap());
        assert!(store.get("v1", "GET /a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_lists_open_generations() {
        let store = MemoryStore::new();
        store.open("v1").await.unwrap();
        store.open("v2").await.unwrap();

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["v1", "v2"]);
    }
}
