//! Generation-keyed cache storage.
//!
//! A cache generation is a named snapshot of request-key to response
//! mappings. Exactly one generation is served from at a time; superseded
//! generations are deleted wholesale during activation.
//!
//! The `CacheStore` trait mirrors the primitives the agent needs from the
//! platform: `open`, `get` (exact-key match), `put`, `delete`, `keys`.
//! Implementations must tolerate concurrent access; the agent adds no
//! locking of its own.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::StoredResponse;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cache storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the named generation if it does not exist.
    async fn open(&self, generation: &str) -> Result<(), StoreError>;

    /// Exact-key lookup in the named generation. A missing generation is a
    /// miss, not an error.
    async fn get(&self, generation: &str, key: &str) -> Result<Option<StoredResponse>, StoreError>;

    /// Insert or overwrite an entry. Last write wins.
    async fn put(
        &self,
        generation: &str,
        key: &str,
        response: StoredResponse,
    ) -> Result<(), StoreError>;

    /// Destroy a generation and all of its entries. Returns whether the
    /// generation existed.
    async fn delete(&self, generation: &str) -> Result<bool, StoreError>;

    /// Enumerate existing generation names.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}
