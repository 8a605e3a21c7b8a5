//! Disk-backed cache store.
//!
//! Each generation is persisted as a single JSON file in the cache
//! directory. The generation name is recorded inside the file, so `keys()`
//! reports original names even though filenames are sanitized.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::models::StoredResponse;

use super::{CacheStore, StoreError};

#[derive(Serialize, Deserialize)]
struct GenerationFile {
    name: String,
    entries: HashMap<String, StoredResponse>,
}

/// File-per-generation store.
///
/// Generation files are small (a precache manifest plus lazily cached
/// resources), so each write rewrites the whole file; a mutex serializes
/// file access so readers never observe a half-written generation.
pub struct DiskStore {
    cache_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskStore {
    /// Open a store rooted at `cache_dir`, creating the directory if needed.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Open a store under the platform cache directory, e.g.
    /// `~/.cache/<app_name>` on Linux.
    pub fn in_user_cache(app_name: &str) -> Result<Self, StoreError> {
        let base = dirs::cache_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no platform cache directory available",
            )
        })?;
        Self::new(base.join(app_name))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn generation_path(&self, generation: &str) -> PathBuf {
        // Sanitized for the filesystem; the real name lives inside the file.
        let safe: String = generation
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.cache_dir.join(format!("{}.json", safe))
    }

    fn load_generation(&self, generation: &str) -> Result<Option<GenerationFile>, StoreError> {
        let path = self.generation_path(generation);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save_generation(&self, file: &GenerationFile) -> Result<(), StoreError> {
        let path = self.generation_path(&file.name);
        let contents = serde_json::to_string(file)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn open(&self, generation: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.load_generation(generation)?.is_none() {
            self.save_generation(&GenerationFile {
                name: generation.to_string(),
                entries: HashMap::new(),
            })?;
        }
        Ok(())
    }

    async fn get(&self, generation: &str, key: &str) -> Result<Option<StoredResponse>, StoreError> {
        let _guard = self.write_lock.lock().await;
        Ok(self
            .load_generation(generation)?
            .and_then(|file| file.entries.get(key).cloned()))
    }

    async fn put(
        &self,
        generation: &str,
        key: &str,
        response: StoredResponse,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load_generation(generation)?.unwrap_or(GenerationFile {
            name: generation.to_string(),
            entries: HashMap::new(),
        });
        file.entries.insert(key.to_string(), response);
        self.save_generation(&file)
    }

    async fn delete(&self, generation: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.generation_path(generation);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // An unreadable generation file should not block enumeration of
            // the others.
            match std::fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|c| serde_json::from_str::<GenerationFile>(&c).map_err(StoreError::from))
            {
                Ok(file) => names.push(file.name),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable generation file");
                }
            }
        }
        Ok(names)
    }
}
