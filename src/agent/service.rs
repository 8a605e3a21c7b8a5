//! Install/activate lifecycle and cache-first request interception.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::error::InstallError;
use crate::fetch::Fetcher;
use crate::models::{Destination, Request, Response, StoredResponse};
use crate::store::{CacheStore, StoreError};

/// Maximum concurrent precache fetches during install.
/// Keeps install fast without opening a connection per manifest entry.
const MAX_CONCURRENT_PRECACHE: usize = 4;

/// What the interceptor decided for a request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The agent declines to handle this request; the host sends it to the
    /// network untouched. Non-retrieval methods and bypassed URLs end here.
    Passthrough,

    /// A response to deliver, from cache or network.
    Response(Response),

    /// Network failed and no fallback applies. The host reports the request
    /// as failed; no synthetic response is fabricated.
    Unresolved,
}

impl FetchOutcome {
    pub fn is_passthrough(&self) -> bool {
        matches!(self, FetchOutcome::Passthrough)
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Response(response) => Some(response),
            _ => None,
        }
    }
}

/// The offline caching agent.
///
/// One instance corresponds to one deployed version of the application; the
/// configured version tag names the cache generation it installs into and
/// serves from.
pub struct OfflineAgent {
    config: AgentConfig,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    writes: Mutex<Vec<JoinHandle<()>>>,
}

impl OfflineAgent {
    pub fn new(config: AgentConfig, store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            store,
            fetcher,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Install: precache the manifest into the generation named by the
    /// version tag.
    ///
    /// Atomic across the manifest: if any entry fails to fetch, is not
    /// status-200, or is opaque, the partially populated generation is
    /// deleted and the error returned. The previously active generation is
    /// untouched either way. Success means the agent is immediately ready
    /// to activate; no waiting on pages still controlled by an older
    /// version.
    pub async fn handle_install(&self) -> Result<(), InstallError> {
        let generation = self.config.version_tag.as_str();
        self.store.open(generation).await?;

        if let Err(e) = self.precache(generation).await {
            if let Err(del) = self.store.delete(generation).await {
                warn!(generation, error = %del, "Failed to discard partial generation");
            }
            return Err(e);
        }

        info!(
            generation,
            resources = self.config.precache.len(),
            "Install complete, ready to activate"
        );
        Ok(())
    }

    async fn precache(&self, generation: &str) -> Result<(), InstallError> {
        let results: Vec<Result<(), InstallError>> = stream::iter(self.config.precache.iter().cloned())
            .map(|path: String| {
                let url = self.config.resolve(&path);
                async move {
                    let request = Request::get(&url);
                    let response =
                        self.fetcher
                            .fetch(&request)
                            .await
                            .map_err(|source| InstallError::Fetch {
                                url: url.clone(),
                                source,
                            })?;
                    if !response.is_cacheable() {
                        return Err(InstallError::NotCacheable {
                            url,
                            status: response.status,
                        });
                    }
                    self.store
                        .put(generation, &request.cache_key(), StoredResponse::new(&response))
                        .await?;
                    debug!(url = %request.url, "Precached");
                    Ok(())
                }
            })
            .buffer_unordered(MAX_CONCURRENT_PRECACHE)
            .collect()
            .await;

        results.into_iter().collect()
    }

    /// Activate: evict every generation whose name differs from the current
    /// version tag. Unconditional; once a new version activates, older
    /// cached data is gone.
    pub async fn handle_activate(&self) -> Result<(), StoreError> {
        let current = self.config.version_tag.as_str();
        for name in self.store.keys().await? {
            if name != current {
                self.store.delete(&name).await?;
                info!(generation = %name, "Evicted stale cache generation");
            }
        }
        info!(generation = current, "Activation complete, now controlling requests");
        Ok(())
    }

    /// Intercept one request.
    ///
    /// Cache-first: an exact-key hit is served with no network activity and
    /// no freshness check. On a miss the request goes to the network; a
    /// 200/non-opaque response is copied into the cache by a detached
    /// background task while the live response returns immediately. Network
    /// failure falls to the offline fallback.
    ///
    /// Infallible by design: cache trouble downgrades to a miss rather than
    /// failing the request.
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if !request.method.is_retrieval() {
            debug!(method = %request.method, url = %request.url, "Non-retrieval, passing through");
            return FetchOutcome::Passthrough;
        }
        if self.config.is_bypassed(&request.url) {
            debug!(url = %request.url, "Bypassed URL, passing through");
            return FetchOutcome::Passthrough;
        }

        let generation = self.config.version_tag.as_str();
        let key = request.cache_key();

        match self.store.get(generation, &key).await {
            Ok(Some(stored)) => {
                debug!(url = %request.url, age_minutes = stored.age_minutes(), "Cache hit");
                return FetchOutcome::Response(stored.into_response());
            }
            Ok(None) => {}
            Err(e) => {
                warn!(url = %request.url, error = %e, "Cache lookup failed, treating as miss");
            }
        }

        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.spawn_write(generation.to_string(), key, StoredResponse::new(&response))
                        .await;
                } else {
                    debug!(
                        url = %request.url,
                        status = response.status,
                        kind = ?response.kind,
                        "Response not cacheable, passing along uncached"
                    );
                }
                FetchOutcome::Response(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network fetch failed, trying fallback");
                self.resolve_fallback(&request).await
            }
        }
    }

    /// Detached best-effort cache write. The response path never awaits it;
    /// a failure here costs one cache entry, nothing more.
    async fn spawn_write(&self, generation: String, key: String, stored: StoredResponse) {
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            if let Err(e) = store.put(&generation, &key, stored).await {
                warn!(key = %key, error = %e, "Background cache write failed");
            }
        });
        self.writes.lock().await.push(handle);
    }

    /// Await every background write spawned so far. The host calls this
    /// before suspending the agent, the analog of the platform's
    /// keep-alive-until-complete declaration.
    pub async fn wait_for_writes(&self) {
        let handles: Vec<JoinHandle<()>> = self.writes.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Offline fallback: page navigations get the cached fallback document
    /// if present; sub-resources get nothing.
    async fn resolve_fallback(&self, request: &Request) -> FetchOutcome {
        if request.destination != Destination::Document {
            return FetchOutcome::Unresolved;
        }

        let url = self.config.resolve(&self.config.fallback_document);
        let key = Request::get(&url).cache_key();
        match self.store.get(&self.config.version_tag, &key).await {
            Ok(Some(stored)) => {
                info!(url = %request.url, "Offline navigation, serving fallback document");
                FetchOutcome::Response(stored.into_response())
            }
            Ok(None) => FetchOutcome::Unresolved,
            Err(e) => {
                warn!(error = %e, "Fallback lookup failed");
                FetchOutcome::Unresolved
            }
        }
    }
}
