//! sitecache - offline resource caching for web applications.
//!
//! An agent that sits between an application's retrieval requests and the
//! network: it precaches a fixed manifest into a versioned cache generation
//! at install time, serves cache-first for everything except a configured
//! external API, and falls back to the cached entry page when a navigation
//! happens offline.
//!
//! The agent is an explicit service object; the pieces a host wires
//! together:
//!
//! - [`AgentConfig`] - version tag, base URL, precache manifest, bypass
//!   patterns, fallback document
//! - [`CacheStore`] - generation-keyed storage ([`MemoryStore`],
//!   [`DiskStore`])
//! - [`Fetcher`] - network access ([`HttpFetcher`])
//! - [`OfflineAgent`] - the install / activate / fetch-intercept handlers
//! - [`agent::host`] - channel-based event dispatch for asynchronous hosts
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitecache::{channel, AgentConfig, DiskStore, HttpFetcher, OfflineAgent, Request};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AgentConfig::new(
//!     "timer-v3",
//!     "https://timer.example.com",
//!     ["./", "./index.html", "./manifest.json", "./icon.png"],
//! )
//! .with_bypass("script.google.com");
//!
//! let agent = Arc::new(OfflineAgent::new(
//!     config,
//!     Arc::new(DiskStore::in_user_cache("timer")?),
//!     Arc::new(HttpFetcher::new("https://timer.example.com")?),
//! ));
//!
//! let (handle, driver) = channel(agent);
//! tokio::spawn(driver.run());
//!
//! handle.install().await?;
//! handle.activate().await?;
//! let outcome = handle
//!     .fetch(Request::document("https://timer.example.com/"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod store;

pub use agent::{channel, AgentEvent, AgentHandle, EventDriver, FetchOutcome, OfflineAgent};
pub use config::AgentConfig;
pub use error::InstallError;
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use models::{Destination, Method, Request, Response, ResponseKind, StoredResponse};
pub use store::{CacheStore, DiskStore, MemoryStore, StoreError};
