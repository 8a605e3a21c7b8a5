//! The offline caching agent.
//!
//! `OfflineAgent` is the service object: it owns the configuration and the
//! injected store and fetcher, and exposes one handler per lifecycle event
//! (install, activate, fetch-intercept). `host` adapts those handlers to an
//! event-dispatch channel for runtimes that deliver events asynchronously.

pub mod host;
pub mod service;

pub use host::{channel, AgentEvent, AgentHandle, EventDriver};
pub use service::{FetchOutcome, OfflineAgent};
