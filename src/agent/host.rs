//! Host event dispatch.
//!
//! Host runtimes deliver lifecycle and fetch events asynchronously and may
//! suspend the agent between them. This module models that dispatch as an
//! explicit channel: the `EventDriver` owns the agent and processes
//! `AgentEvent`s, while `AgentHandle` is the cheap, cloneable sender the
//! hosting code keeps.
//!
//! Lifecycle events (install, activate) run to completion before the next
//! event is taken. Fetch events are spawned, so any number may be in flight
//! concurrently with no ordering between them. When the last handle is
//! dropped the driver drains in-flight fetches and pending background cache
//! writes before returning, the equivalent of the platform's
//! keep-alive-until-complete declaration.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::InstallError;
use crate::models::Request;
use crate::store::StoreError;

use super::{FetchOutcome, OfflineAgent};

/// Buffer size for the event channel.
/// 32 covers a burst of page-load sub-resource requests with headroom.
const EVENT_CHANNEL_SIZE: usize = 32;

pub enum AgentEvent {
    Install {
        reply: oneshot::Sender<Result<(), InstallError>>,
    },
    Activate {
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    Fetch {
        request: Request,
        reply: oneshot::Sender<FetchOutcome>,
    },
}

/// Sender half handed to the hosting code.
#[derive(Clone)]
pub struct AgentHandle {
    events: mpsc::Sender<AgentEvent>,
}

/// Receiver half owning the agent; `run` is the event loop.
pub struct EventDriver {
    agent: Arc<OfflineAgent>,
    events: mpsc::Receiver<AgentEvent>,
}

/// Wire an agent to an event channel.
pub fn channel(agent: Arc<OfflineAgent>) -> (AgentHandle, EventDriver) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    (AgentHandle { events: tx }, EventDriver { agent, events: rx })
}

impl AgentHandle {
    pub async fn install(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(AgentEvent::Install { reply })
            .await
            .context("agent event loop has shut down")?;
        rx.await.context("agent dropped the install event")??;
        Ok(())
    }

    pub async fn activate(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(AgentEvent::Activate { reply })
            .await
            .context("agent event loop has shut down")?;
        rx.await.context("agent dropped the activate event")??;
        Ok(())
    }

    pub async fn fetch(&self, request: Request) -> Result<FetchOutcome> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(AgentEvent::Fetch { request, reply })
            .await
            .context("agent event loop has shut down")?;
        rx.await.context("agent dropped the fetch event")
    }
}

impl EventDriver {
    pub async fn run(mut self) {
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

        while let Some(event) = self.events.recv().await {
            in_flight.retain(|handle| !handle.is_finished());
            match event {
                AgentEvent::Install { reply } => {
                    let _ = reply.send(self.agent.handle_install().await);
                }
                AgentEvent::Activate { reply } => {
                    let _ = reply.send(self.agent.handle_activate().await);
                }
                AgentEvent::Fetch { request, reply } => {
                    let agent = Arc::clone(&self.agent);
                    in_flight.push(tokio::spawn(async move {
                        let _ = reply.send(agent.handle_fetch(request).await);
                    }));
                }
            }
        }

        // All handles dropped: stay alive until outstanding work finishes.
        debug!(fetches = in_flight.len(), "Event channel closed, draining");
        for handle in in_flight {
            let _ = handle.await;
        }
        self.agent.wait_for_writes().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::fetch::{FetchError, Fetcher};
    use crate::models::{Response, ResponseKind};
    use crate::store::{CacheStore, MemoryStore};

    use async_trait::async_trait;

    struct SingleResourceFetcher;

    #[async_trait]
    impl Fetcher for SingleResourceFetcher {
        async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            if request.url == "https://app.example.com/" {
                Ok(Response {
                    status: 200,
                    headers: Vec::new(),
                    body: b"<html>root</html>".to_vec(),
                    kind: ResponseKind::Basic,
                })
            } else {
                Err(FetchError::Unreachable(request.url.clone()))
            }
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle_through_the_handle() {
        let store = Arc::new(MemoryStore::new());
        store.open("app-v0").await.unwrap();

        let config = AgentConfig::new("app-v1", "https://app.example.com", ["./"]);
        let agent = Arc::new(OfflineAgent::new(
            config,
            Arc::clone(&store) as Arc<dyn CacheStore>,
            Arc::new(SingleResourceFetcher),
        ));

        let (handle, driver) = channel(agent);
        let driver = tokio::spawn(driver.run());

        handle.install().await.unwrap();
        handle.activate().await.unwrap();

        let outcome = handle
            .fetch(Request::get("https://app.example.com/"))
            .await
            .unwrap();
        assert_eq!(
            outcome.into_response().unwrap().body,
            b"<html>root</html>"
        );

        // Old generation was evicted during activation.
        assert_eq!(store.keys().await.unwrap(), vec!["app-v1"]);

        // Dropping the handle shuts the driver down cleanly.
        drop(handle);
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_errors_after_driver_shutdown() {
        let config = AgentConfig::new("app-v1", "https://app.example.com", ["./"]);
        let agent = Arc::new(OfflineAgent::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(SingleResourceFetcher),
        ));

        let (handle, driver) = channel(agent);
        drop(driver);

        assert!(handle.install().await.is_err());
        assert!(handle.fetch(Request::get("https://app.example.com/")).await.is_err());
    }
}
