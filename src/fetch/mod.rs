//! Network retrieval.
//!
//! The `Fetcher` trait is the agent's only path to the network; the
//! production implementation is `HttpFetcher` on reqwest. A failed fetch
//! yields an error, never a synthetic response.

pub mod client;
pub mod error;

pub use client::HttpFetcher;
pub use error::FetchError;

use async_trait::async_trait;

use crate::models::{Request, Response};

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}
