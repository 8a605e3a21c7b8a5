//! HTTP fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use reqwest::{Client, Url};
use tracing::debug;

use crate::models::{Method, Request, Response, ResponseKind};

use super::{FetchError, Fetcher};

/// HTTP request timeout in seconds.
/// 30s allows for slow origins while failing fast enough that the offline
/// fallback path is reached in reasonable time.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Network fetcher for the agent.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: String,
}

impl HttpFetcher {
    /// Create a fetcher that classifies responses relative to `app_origin`
    /// (scheme + host + port of the application being served offline).
    pub fn new(app_origin: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            origin: app_origin.trim_end_matches('/').to_string(),
        })
    }

    fn same_origin(&self, url: &Url) -> bool {
        match Url::parse(&self.origin) {
            Ok(origin) => {
                url.scheme() == origin.scheme()
                    && url.host_str() == origin.host_str()
                    && url.port_or_known_default() == origin.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    /// Same-origin responses are `Basic`; cross-origin responses are `Cors`
    /// only when the server grants our origin (or everyone) access,
    /// otherwise `Opaque`.
    fn classify(&self, url: &Url, headers: &reqwest::header::HeaderMap) -> ResponseKind {
        if self.same_origin(url) {
            return ResponseKind::Basic;
        }
        match headers
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
        {
            Some("*") => ResponseKind::Cors,
            Some(allowed) if allowed.trim_end_matches('/') == self.origin => ResponseKind::Cors,
            _ => ResponseKind::Opaque,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Options => reqwest::Method::OPTIONS,
        };

        let response = self.client.request(method, url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let kind = self.classify(&final_url, response.headers());

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        // Opaque responses keep their body hidden from the agent.
        let body = if kind == ResponseKind::Opaque {
            response.bytes().await?;
            Vec::new()
        } else {
            response.bytes().await?.to_vec()
        };

        debug!(url = %final_url, status, ?kind, "Fetched");

        Ok(Response {
            status,
            headers,
            body,
            kind,
        })
    }
}
