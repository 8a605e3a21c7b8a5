//! Response representations: live network responses and their stored form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a response relates to the application origin.
///
/// Opaque responses are blind cross-origin pass-throughs whose contents the
/// agent cannot inspect; they are never written to a cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin.
    Basic,
    /// Cross-origin with a CORS grant covering the application origin.
    Cors,
    /// Cross-origin without a CORS grant; body is withheld.
    Opaque,
}

/// A response as returned from the network (or replayed from the cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

impl Response {
    /// Only exact-200, non-opaque responses are eligible for caching.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind != ResponseKind::Opaque
    }
}

/// The durable form of a response inside a cache generation.
///
/// `stored_at` is informational (surfaced in logs); the cache-first policy
/// never expires entries, only generation eviction removes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Snapshot a live response for storage. The caller keeps the original;
    /// this is the "clone then put" half of the cache-first policy.
    pub fn new(response: &Response) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            kind: response.kind,
            stored_at: Utc::now(),
        }
    }

    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            kind: self.kind,
        }
    }

    /// Minutes since this entry was written (for log output).
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.stored_at).num_minutes()
    }
}
