//! Intercepted request representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request method. Only `Get` is a pure retrieval; everything else is
/// declined by the interceptor and goes straight to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// Whether this method is a pure retrieval the agent may serve from cache.
    /// HEAD is read-only but the agent still declines it: cached entries are
    /// keyed and stored for GET bodies only.
    pub fn is_retrieval(self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

/// What the requester intends to load. `Document` marks a full page
/// navigation and is the only destination eligible for the offline fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Other,
}

/// An intercepted outgoing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub destination: Destination,
}

impl Request {
    /// A GET request for a sub-resource.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            destination: Destination::Other,
        }
    }

    /// A GET request for a full page navigation.
    pub fn document(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            destination: Destination::Document,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Cache entry identity: method plus exact URL. No normalization is
    /// applied; two spellings of the same resource are two entries.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_includes_method_and_url() {
        let request = Request::get("https://app.example.com/index.html");
        assert_eq!(request.cache_key(), "GET https://app.example.com/index.html");
    }

    #[test]
    fn test_cache_key_distinguishes_methods() {
        let get = Request::get("https://app.example.com/");
        let head = Request::get("https://app.example.com/").with_method(Method::Head);
        assert_ne!(get.cache_key(), head.cache_key());
    }

    #[test]
    fn test_only_get_is_retrieval() {
        assert!(Method::Get.is_retrieval());
        assert!(!Method::Head.is_retrieval());
        assert!(!Method::Post.is_retrieval());
        assert!(!Method::Put.is_retrieval());
    }
}
