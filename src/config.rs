//! Agent configuration.
//!
//! Everything the agent needs is fixed at construction: the version tag
//! naming the active cache generation, the application base URL, the
//! precache manifest, bypass patterns for an external API, and the offline
//! fallback document.
//!
//! Configuration can be built in code or loaded from a JSON file deployed
//! alongside the application.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_fallback_document() -> String {
    "./index.html".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Version tag naming the cache generation. Bumping it on redeploy is
    /// the sole trigger for precaching a fresh manifest and evicting old
    /// generations.
    pub version_tag: String,

    /// Application origin (plus optional path prefix) that relative
    /// manifest entries resolve against, e.g. `https://app.example.com`.
    pub base_url: String,

    /// Static resources guaranteed present after a successful install.
    /// Relative paths (`./`, `./index.html`, ...); fixed at build time.
    pub precache: Vec<String>,

    /// URL substrings identifying the external API endpoint. Matching
    /// requests always pass through, never touching the cache. Matching is
    /// plain substring containment over the full URL, so an unrelated URL
    /// that happens to contain a pattern is bypassed as well; supply longer
    /// patterns (scheme plus a trailing slash) where that matters.
    #[serde(default)]
    pub bypass: Vec<String>,

    /// Document served to offline page navigations, resolved like a
    /// manifest entry.
    #[serde(default = "default_fallback_document")]
    pub fallback_document: String,
}

impl AgentConfig {
    pub fn new(
        version_tag: impl Into<String>,
        base_url: impl Into<String>,
        precache: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            version_tag: version_tag.into(),
            base_url: base_url.into(),
            precache: precache.into_iter().map(Into::into).collect(),
            bypass: Vec::new(),
            fallback_document: default_fallback_document(),
        }
    }

    pub fn with_bypass(mut self, pattern: impl Into<String>) -> Self {
        self.bypass.push(pattern.into());
        self
    }

    pub fn with_fallback_document(mut self, path: impl Into<String>) -> Self {
        self.fallback_document = path.into();
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read agent config: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse agent config: {}", path.display()))
    }

    /// Resolve a manifest-style path against the base URL. Absolute URLs
    /// pass through unchanged; `./` resolves to the application root.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        if relative.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}", base, relative)
        }
    }

    pub fn is_bypassed(&self, url: &str) -> bool {
        self.bypass.iter().any(|pattern| url.contains(pattern))
    }
}
