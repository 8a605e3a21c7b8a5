//! Agent-level error types.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::store::StoreError;

/// Why an install attempt failed. Any variant means the new generation was
/// discarded and the previously active generation keeps serving.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("failed to precache {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("precache response for {url} is not cacheable (status {status})")]
    NotCacheable { url: String, status: u16 },

    #[error(transparent)]
    Store(#[from] StoreError),
}
