use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// For `Fetcher` implementations not backed by reqwest (embedded hosts,
    /// test doubles) to report an unreachable network.
    #[error("network unreachable: {0}")]
    Unreachable(String),
}
