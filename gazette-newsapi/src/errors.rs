//! Errors the news client can produce.

use http::StatusCode;
use thiserror::Error;

/// Errors that may occur while setting up the client.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configured server URL or HTTP client options were unusable.
    #[error("The news client cannot be used with the current configuration")]
    InvalidConfiguration(#[source] anyhow::Error),
}

/// Errors that may occur while forwarding a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider answered with a non-success status. Carries the
    /// provider's own status code and reported message so they can be
    /// relayed to the caller.
    #[error("News provider returned {status}: {message}")]
    Upstream {
        /// The provider's HTTP status code.
        status: StatusCode,
        /// The provider's reported message, or a fallback.
        message: String,
    },

    /// The provider could not be reached, including timeouts.
    #[error("There was a network error while contacting the news provider: {0}")]
    Network(#[source] anyhow::Error),

    /// The provider's success response was not in the expected format.
    #[error("Response from the news provider was not in the expected format: {0}")]
    Format(#[source] anyhow::Error),

    /// Anything else that went wrong inside the client.
    #[error("There was an internal error in the news client: {0}")]
    Internal(#[source] anyhow::Error),
}
