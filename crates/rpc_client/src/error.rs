//! Error types for status fetches.

use thiserror::Error;

/// Errors that can occur while fetching the node status.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The status URL could not be derived from the base URL.
    #[error("Invalid status URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// Connection or protocol failure.
    #[error("Request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The node answered with a non-success status code.
    #[error("Error making the call to {url}: HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be read as JSON.
    #[error("Unreadable response from {url}: {source}")]
    Body {
        /// Requested URL.
        url: String,
        /// Underlying HTTP/JSON error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Builds a transport error, folding timeouts into [`FetchError::Timeout`].
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Result type for status fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
