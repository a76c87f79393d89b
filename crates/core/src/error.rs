use std::num::ParseIntError;
use thiserror::Error;

/// Errors raised while turning a status document into typed values.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A required section (`result.sync_info`, `result.node_info`) is absent.
    #[error("Missing section `{0}` in status document")]
    MissingSection(&'static str),

    /// A section is present but a field is missing or has the wrong shape.
    #[error("Malformed `{section}`: {source}")]
    Malformed {
        /// Section being decoded.
        section: &'static str,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// `latest_block_height` is not a base-10 unsigned integer.
    #[error("Invalid block height `{value}`: {source}")]
    InvalidHeight {
        /// Raw field value.
        value: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },

    /// `latest_block_time` is not an ISO-8601 timestamp with offset.
    #[error("Invalid block time `{value}`: {source}")]
    InvalidTime {
        /// Raw field value.
        value: String,
        /// Timestamp parse failure.
        #[source]
        source: chrono::ParseError,
    },
}

impl ParseError {
    pub(crate) fn malformed(section: &'static str, source: serde_json::Error) -> Self {
        Self::Malformed { section, source }
    }
}

/// Result type for status parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
