//! Node Status Client
//!
//! This crate fetches the `/status` document from a Tendermint/CometBFT style
//! node RPC endpoint. Decoding the document into typed values is left to
//! `syncmon-core`.

mod error;
mod status_client;

pub use error::{FetchError, FetchResult};
pub use status_client::{StatusClient, StatusSource, DEFAULT_HTTP_TIMEOUT, STATUS_PATH};
