use crate::error::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Path of the status endpoint, relative to the RPC base URL.
pub const STATUS_PATH: &str = "status";

/// Upper bound for a single status request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of raw status documents.
///
/// Implemented by [`StatusClient`] for real nodes; tests plug in fakes.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches one status document.
    async fn fetch_status(&self) -> FetchResult<Value>;

    /// Human readable endpoint description used in logs.
    fn endpoint(&self) -> String;
}

/// HTTP client for the node `/status` endpoint.
#[derive(Debug, Clone)]
pub struct StatusClient {
    status_url: Url,
    http_client: Client,
    request_timeout: Duration,
}

impl StatusClient {
    /// Creates a client for the node at `base_url` with the given request timeout.
    pub fn new(base_url: &Url, request_timeout: Duration) -> FetchResult<Self> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(FetchError::Client)?;

        Self::with_client(http_client, base_url, request_timeout)
    }

    /// Creates a client around an existing HTTP client.
    pub fn with_client(
        http_client: Client,
        base_url: &Url,
        request_timeout: Duration,
    ) -> FetchResult<Self> {
        Ok(Self {
            status_url: status_url(base_url)?,
            http_client,
            request_timeout,
        })
    }

    /// Full URL of the status endpoint.
    pub fn status_url(&self) -> &Url {
        &self.status_url
    }

    /// Configured request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Issues `GET {rpc}/status` and returns the decoded JSON body.
    pub async fn get_status(&self) -> FetchResult<Value> {
        let url = self.status_url.as_str();

        let response = self
            .http_client
            .get(self.status_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::transport(url, e)
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        debug!(target: "syncmon::rpc", url, "status fetched");
        Ok(body)
    }
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch_status(&self) -> FetchResult<Value> {
        self.get_status().await
    }

    fn endpoint(&self) -> String {
        self.status_url.to_string()
    }
}

/// Appends [`STATUS_PATH`] to the base URL, keeping any path prefix.
fn status_url(base_url: &Url) -> FetchResult<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    Ok(base.join(STATUS_PATH)?)
}
