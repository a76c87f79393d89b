//! Alert delivery.
//!
//! Delivery is fire-and-forget: failures are reported to the caller, which
//! logs them; nothing is retried.

use crate::alerting::Alert;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Alert delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to build webhook client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Webhook rejected alert with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Alert delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &str;

    /// Delivers one alert
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Used when no alert destination is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        debug!(kind = %alert.kind, "alerting disabled, dropping alert");
        Ok(())
    }
}

/// Slack-compatible incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: Url,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NotifyError::Client)?;
        Ok(Self { url, client })
    }

    pub fn with_client(url: Url, client: Client) -> Self {
        Self { url, client }
    }

    /// Message body posted for `alert`.
    pub fn payload(alert: &Alert) -> Value {
        json!({
            "text": "🚨 alarm",
            "blocks": [
                {
                    "type": "section",
                    "text": {
                        "type": "plain_text",
                        "text": alert.kind.headline(),
                        "emoji": true
                    }
                },
                {
                    "type": "section",
                    "fields": [
                        { "type": "mrkdwn", "text": format!("*Moniker*\n{}", alert.node.moniker) },
                        { "type": "mrkdwn", "text": format!("*Network*\n{}", alert.node.network) }
                    ]
                },
                {
                    "type": "section",
                    "fields": [
                        { "type": "mrkdwn", "text": format!("*Last Block Height*\n{}", alert.block_height) },
                        { "type": "mrkdwn", "text": format!("*Last Block Time*\n{}", alert.block_time.to_rfc3339()) }
                    ]
                },
                { "type": "divider" }
            ]
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&Self::payload(alert))
            .send()
            .await
            .map_err(NotifyError::Transport)?;

        let status = response.status();
        info!(kind = %alert.kind, status = status.as_u16(), "webhook answered");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::AlertKind;
    use chrono::{TimeZone, Utc};
    use syncmon_core::NodeIdentity;

    fn alert(kind: AlertKind) -> Alert {
        Alert {
            kind,
            node: NodeIdentity {
                moniker: "val-7".into(),
                node_id: "77".into(),
                network: "akashnet-2".into(),
            },
            block_height: 812_004,
            block_time: Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn degraded_payload() {
        let payload = WebhookNotifier::payload(&alert(AlertKind::Degraded));
        let blocks = payload["blocks"].as_array().unwrap();

        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0]["text"]["text"], "🔄 Node out of sync 🔴");
        assert_eq!(blocks[1]["fields"][0]["text"], "*Moniker*\nval-7");
        assert_eq!(blocks[1]["fields"][1]["text"], "*Network*\nakashnet-2");
        assert_eq!(blocks[2]["fields"][0]["text"], "*Last Block Height*\n812004");
        assert_eq!(
            blocks[2]["fields"][1]["text"],
            "*Last Block Time*\n2022-03-01T12:00:00+00:00"
        );
        assert_eq!(blocks[3]["type"], "divider");
    }

    #[test]
    fn recovered_headline() {
        let payload = WebhookNotifier::payload(&alert(AlertKind::Recovered));
        assert_eq!(payload["blocks"][0]["text"]["text"], "🔄 Node back in sync 🟢");
    }

    #[tokio::test]
    async fn noop_accepts_everything() {
        assert!(NoopNotifier.notify(&alert(AlertKind::Degraded)).await.is_ok());
        assert_eq!(NoopNotifier.name(), "noop");
    }

    #[tokio::test]
    async fn webhook_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/services/T/B/X")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "text": "🚨 alarm"
            })))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/services/T/B/X", server.url())).unwrap();
        let notifier = WebhookNotifier::new(url, Duration::from_secs(2)).unwrap();

        notifier.notify(&alert(AlertKind::Degraded)).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn webhook_rejection_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(404)
            .with_body("no_service")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/hook", server.url())).unwrap();
        let notifier = WebhookNotifier::new(url, Duration::from_secs(2)).unwrap();

        match notifier.notify(&alert(AlertKind::Recovered)).await {
            Err(NotifyError::Rejected { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "no_service");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
