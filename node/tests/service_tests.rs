//! End-to-end run against a mocked node.

use chrono::{Duration, SecondsFormat, Utc};
use hyper::{Client, StatusCode, Uri};
use serde_json::json;
use syncmon_config::PartialConfig;
use tokio::sync::oneshot;

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::test]
async fn run_serves_health_until_shutdown() {
    let mut node = mockito::Server::new_async().await;
    let body = json!({
        "result": {
            "node_info": { "id": "n1", "network": "testnet-1", "moniker": "local" },
            "sync_info": {
                "latest_block_hash": "ABCD",
                "latest_block_height": "1000",
                "latest_block_time": Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
                "catching_up": false
            }
        }
    });
    let _status = node
        .mock("GET", "/status")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let port = free_port();
    let config = PartialConfig {
        rpc: Some(node.url()),
        epoch_start_time: Some((Utc::now() - Duration::hours(1)).to_rfc3339()),
        check_interval: Some(60),
        listen: Some(format!("127.0.0.1:{port}")),
        ..PartialConfig::default()
    }
    .resolve()
    .unwrap();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let service = tokio::spawn(syncmon_node::run(config, async {
        let _ = stop_rx.await;
    }));

    let client = Client::new();
    let uri: Uri = format!("http://127.0.0.1:{port}/healthz").parse().unwrap();
    let mut healthy = false;
    for _ in 0..100 {
        if let Ok(resp) = client.get(uri.clone()).await {
            if resp.status() == StatusCode::OK {
                healthy = true;
                break;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert!(healthy, "health endpoint never reported in sync");
    drop(client);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), service)
        .await
        .expect("service did not stop")
        .expect("service task panicked");
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn run_fails_when_listen_address_is_taken() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    let config = PartialConfig {
        rpc: Some("http://127.0.0.1:9".into()),
        epoch_start_time: Some(Utc::now().to_rfc3339()),
        listen: Some(addr.to_string()),
        ..PartialConfig::default()
    }
    .resolve()
    .unwrap();

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        syncmon_node::run(config, std::future::pending::<()>()),
    )
    .await
    .expect("run did not give up on the busy address");
    assert!(result.is_err());
}
