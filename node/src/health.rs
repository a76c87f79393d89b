//! Health endpoint for the sync monitor.
//!
//! Routes:
//! - `GET /` and `GET /healthz`: `200 true` while in sync, otherwise
//!   `503 {"detail":"Node not in sync"}`. Unknown (before the first verdict)
//!   counts as not in sync.
//! - `GET /status`: the published [`MonitorStatus`](syncmon_monitoring::MonitorStatus) as JSON.
//! - `GET /metrics`: Prometheus text exposition.

use anyhow::Context;
use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use syncmon_monitoring::{metrics, StatusHandle};
use tracing::info;

pub const NOT_IN_SYNC_DETAIL: &str = "Node not in sync";

const APPLICATION_JSON: &str = "application/json";
const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Serves the health endpoint until `shutdown` resolves.
pub async fn serve_health<F>(addr: SocketAddr, status: StatusHandle, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let make_svc = make_service_fn(move |_conn| {
        let status = status.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| handle_request(req, status.clone())))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("failed to bind health endpoint on {addr}"))?
        .serve(make_svc);
    info!(addr = %server.local_addr(), "health endpoint listening");

    server.with_graceful_shutdown(shutdown).await?;
    info!("health endpoint stopped");
    Ok(())
}

pub async fn handle_request(
    req: Request<Body>,
    status: StatusHandle,
) -> Result<Response<Body>, hyper::Error> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") | (&Method::GET, "/healthz") => {
            if status.is_in_sync().await {
                json_response(StatusCode::OK, &Value::Bool(true))
            } else {
                json_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &json!({ "detail": NOT_IN_SYNC_DETAIL }),
                )
            }
        }
        (&Method::GET, "/status") => {
            let snapshot = status.snapshot().await;
            let body = serde_json::to_value(&snapshot).unwrap_or(Value::Null);
            json_response(StatusCode::OK, &body)
        }
        (&Method::GET, "/metrics") => {
            let mut resp = Response::new(Body::from(metrics::gather()));
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(PROMETHEUS_TEXT));
            resp
        }
        _ => {
            let mut not_found = Response::new(Body::from("not found"));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            not_found
        }
    };
    Ok(response)
}

fn json_response(code: StatusCode, body: &Value) -> Response<Body> {
    let mut resp = Response::new(Body::from(body.to_string()));
    *resp.status_mut() = code;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    resp
}
