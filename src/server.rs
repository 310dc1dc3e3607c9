//! HTTP surface of the relay.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::RelayError;
use crate::relay::{ContactRelay, SUCCESS_MESSAGE};

pub const SEND_EMAIL_PATH: &str = "/send-email";
pub const DEFAULT_PORT: u16 = 8888;

/// Where the binary listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `BIND_ADDR` and `PORT`, falling back to `0.0.0.0:8888`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ip = lookup("BIND_ADDR")
            .and_then(|raw| {
                raw.parse::<IpAddr>()
                    .inspect_err(|_| warn!(value = %raw, "Ignoring invalid BIND_ADDR"))
                    .ok()
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = lookup("PORT")
            .and_then(|raw| {
                raw.parse::<u16>()
                    .inspect_err(|_| warn!(value = %raw, "Ignoring invalid PORT"))
                    .ok()
            })
            .unwrap_or(DEFAULT_PORT);

        ServerConfig {
            addr: SocketAddr::new(ip, port),
        }
    }
}

pub fn router(relay: ContactRelay) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(SEND_EMAIL_PATH, any(send_email))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

async fn health() -> &'static str {
    "OK"
}

/// Accepts every method so that the relay itself answers non-POST requests.
/// A body that cannot be read (over the size limit, broken stream) still
/// gets the JSON failure response.
async fn send_email(
    State(relay): State<ContactRelay>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if method == Method::POST => {
            let err = RelayError::Body(rejection.body_text());
            err.log();
            return err.into_response();
        }
        // The method gate answers before the body matters.
        Err(_) => Bytes::new(),
    };

    match relay.handle(&method, &body).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": SUCCESS_MESSAGE }))).into_response(),
        Err(err) => err.into_response(),
    }
}
