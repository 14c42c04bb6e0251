use super::handlers::{handle_health, handle_run_now};
use super::request_id::propagate_request_id;
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
pub fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Bind `host:port` and serve until `shutdown` fires.
pub async fn run_gateway(
    host: &str,
    port: u16,
    allow_public_bind: bool,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<()> {
    if is_public_bind(host) && !allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway has no authentication.\n\
             Fix: use --host 127.0.0.1 (default), put it behind a proxy, or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(host, listener, state, shutdown).await
}

/// Serve from a pre-bound listener until `shutdown` fires.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    print_gateway_banner(&display_addr, &state);
    tracing::info!(addr = %display_addr, env = %state.env, "gateway listening");

    let app = build_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

fn print_gateway_banner(display_addr: &str, state: &AppState) {
    println!("Gateway listening on {display_addr} (env={})", state.env);
    println!("  GET  /health");
    println!("  POST /run-now");
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/run-now", post(handle_run_now))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(middleware::from_fn(propagate_request_id))
}
