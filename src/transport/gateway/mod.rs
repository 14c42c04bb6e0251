//! Axum HTTP boundary for health checks and run-now triggers.
//!
//! - Request body size limit (64KB max)
//! - Request timeout (30s)
//! - `X-Request-ID` echoed or generated on every response

mod handlers;
mod request_id;
mod server;

pub use request_id::{REQUEST_ID_HEADER, RequestId};
pub use server::{build_app, is_public_bind, run_gateway, run_gateway_with_listener};

use crate::pipeline::JobQueue;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub queue: JobQueue,
    pub env: String,
    pub tz: String,
}

#[cfg(test)]
mod tests;
