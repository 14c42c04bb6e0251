//! Process-wide `tracing` subscriber setup.
//!
//! JSON output includes the current span and the span list, so the
//! `request_id`, `job_id` and `run_number` fields recorded on the gateway and
//! worker spans appear on every line emitted inside them.

use crate::config::{AppConfig, LogFormat};
use tracing_subscriber::EnvFilter;

const FALLBACK_LEVEL: &str = "info";

/// `RUST_LOG` wins when set; otherwise `app.log_level`, then `info`.
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

pub fn init_logging(app: &AppConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&app.log_level))
        .with_target(true);

    let result = match app.log_format {
        LogFormat::Json => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    result.map_err(|err| anyhow::anyhow!("install tracing subscriber: {err}"))
}
