use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `nanobanana`.
///
/// Each pipeline stage defines its own error type. The orchestrator matches on
/// these to decide what to log; binaries and CLI glue continue to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Prompt synthesis ────────────────────────────────────────────────
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),

    // ── Image generation ────────────────────────────────────────────────
    #[error("images: {0}")]
    Image(#[from] ImageError),

    // ── Delivery ────────────────────────────────────────────────────────
    #[error("delivery: {0}")]
    Delivery(#[from] DeliveryError),

    // ── Channel session ─────────────────────────────────────────────────
    #[error("channel: {0}")]
    Channel(#[from] ChannelError),

    // ── Job queue ───────────────────────────────────────────────────────
    #[error("queue: {0}")]
    Queue(#[from] QueueError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── External service errors ─────────────────────────────────────────────────

/// Coarse classification of a failed HTTP exchange before any response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Connect,
    Timeout,
    Request,
    Body,
}

/// A failed call to an external generation service.
///
/// The variants keep the inputs the transient-failure predicate needs
/// (transport kind, HTTP status, embedded error code, message) as data.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} transport error ({kind:?}): {message}")]
    Transport {
        service: &'static str,
        kind: TransportKind,
        message: String,
    },

    #[error("{service} returned HTTP {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} credentials are not configured")]
    MissingCredentials { service: &'static str },

    #[error("{service}: {message}")]
    Other {
        service: &'static str,
        code: Option<i64>,
        message: String,
    },
}

impl ServiceError {
    pub fn from_reqwest(service: &'static str, err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportKind::Body
        } else {
            TransportKind::Request
        };
        Self::Transport {
            service,
            kind,
            message: err.to_string(),
        }
    }
}

// ─── Prompt synthesis errors ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    #[error("generation timed out after {waited_secs}s")]
    GenerationTimeout { waited_secs: u64 },

    #[error("generation produced no assistant text")]
    NoTextResponse,

    #[error("generation produced an empty prompt")]
    EmptyPrompt,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

// ─── Image generation errors ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image request: {0}")]
    InvalidInput(String),

    #[error("no images generated")]
    NoImagesGenerated,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

// ─── Channel errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("rate limited by channel (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("message is too long for the channel")]
    MessageTooLong,

    #[error("writing to the target chat is forbidden: {0}")]
    WriteForbidden(String),

    #[error("channel session not authorized: {0}")]
    Unauthorized(String),

    #[error("channel transport error: {0}")]
    Transport(String),

    #[error("channel API error {status}: {description}")]
    Api { status: u16, description: String },

    #[error("channel session: {0}")]
    Session(String),
}

// ─── Delivery errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("too many images for one album: {count} (limit {limit})")]
    TooManyImages { count: usize, limit: usize },

    #[error("delivery failed during {action}: {source}")]
    Failed {
        action: &'static str,
        #[source]
        source: ChannelError,
    },
}

// ─── Queue errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue is full; job {job_id} could not be enqueued")]
    Full { job_id: String },

    #[error("queue worker has shut down")]
    Closed,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
