use super::backend::BatchError;
use crate::error::ServiceError;
use std::fmt::Display;
use std::future::Future;

const TRANSIENT_TOKENS: [&str; 6] = [
    " 500",
    " 502",
    " 503",
    " 504",
    "5xx",
    "temporarily unavailable",
];

/// Errors that can say whether a second attempt is worth making.
pub trait TransientFailure {
    fn is_transient(&self) -> bool;
}

impl TransientFailure for ServiceError {
    fn is_transient(&self) -> bool {
        is_transient(self)
    }
}

impl TransientFailure for BatchError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Service(err) => is_transient(err),
            Self::Unavailable(_) | Self::MalformedShape(_) => false,
        }
    }
}

fn is_server_code(code: i64) -> bool {
    (500..600).contains(&code)
}

fn has_transient_token(message: &str) -> bool {
    let lowered = message.to_lowercase();
    TRANSIENT_TOKENS.iter().any(|token| lowered.contains(token))
}

/// Transport failures, any 5xx status or embedded code, and messages carrying
/// a 5xx or "temporarily unavailable" token.
pub fn is_transient(err: &ServiceError) -> bool {
    match err {
        ServiceError::Transport { .. } => true,
        ServiceError::Status {
            status,
            code,
            message,
            ..
        } => {
            is_server_code(i64::from(*status))
                || code.is_some_and(is_server_code)
                || has_transient_token(message)
        }
        ServiceError::Other { code, message, .. } => {
            code.is_some_and(is_server_code) || has_transient_token(message)
        }
        ServiceError::Decode { message, .. } => has_transient_token(message),
        ServiceError::MissingCredentials { .. } => false,
    }
}

/// Run `call`, and run it exactly once more if the first failure is transient.
pub async fn run_with_retry<T, E, F, Fut>(operation: &str, mut call: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: TransientFailure + Display,
{
    match call().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_transient() => {
            tracing::warn!(operation, error = %err, "transient failure, retrying once");
            call().await
        }
        Err(err) => Err(err),
    }
}
