use super::scrub::{api_error, scrub_secret_patterns};
use crate::error::{ServiceError, TransportKind};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub fn build_provider_client() -> Client {
    build_provider_client_with_timeout(120)
}

pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Classify a reqwest failure, with any credential in the URL scrubbed.
pub fn transport_error(service: &'static str, err: &reqwest::Error) -> ServiceError {
    match ServiceError::from_reqwest(service, err) {
        ServiceError::Transport {
            service,
            kind,
            message,
        } => ServiceError::Transport {
            service,
            kind,
            message: scrub_secret_patterns(&message).into_owned(),
        },
        other => other,
    }
}

/// Send a prepared request and decode a JSON success body.
///
/// Non-2xx responses become [`ServiceError::Status`]; transport failures keep
/// their [`TransportKind`] so the retry predicate can see them.
pub async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, ServiceError> {
    let response = request
        .send()
        .await
        .map_err(|err| transport_error(service, &err))?;

    if !response.status().is_success() {
        return Err(api_error(service, response).await);
    }

    let body = response.bytes().await.map_err(|err| ServiceError::Transport {
        service,
        kind: TransportKind::Body,
        message: scrub_secret_patterns(&err.to_string()).into_owned(),
    })?;
    serde_json::from_slice(&body).map_err(|err| ServiceError::Decode {
        service,
        message: err.to_string(),
    })
}
