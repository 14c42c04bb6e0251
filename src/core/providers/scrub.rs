use crate::error::ServiceError;
use serde::Deserialize;
use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Prefixes of credentials the pipeline handles (OpenAI keys, Google API keys
/// and OAuth tokens, JWTs).
const PREFIX_PATTERNS: [&str; 5] = ["sk-", "AIza", "ya29.", "eyJ", "GOCSPX-"];

/// Markers followed by a credential value.
const MARKER_PATTERNS: [&str; 9] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "\"authorization\":\"Bearer ",
    "x-goog-api-key: ",
    "api_key=",
    "key=",
    "\"api_key\":\"",
    "\"token\":\"",
    // Telegram embeds the bot token in the request path.
    "/bot",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    input[from..]
        .char_indices()
        .find(|(_, c)| !is_secret_char(*c))
        .map_or(input.len(), |(i, _)| from + i)
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        if end == content_start {
            search_from = content_start;
            continue;
        }

        let replace_from = if keep_marker { content_start } else { start };
        scrubbed.replace_range(replace_from..end, REDACTED);
        search_from = replace_from + REDACTED.len();
    }
}

/// Redact credential-looking tokens from text bound for logs or errors.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_work = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_work {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for prefix in PREFIX_PATTERNS {
        scrub_after_marker(&mut scrubbed, prefix, false);
    }
    for marker in MARKER_PATTERNS {
        scrub_after_marker(&mut scrubbed, marker, true);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and cap the length of an upstream error body.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }
    let cut: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{cut}...")
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
}

/// Map a non-success HTTP response body to a [`ServiceError::Status`].
///
/// Understands the `{"error": {"code", "message", "status"}}` envelope used by
/// both generation APIs and falls back to the raw body.
pub fn status_error(service: &'static str, status: u16, body: &str) -> ServiceError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope.error.code.as_ref().and_then(serde_json::Value::as_i64);
            let mut message = envelope.error.message.unwrap_or_default();
            if let Some(status_text) = envelope.error.status {
                message = format!("{status_text}: {message}");
            }
            (code, message)
        }
        Err(_) => (None, body.to_string()),
    };
    ServiceError::Status {
        service,
        status,
        code,
        message: sanitize_api_error(&message),
    }
}

/// Read the body of a failed response and build a sanitized error from it.
pub async fn api_error(service: &'static str, response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    status_error(service, status, &body)
}
