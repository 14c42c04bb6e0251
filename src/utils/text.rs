use sha2::{Digest, Sha256};

/// Number of hex characters kept from a content digest in log lines.
pub const FINGERPRINT_LEN: usize = 12;

/// Telegram caption budget used for text-only fallbacks.
pub const CAPTION_LIMIT: usize = 1024;

#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Short one-way fingerprint of `text` for audit logs.
///
/// Lets operators correlate log lines about the same prompt without the
/// prompt itself ever being written out.
#[must_use]
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Drop control characters (except newline, carriage return and tab) and cap
/// the caption at `limit` characters.
#[must_use]
pub fn sanitize_caption(caption: &str, limit: usize) -> String {
    caption
        .chars()
        .filter(|ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t'))
        .take(limit)
        .collect()
}
