/// PNG magic bytes: `89 50 4E 47 0D 0A 1A 0A`.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[must_use]
pub fn has_png_signature(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

/// Declared content type is `image/png`, parameters and case ignored.
pub fn is_png_mime(raw: &str) -> bool {
    raw.trim()
        .parse::<mime::Mime>()
        .is_ok_and(|m| m.type_() == mime::IMAGE && m.subtype() == mime::PNG)
}

/// Warn when a payload claimed to be PNG does not carry the PNG signature.
///
/// Advisory only: the payload is still used. Returns whether the signature
/// matched so callers can count mismatches.
pub fn sniff_png(data: &[u8], source: &str) -> bool {
    if has_png_signature(data) {
        return true;
    }
    let detected = detect_mime(data);
    tracing::warn!(
        source,
        bytes = data.len(),
        detected_mime = detected.as_deref().unwrap_or("unknown"),
        reason = "missing_signature",
        "payload does not look like PNG"
    );
    false
}
