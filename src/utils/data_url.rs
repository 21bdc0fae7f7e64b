//! Conversion of uploaded base64 photos into `data:` URLs for multimodal prompts

use base64::{Engine as _, engine::general_purpose::STANDARD};

const FALLBACK_MIME: &str = "image/jpeg";

/// Enough encoded characters to decode the magic bytes of every common image format
const SNIFF_CHARS: usize = 64;

/// Build a `data:` URL for an image, sniffing its MIME type from the decoded header.
///
/// Input that is already a data URL is returned unchanged.
pub fn image_data_url(image_base64: &str) -> String {
    let trimmed = image_base64.trim();
    if trimmed.starts_with("data:") {
        return trimmed.to_string();
    }

    format!("data:{};base64,{}", sniff_mime_type(trimmed), trimmed)
}

/// Best-effort MIME detection; anything unrecognized is treated as JPEG
pub fn sniff_mime_type(image_base64: &str) -> &'static str {
    let head: String = image_base64.chars().take(SNIFF_CHARS).collect();
    // 64 is a multiple of 4, so a full head always decodes without padding issues
    let Ok(bytes) = STANDARD.decode(head.as_bytes()) else {
        return FALLBACK_MIME;
    };

    match infer::get(&bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind.mime_type(),
        _ => FALLBACK_MIME,
    }
}
