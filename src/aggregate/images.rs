//! Image payload normalisation and ordered de-duplication.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Canonical form of an image payload, or `None` when empty.
///
/// URLs and data URIs are kept as-is (trimmed); bare base64 is promoted to a
/// data URI whose MIME type is sniffed from the decoded header.
pub fn normalize_image(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("data:") || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    if !looks_like_base64(trimmed) {
        return Some(trimmed.to_string());
    }
    let mime = sniff_mime(trimmed).unwrap_or(DEFAULT_IMAGE_MIME);
    Some(format!("data:{mime};base64,{trimmed}"))
}

fn looks_like_base64(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// MIME type from the magic bytes at the start of a base64 payload.
fn sniff_mime(encoded: &str) -> Option<&'static str> {
    // 16 base64 characters decode to the 12 header bytes needed below.
    let prefix_len = encoded.len().min(16) / 4 * 4;
    let header = STANDARD.decode(&encoded[..prefix_len]).ok()?;
    match header.as_slice() {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// Insertion-ordered set of normalised images.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ImageSet {
    /// Normalise and insert. Returns the canonical payload when it is new.
    pub fn insert(&mut self, raw: &str) -> Option<String> {
        let normalized = normalize_image(raw)?;
        if !self.seen.insert(normalized.clone()) {
            return None;
        }
        self.order.push(normalized.clone());
        Some(normalized)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}
