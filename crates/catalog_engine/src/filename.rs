use sha2::{Digest, Sha256};

const DEFAULT_EXTENSION: &str = "jpg";
const MAX_EXTENSION_LEN: usize = 5;

/// Deterministic, filesystem-safe media filename:
/// `{sanitized_sku}_{short_hash(url)}.{ext}`.
///
/// The hash ties the name to the source URL so distinct images of one
/// product never collide; the extension comes from the URL when it looks
/// like a real one, otherwise [`DEFAULT_EXTENSION`].
pub fn media_filename(sku: &str, url: &str) -> String {
    let sku = sanitize_sku(sku);
    let hash = short_hash(url);
    let ext = extension_for(url);
    format!("{sku}_{hash}.{ext}")
}

fn sanitize_sku(input: &str) -> String {
    let cleaned: String = input
        .trim()
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        return "unknown".to_string();
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

/// Extension taken from the final path segment when it is short and
/// alphanumeric; query strings and fragments do not count.
fn extension_for(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
