//! Canonical key construction: `"{title} - {artist}"`, safe as one directory name.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Used when sanitizing leaves nothing usable.
const FALLBACK_KEY: &str = "_";

/// Builds the canonical key for an album.
pub fn canonical_key(title: &str, artist: &str) -> String {
    sanitize_key(&format!("{} - {}", title, artist))
}

/// Sanitizes a candidate directory name.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Trims leading/trailing whitespace and dots
/// - Limits length to 255 bytes
/// - Never returns "", "." or ".."
///
/// Inner spaces are kept so keys match directories created by earlier runs.
pub fn sanitize_key(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');

    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let key = trimmed[..take].trim_end();

    if key.is_empty() || key == "." || key == ".." {
        FALLBACK_KEY.to_string()
    } else {
        key.to_string()
    }
}
