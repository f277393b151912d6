//! Slug derivation for category names.

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, drops everything that is not alphanumeric or whitespace,
/// collapses whitespace runs to single hyphens, and trims leading/trailing
/// hyphens. Deterministic: the same name always yields the same slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() {
            pending_hyphen = true;
        }
        // Anything else (punctuation, symbols) is stripped outright.
    }

    slug
}
