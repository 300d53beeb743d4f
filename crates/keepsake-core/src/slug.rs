//! Slug generation

/// Derive a URL-safe slug from an album name.
///
/// Lowercases, strips everything outside `[a-z0-9 -]`, turns whitespace
/// runs into single dashes and collapses repeated dashes. Names made up
/// entirely of stripped characters produce an empty slug; callers must
/// reject those.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
        // Everything else is dropped
    }

    slug
}
