//! URL-safe slug generation

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Slug returned when nothing usable survives normalization
pub const FALLBACK_SLUG: &str = "unknown";

/// Turns arbitrary text into a URL-safe slug.
///
/// Lower-cases, strips diacritics, keeps only `[a-z0-9]`, whitespace and
/// `-`, then folds whitespace and dash runs into single dashes and trims
/// them at both ends. Never fails: text with nothing usable yields
/// [`FALLBACK_SLUG`].
pub fn normalize(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    let kept = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect::<String>();

    for c in kept.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(c);
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
