//! Slug and display-label conventions shared by the gallery loaders.
//!
//! Shows are identified by a slug everywhere: spreadsheet rows, directory
//! names under the gallery base, and page URLs. A slug is derived from
//! whatever staff typed (a show title, a folder name, an existing slug) and
//! must come out the same for all of them:
//!
//! - `"Finding Nemo Jr."` → `finding-nemo-jr`
//! - `"finding-nemo-jr"` → `finding-nemo-jr`
//! - `"  The Secret Garden!! "` → `the-secret-garden`
//!
//! ## Display Labels
//!
//! When no label is supplied for a show, the slug is humanized: dashes become
//! spaces and every word starts with a capital letter (`secret-garden` →
//! "Secret Garden").

/// Derive a URL-safe slug from free text.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-`, and trims leading/trailing dashes. Non-ASCII letters count as
/// separators. Returns an empty string when nothing alphanumeric remains.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Turn a slug into a display label: `secret-garden` → "Secret Garden".
pub fn humanize(slug: &str) -> String {
    let mut label = String::with_capacity(slug.len());
    let mut in_word = false;
    for c in slug.chars() {
        let c = if c == '-' { ' ' } else { c };
        let word_char = c.is_ascii_alphanumeric() || c == '_';
        if word_char && !in_word {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        in_word = word_char;
    }
    label
}
