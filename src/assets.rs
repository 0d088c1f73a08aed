//! Asset URL resolution.
//!
//! Data files and photos are referenced with paths relative to a configured
//! base. Bases are normalized once when [`SiteAssets`] is built; resolving a
//! path afterwards is a pure string join:
//!
//! ```text
//! gallery base "/shows":   "a.png"                → "/shows/a.png"
//!                          "/nemo/photos.json"    → "/shows/nemo/photos.json"
//!                          "https://x.com/a.png"  → "https://x.com/a.png"
//!                          ""                     → ""
//! ```

use crate::config::SiteConfig;

/// True for `http://` and `https://` URLs (scheme compared case-insensitively).
pub fn is_absolute_url(path: &str) -> bool {
    let head = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Joins relative paths onto one precomputed base.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetResolver {
    base: String,
}

impl AssetResolver {
    /// Build a resolver; `base` is used verbatim minus trailing slashes.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve `path` against the base.
    ///
    /// Absolute URLs pass through unchanged, empty input gives empty output,
    /// and anything else gets exactly one leading slash before being appended.
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() || is_absolute_url(path) {
            return path.to_string();
        }
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

/// The two asset bases the site uses, derived once from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteAssets {
    public: AssetResolver,
    gallery: AssetResolver,
}

impl SiteAssets {
    pub fn from_config(config: &SiteConfig) -> Self {
        let public_base = normalize_base("", &config.base_url);
        let gallery_base = normalize_base(&public_base, &config.gallery.base_url);
        Self {
            public: AssetResolver::new(&public_base),
            gallery: AssetResolver::new(&gallery_base),
        }
    }

    /// Resolve a path under the static asset base.
    pub fn public_asset(&self, path: &str) -> String {
        self.public.resolve(path)
    }

    /// Resolve a path under the gallery base.
    pub fn gallery_asset(&self, path: &str) -> String {
        self.gallery.resolve(path)
    }

    pub fn gallery_base(&self) -> &str {
        self.gallery.base()
    }
}

/// Normalize a configured base: absolute URLs lose their trailing slash,
/// paths get one leading slash and are nested under `parent`.
fn normalize_base(parent: &str, raw: &str) -> String {
    let raw = raw.trim();
    if is_absolute_url(raw) {
        return raw.trim_end_matches('/').to_string();
    }
    let path = raw.trim_matches('/');
    if path.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{path}")
    }
}
