//! Site configuration module.
//!
//! Handles loading, validating, and layering the configuration that tells the
//! loaders where their data lives. Configuration is built once at startup and
//! passed by reference to every loader; nothing reads it from global state.
//!
//! ## Layers
//!
//! Later layers override earlier ones:
//!
//! ```text
//! stock defaults  →  config.toml  →  MARQUEE_* environment variables
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # origin = "https://example.org"   # Needed to fetch site-relative URLs
//! base_url = "/"                      # Static asset base path
//!
//! [schedule]
//! # csv_url = "..."    # default: <base_url>/class-schedule/index.csv
//! # json_url = "..."   # default: <base_url>/class-schedule/index.json
//!
//! [gallery]
//! base_url = "/shows"  # Path or absolute URL of the directory index
//! # sheet_url = "..."  # Gallery spreadsheet (CSV); unset = directory index
//!
//! [gallery.labels]     # Display labels for directory-index shows
//! nemo = "Finding Nemo Jr."
//! ```
//!
//! ## Environment
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `MARQUEE_ORIGIN` | `origin` |
//! | `MARQUEE_BASE_URL` | `base_url` |
//! | `MARQUEE_GALLERY_BASE_URL` | `gallery.base_url` |
//! | `MARQUEE_GALLERY_SHEET_URL` | `gallery.sheet_url` |
//! | `MARQUEE_SCHEDULE_CSV_URL` | `schedule.csv_url` |
//! | `MARQUEE_SCHEDULE_JSON_URL` | `schedule.json_url` |
//!
//! Values are trimmed; blank values are ignored. Unknown keys in
//! `config.toml` are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::assets::is_absolute_url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml` and the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute origin used to fetch site-relative URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Base path for static assets.
    pub base_url: String,
    pub schedule: ScheduleConfig,
    pub gallery: GalleryConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: None,
            base_url: "/".to_string(),
            schedule: ScheduleConfig::default(),
            gallery: GalleryConfig::default(),
        }
    }
}

/// Override URLs for the class schedule sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_url: Option<String>,
}

impl ScheduleConfig {
    pub fn csv_url(&self) -> Option<&str> {
        non_blank(&self.csv_url)
    }

    pub fn json_url(&self) -> Option<&str> {
        non_blank(&self.json_url)
    }
}

/// Gallery data locations and label overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Base path or absolute URL holding `index.json` and `<slug>/photos.json`.
    pub base_url: String,
    /// Gallery spreadsheet. When unset the directory index is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
    /// Display labels keyed by show slug.
    pub labels: BTreeMap<String, String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: "/shows".to_string(),
            sheet_url: None,
            labels: default_show_labels(),
        }
    }
}

impl GalleryConfig {
    pub fn sheet_url(&self) -> Option<&str> {
        non_blank(&self.sheet_url)
    }
}

fn default_show_labels() -> BTreeMap<String, String> {
    [
        ("nemo", "Finding Nemo Jr."),
        ("matilda", "Matilda Jr."),
        ("secret-garden", "The Secret Garden"),
    ]
    .into_iter()
    .map(|(slug, label)| (slug.to_string(), label.to_string()))
    .collect()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(origin) = non_blank(&self.origin)
            && !is_absolute_url(origin)
        {
            return Err(ConfigError::Validation(format!(
                "origin must start with http:// or https:// (got {origin:?})"
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".into()));
        }
        if self.gallery.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gallery.base_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn origin(&self) -> Option<&str> {
        non_blank(&self.origin)
    }

    /// Apply `MARQUEE_*` overrides from `lookup` (usually `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(v) = get("MARQUEE_ORIGIN") {
            self.origin = Some(v);
        }
        if let Some(v) = get("MARQUEE_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = get("MARQUEE_GALLERY_BASE_URL") {
            self.gallery.base_url = v;
        }
        if let Some(v) = get("MARQUEE_GALLERY_SHEET_URL") {
            self.gallery.sheet_url = Some(v);
        }
        if let Some(v) = get("MARQUEE_SCHEDULE_CSV_URL") {
            self.schedule.csv_url = Some(v);
        }
        if let Some(v) = get("MARQUEE_SCHEDULE_JSON_URL") {
            self.schedule.json_url = Some(v);
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. A missing file is `Ok(None)`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value and deserialize.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    Ok(config)
}

/// Load the full configuration: stock defaults, then the file at `path` (if
/// present), then environment overrides from `lookup`. Validates the result.
pub fn load_config(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(stock_defaults_value(), overlay)?;
    config.apply_env(lookup);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Marquee Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Every setting can also be overridden
# with a MARQUEE_* environment variable (see below). Unknown keys are errors.

# Absolute origin used to fetch site-relative URLs such as
# "/class-schedule/index.csv". Without it only absolute URLs can be fetched.
# Env: MARQUEE_ORIGIN
# origin = "https://example.org"

# Base path for static assets. Env: MARQUEE_BASE_URL
base_url = "/"

# ---------------------------------------------------------------------------
# Class schedule
# ---------------------------------------------------------------------------
# Sources are tried in order: CSV, JSON, then the bundled fallback schedule.
[schedule]
# Env: MARQUEE_SCHEDULE_CSV_URL (default: <base_url>/class-schedule/index.csv)
# csv_url = "https://docs.google.com/spreadsheets/d/.../export?format=csv"

# Env: MARQUEE_SCHEDULE_JSON_URL (default: <base_url>/class-schedule/index.json)
# json_url = "/class-schedule/index.json"

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
# Path (under base_url) or absolute URL of the directory index:
#   <base_url>/index.json and <base_url>/<show>/photos.json
# Env: MARQUEE_GALLERY_BASE_URL
base_url = "/shows"

# Gallery spreadsheet (CSV, one row per photo). When set it replaces the
# directory index. Env: MARQUEE_GALLERY_SHEET_URL
# sheet_url = "https://docs.google.com/spreadsheets/d/.../export?format=csv"

# Display labels for shows listed by the directory index.
# Shows without a label here are shown as "Title Cased Slug".
[gallery.labels]
matilda = "Matilda Jr."
nemo = "Finding Nemo Jr."
secret-garden = "The Secret Garden"
"##
}
