//! Directory-index protocol.
//!
//! Used when no gallery spreadsheet is configured (or it failed). The gallery
//! base holds a plain listing of show slugs and one photo file per show:
//!
//! ```text
//! <gallery base>/index.json          ["nemo", "matilda"]
//! <gallery base>/nemo/photos.json    [{"src": "nemo/001.jpg", "caption": ""}]
//! ```
//!
//! Photo files are consumed as-is: no pivoting, no reordering. Only the
//! display strings (`alt`, `caption`) pass through the sanitizer.

use serde_json::Value;
use thiserror::Error;

use super::pivot::GalleryPhoto;
use crate::assets::SiteAssets;
use crate::fetch::{Fetch, FetchError};
use crate::sanitize::sanitize;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid index.json: {0}")]
    Json(String),
    #[error("index.json is not an array")]
    NotAnArray,
}

/// A per-show photo file that could not be used. Every variant names the path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhotosError {
    #[error("could not load {path}: {source}")]
    Fetch { path: String, source: FetchError },
    #[error("invalid JSON in {path}: {message}")]
    Json { path: String, message: String },
    #[error("{path} is not an array of photos")]
    NotAnArray { path: String },
}

impl PhotosError {
    pub fn path(&self) -> &str {
        match self {
            PhotosError::Fetch { path, .. }
            | PhotosError::Json { path, .. }
            | PhotosError::NotAnArray { path } => path,
        }
    }
}

/// Where a show's photo file lives.
pub fn photos_path(assets: &SiteAssets, slug: &str) -> String {
    assets.gallery_asset(&format!("{slug}/photos.json"))
}

/// Fetch the list of show slugs. Non-string and blank items are skipped.
pub async fn load_index<F: Fetch>(
    fetcher: &F,
    assets: &SiteAssets,
) -> Result<Vec<String>, IndexError> {
    let text = fetcher.fetch_text(&assets.gallery_asset("index.json")).await?;
    let value: Value = serde_json::from_str(&text).map_err(|e| IndexError::Json(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(IndexError::NotAnArray);
    };
    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect())
}

/// Fetch one show's photo file.
///
/// Items that are not objects or have no `src` are skipped.
pub async fn load_show_photos<F: Fetch>(
    fetcher: &F,
    assets: &SiteAssets,
    slug: &str,
) -> Result<Vec<GalleryPhoto>, PhotosError> {
    let path = photos_path(assets, slug);
    let text = match fetcher.fetch_text(&path).await {
        Ok(text) => text,
        Err(source) => return Err(PhotosError::Fetch { path, source }),
    };
    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            return Err(PhotosError::Json {
                path,
                message: e.to_string(),
            });
        }
    };
    let Value::Array(items) = value else {
        return Err(PhotosError::NotAnArray { path });
    };

    let text_field = |item: &Value, key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(|s| sanitize(s.trim()))
            .unwrap_or_default()
    };
    Ok(items
        .iter()
        .filter_map(|item| {
            let src = item.get("src")?.as_str()?.trim();
            (!src.is_empty()).then(|| GalleryPhoto {
                src: src.to_string(),
                alt: text_field(item, "alt"),
                caption: text_field(item, "caption"),
            })
        })
        .collect())
}
