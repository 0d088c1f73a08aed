//! Directory-index generator.
//!
//! Builds the files the directory-index protocol reads from a folder of
//! show directories:
//!
//! ```text
//! public/shows/                      public/shows/
//! ├── matilda/                       ├── index.json          ["matilda", "nemo"]
//! │   ├── 01.jpg          ──►        ├── matilda/photos.json
//! │   └── notes.txt                  └── nemo/photos.json
//! └── nemo/
//!     ├── B.PNG
//!     └── a.jpg
//! ```
//!
//! Every subdirectory is a show, named by its directory name. Hidden entries
//! are skipped. Photos are the files with an image extension, sorted by file
//! name; each becomes `{"src": "<show>/<file>", "caption": ""}`, relative to
//! the gallery base the site resolves photo paths against. A non-empty prefix
//! (such as a CDN URL) is written in front instead: `<prefix>/<show>/<file>`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extensions (lowercase) treated as photos.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Error, Debug)]
pub enum GenIndexError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedPhoto {
    pub src: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowListing {
    pub slug: String,
    pub photos: Vec<IndexedPhoto>,
}

/// Everything `gen-index` writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryIndex {
    pub shows: Vec<ShowListing>,
}

impl GalleryIndex {
    pub fn slugs(&self) -> Vec<&str> {
        self.shows.iter().map(|s| s.slug.as_str()).collect()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_image(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Immediate, visible children of `dir`, sorted by file name.
fn children(dir: &Path) -> impl Iterator<Item = Result<DirEntry, walkdir::Error>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
}

/// Read the show directories under `root`. An empty `prefix` keeps photo
/// paths relative to the gallery base.
pub fn scan_shows(root: &Path, prefix: &str) -> Result<GalleryIndex, GenIndexError> {
    if !root.is_dir() {
        return Err(GenIndexError::NotADirectory(root.to_path_buf()));
    }
    let prefix = prefix.trim_end_matches('/');

    let mut index = GalleryIndex::default();
    for entry in children(root) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let slug = entry.file_name().to_string_lossy().into_owned();

        let mut photos = Vec::new();
        for file in children(entry.path()) {
            let file = file?;
            if !is_image(&file) {
                continue;
            }
            let relative = format!("{slug}/{}", file.file_name().to_string_lossy());
            let src = if prefix.is_empty() {
                relative
            } else {
                format!("{prefix}/{relative}")
            };
            photos.push(IndexedPhoto {
                src,
                caption: String::new(),
            });
        }
        index.shows.push(ShowListing { slug, photos });
    }
    Ok(index)
}

/// Write `index.json` and every show's `photos.json` under `root`.
pub fn write_index(root: &Path, index: &GalleryIndex) -> Result<(), GenIndexError> {
    let listing = serde_json::to_string_pretty(&index.slugs())?;
    fs::write(root.join("index.json"), listing)?;
    for show in &index.shows {
        let photos = serde_json::to_string_pretty(&show.photos)?;
        fs::write(root.join(&show.slug).join("photos.json"), photos)?;
    }
    log::debug!("wrote {} photo files under {}", index.shows.len(), root.display());
    Ok(())
}

/// Scan `root` and write its index files.
pub fn generate(root: &Path, prefix: &str) -> Result<GalleryIndex, GenIndexError> {
    let index = scan_shows(root, prefix)?;
    write_index(root, &index)?;
    Ok(index)
}
