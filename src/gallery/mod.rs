//! Show photo gallery.
//!
//! Two ways to find photos, tried in this order:
//!
//! 1. **Spreadsheet** ([`sheet`]): one CSV row per photo, pivoted into shows by
//!    [`pivot::pivot_rows`]. Used when `gallery.sheet_url` is configured and the
//!    sheet loads with at least one show.
//! 2. **Directory index** ([`directory`]): `index.json` plus one
//!    `<slug>/photos.json` per show under the gallery base.
//!
//! [`Gallery`] holds the state a gallery view renders. It runs two kinds of
//! load, each with its own generation counter:
//!
//! - [`Gallery::load`] fetches the show list (sheet, then index),
//! - [`Gallery::select_show`] fetches one show's photos.
//!
//! Only the most recently started load of each kind may commit. A failed
//! photo file is reported for that show alone; selecting another show still
//! works.

pub mod directory;
pub mod pivot;
pub mod sheet;

pub use directory::{IndexError, PhotosError};
pub use pivot::{GalleryPhoto, ShowCollection, pivot_rows};
pub use sheet::{SheetError, SheetGallery};

use std::collections::BTreeMap;

use tokio::sync::watch;

use crate::assets::SiteAssets;
use crate::config::SiteConfig;
use crate::fetch::Fetch;
use crate::generation::Generations;
use crate::naming::humanize;

/// Spreadsheet status.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryLoadState {
    /// No spreadsheet configured.
    Disabled,
    Loading,
    Ready(SheetGallery),
    /// The spreadsheet failed; the directory index is in use.
    Error(String),
}

/// Photos of the active show.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoState {
    Idle,
    Loading,
    Loaded(Vec<GalleryPhoto>),
    Failed { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryView {
    pub sheet: GalleryLoadState,
    /// Show slugs in display order.
    pub shows: Vec<String>,
    pub active_show: Option<String>,
    pub photos: PhotoState,
}

impl GalleryView {
    fn initial(sheet_enabled: bool) -> Self {
        Self {
            sheet: if sheet_enabled {
                GalleryLoadState::Loading
            } else {
                GalleryLoadState::Disabled
            },
            shows: Vec::new(),
            active_show: None,
            photos: PhotoState::Idle,
        }
    }
}

/// Gallery state with "last request wins" loads.
pub struct Gallery<F> {
    fetcher: F,
    assets: SiteAssets,
    sheet_url: Option<String>,
    label_overrides: BTreeMap<String, String>,
    source_generations: Generations,
    photo_generations: Generations,
    view: watch::Sender<GalleryView>,
}

impl<F: Fetch> Gallery<F> {
    pub fn new(fetcher: F, config: &SiteConfig) -> Self {
        let sheet_url = config.gallery.sheet_url().map(str::to_string);
        let (view, _) = watch::channel(GalleryView::initial(sheet_url.is_some()));
        Self {
            fetcher,
            assets: SiteAssets::from_config(config),
            sheet_url,
            label_overrides: config.gallery.labels.clone(),
            source_generations: Generations::new(),
            photo_generations: Generations::new(),
            view,
        }
    }

    /// Current view snapshot.
    pub fn view(&self) -> GalleryView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GalleryView> {
        self.view.subscribe()
    }

    /// Load the show list.
    ///
    /// A committed load clears the active show. Returns `false` when a newer
    /// load started first; nothing was committed then.
    pub async fn load(&self) -> bool {
        let ticket = self.source_generations.begin();

        let sheet = match &self.sheet_url {
            None => GalleryLoadState::Disabled,
            Some(url) => {
                self.view.send_modify(|v| v.sheet = GalleryLoadState::Loading);
                match sheet::load_sheet(&self.fetcher, url).await {
                    Ok(sheet) => {
                        if let Some(message) = &sheet.message {
                            log::warn!("gallery spreadsheet: {message}");
                        }
                        GalleryLoadState::Ready(sheet)
                    }
                    Err(e) => {
                        log::warn!("gallery spreadsheet unavailable, using directory index: {e}");
                        GalleryLoadState::Error(e.to_string())
                    }
                }
            }
        };
        if !self.source_generations.is_current(ticket) {
            log::debug!("discarding superseded gallery load");
            return false;
        }

        let shows = match &sheet {
            GalleryLoadState::Ready(sheet) => sheet.collection.shows.clone(),
            _ => match directory::load_index(&self.fetcher, &self.assets).await {
                Ok(shows) => shows,
                Err(e) => {
                    log::warn!("gallery index unavailable: {e}");
                    Vec::new()
                }
            },
        };
        if !self.source_generations.is_current(ticket) {
            log::debug!("discarding superseded gallery load");
            return false;
        }

        // Invalidate any photo fetch started against the old show list.
        self.photo_generations.begin();
        self.view.send_replace(GalleryView {
            sheet,
            shows,
            active_show: None,
            photos: PhotoState::Idle,
        });
        true
    }

    /// Make `show` (or, given `None`, the first listed show) active and load
    /// its photos.
    ///
    /// Returns `false` when a newer selection started first. While the sheet
    /// is still loading the show stays `Loading` and nothing is fetched.
    pub async fn select_show(&self, show: Option<&str>) -> bool {
        let ticket = self.photo_generations.begin();

        let (slug, sheet_photos, sheet_loading) = {
            let view = self.view.borrow();
            let slug = show
                .map(str::to_string)
                .or_else(|| view.shows.first().cloned());
            let sheet_photos = match (&view.sheet, &slug) {
                (GalleryLoadState::Ready(sheet), Some(slug)) => Some(
                    sheet
                        .collection
                        .entries
                        .get(slug)
                        .cloned()
                        .unwrap_or_default(),
                ),
                _ => None,
            };
            let sheet_loading = matches!(view.sheet, GalleryLoadState::Loading);
            (slug, sheet_photos, sheet_loading)
        };

        let Some(slug) = slug else {
            self.view.send_modify(|v| {
                v.active_show = None;
                v.photos = PhotoState::Idle;
            });
            return true;
        };

        if sheet_loading {
            self.view.send_modify(|v| {
                v.active_show = Some(slug);
                v.photos = PhotoState::Loading;
            });
            return true;
        }

        if let Some(photos) = sheet_photos {
            self.view.send_modify(|v| {
                v.active_show = Some(slug);
                v.photos = PhotoState::Loaded(photos);
            });
            return true;
        }

        self.view.send_modify(|v| {
            v.active_show = Some(slug.clone());
            v.photos = PhotoState::Loading;
        });
        let result = directory::load_show_photos(&self.fetcher, &self.assets, &slug).await;
        if !self.photo_generations.is_current(ticket) {
            log::debug!("discarding superseded photo load for {slug}");
            return false;
        }

        let photos = match result {
            Ok(photos) => PhotoState::Loaded(photos),
            Err(e) => {
                log::warn!("{e}");
                PhotoState::Failed {
                    path: e.path().to_string(),
                    message: e.to_string(),
                }
            }
        };
        self.view.send_modify(|v| v.photos = photos);
        true
    }

    /// Display label for a show.
    pub fn label_for(&self, slug: &str) -> String {
        if let GalleryLoadState::Ready(sheet) = &self.view.borrow().sheet
            && let Some(label) = sheet.collection.labels.get(slug)
        {
            return label.clone();
        }
        self.label_overrides
            .get(slug)
            .cloned()
            .unwrap_or_else(|| humanize(slug))
    }

    /// Displayable URL for a photo.
    pub fn photo_url(&self, photo: &GalleryPhoto) -> String {
        self.assets.gallery_asset(&photo.src)
    }

    /// Where the directory index keeps `slug`'s photos.
    pub fn photos_path(&self, slug: &str) -> String {
        directory::photos_path(&self.assets, slug)
    }
}
