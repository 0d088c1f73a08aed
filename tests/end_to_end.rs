//! End-to-end loads against fixture exports, through the public API only.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use marquee::config::SiteConfig;
use marquee::fetch::{Fetch, FetchError};
use marquee::gallery::{Gallery, GalleryLoadState, PhotoState};
use marquee::gen_index;
use marquee::schedule::{ClassSchedule, ScheduleSources, ScheduleStatus};
use tempfile::TempDir;

const SCHEDULE_CSV: &str = include_str!("../fixtures/class_schedule.csv");
const GALLERY_SHEET: &str = include_str!("../fixtures/gallery_sheet.csv");

const CSV_URL: &str = "https://docs.example.org/schedule.csv";
const JSON_URL: &str = "https://docs.example.org/schedule.json";
const SHEET_URL: &str = "https://docs.example.org/gallery.csv";

/// Serves fixed bodies by URL; anything else is a 404.
#[derive(Default)]
struct MapFetcher {
    bodies: HashMap<String, String>,
}

impl MapFetcher {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

impl Fetch for MapFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.bodies.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Serves files from a directory as if it were mounted at `/shows`.
struct DirFetcher {
    root: PathBuf,
}

impl Fetch for DirFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let not_found = || FetchError::Status {
            url: url.to_string(),
            status: 404,
        };
        let relative = url.strip_prefix("/shows/").ok_or_else(not_found)?;
        fs::read_to_string(self.root.join(relative)).map_err(|_| not_found())
    }
}

fn schedule_sources() -> ScheduleSources {
    ScheduleSources {
        csv_url: CSV_URL.into(),
        json_url: JSON_URL.into(),
    }
}

fn sheet_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.gallery.sheet_url = Some(SHEET_URL.into());
    config
}

// =========================================================================
// Schedule
// =========================================================================

#[tokio::test]
async fn schedule_csv_export_loads_with_notes() {
    let schedule = ClassSchedule::new(MapFetcher::default().with(CSV_URL, SCHEDULE_CSV));
    assert!(schedule.load(&schedule_sources()).await);

    let state = schedule.state();
    assert!(!state.loading);
    assert!(!state.using_fallback);

    let titles: Vec<&str> = state.entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Musical Theater Foundations", "Teen Acting Lab", "Youth Choir"]
    );
    assert_eq!(state.entries[1].status, ScheduleStatus::Waitlist);
    assert_eq!(state.entries[1].description, "<em>Scene study</em>");
    assert_eq!(state.entries[2].fees, "");

    let diagnostic = state.diagnostic.unwrap();
    assert!(diagnostic.contains("Row 5: expected 13 fields, found 12"));
    assert!(diagnostic.contains("Row 4: missing title, skipped"));
}

#[tokio::test]
async fn schedule_json_used_when_csv_missing() {
    let json = r#"[{"status": "open", "title": "Improv Club", "openings": 8}]"#;
    let schedule = ClassSchedule::new(MapFetcher::default().with(JSON_URL, json));
    schedule.load(&schedule_sources()).await;

    let state = schedule.state();
    assert!(!state.using_fallback);
    assert_eq!(state.entries.len(), 1);
    assert_eq!(state.entries[0].openings, "8");
    assert!(state.diagnostic.unwrap().starts_with("CSV: HTTP 404"));
}

#[tokio::test]
async fn schedule_never_empty_when_everything_fails() {
    let schedule = ClassSchedule::new(MapFetcher::default());
    schedule.load(&schedule_sources()).await;

    let state = schedule.state();
    assert!(state.using_fallback);
    assert!(!state.entries.is_empty());
}

// =========================================================================
// Gallery
// =========================================================================

#[tokio::test]
async fn gallery_sheet_pivots_into_ordered_shows() {
    let gallery = Gallery::new(
        MapFetcher::default().with(SHEET_URL, GALLERY_SHEET),
        &sheet_config(),
    );
    gallery.load().await;

    let view = gallery.view();
    assert_eq!(view.shows, vec!["matilda-jr", "finding-nemo-jr"]);
    match &view.sheet {
        GalleryLoadState::Ready(sheet) => assert_eq!(
            sheet.message.as_deref(),
            Some(
                "2 parsing warning(s) \
                 • Row 7: Missing slug/show identifier. \
                 • Row 8: Missing photo source for secret-garden."
            )
        ),
        other => panic!("expected a ready sheet, got {other:?}"),
    }
    // Named only by a row without a photo, so only the configured label applies.
    assert_eq!(gallery.label_for("secret-garden"), "The Secret Garden");

    gallery.select_show(Some("finding-nemo-jr")).await;
    let PhotoState::Loaded(nemo) = gallery.view().photos else {
        panic!("nemo photos should come from the sheet");
    };
    let alts: Vec<&str> = nemo.iter().map(|p| p.alt.as_str()).collect();
    assert_eq!(alts, vec!["The reef opening number", "Dory and Marlin", "Curtain call"]);

    gallery.select_show(None).await;
    let PhotoState::Loaded(matilda) = gallery.view().photos else {
        panic!("matilda photos should come from the sheet");
    };
    assert_eq!(matilda[1].caption, "<b>Library</b> scene");
    assert_eq!(gallery.photo_url(&matilda[0]), "/shows/matilda/revolting.jpg");

    gallery.select_show(Some("secret-garden")).await;
    assert_eq!(gallery.view().photos, PhotoState::Loaded(Vec::new()));
}

#[tokio::test]
async fn generated_directory_index_round_trips() {
    let tmp = TempDir::new().unwrap();
    for file in ["nemo/01.jpg", "nemo/02.JPG", "nemo/cast-list.pdf", "annie/a.png"] {
        let path = tmp.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }
    gen_index::generate(tmp.path(), "").unwrap();

    let gallery = Gallery::new(
        DirFetcher {
            root: tmp.path().to_path_buf(),
        },
        &SiteConfig::default(),
    );
    gallery.load().await;
    assert_eq!(gallery.view().sheet, GalleryLoadState::Disabled);
    assert_eq!(gallery.view().shows, vec!["annie", "nemo"]);

    gallery.select_show(Some("nemo")).await;
    let PhotoState::Loaded(photos) = gallery.view().photos else {
        panic!("nemo photos should load from the generated file");
    };
    let srcs: Vec<&str> = photos.iter().map(|p| p.src.as_str()).collect();
    assert_eq!(srcs, vec!["nemo/01.jpg", "nemo/02.JPG"]);
    assert_eq!(gallery.photo_url(&photos[0]), "/shows/nemo/01.jpg");

    gallery.select_show(Some("missing")).await;
    match gallery.view().photos {
        PhotoState::Failed { path, .. } => assert_eq!(path, "/shows/missing/photos.json"),
        other => panic!("expected a scoped failure, got {other:?}"),
    }
}
