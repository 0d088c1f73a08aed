//! Class schedule loading.
//!
//! The schedule is read from a chain of sources, most authoritative first:
//!
//! ```text
//! remote CSV  →  remote JSON  →  bundled fallback
//! ```
//!
//! Each source is attempted exactly once per load. The first success ends the
//! chain. Failures are never shown to visitors: they are collected into a
//! diagnostic string that the caller logs, and the bundled schedule is served
//! if nothing else works.
//!
//! [`ClassSchedule`] wraps the chain for a long-lived view: it publishes its
//! state through a `watch` channel and makes sure a slow, superseded load can
//! never overwrite the result of a newer one.

pub mod entry;
pub mod helper;
pub mod source;

pub use entry::{ClassScheduleEntry, SCHEDULE_FIELDS, ScheduleStatus};
pub use source::{ScheduleSource, SourceData, SourceError};

use tokio::sync::watch;

use crate::assets::SiteAssets;
use crate::config::SiteConfig;
use crate::fetch::Fetch;
use crate::generation::Generations;

/// Separator between diagnostic notes.
pub const DIAGNOSTIC_SEPARATOR: &str = " • ";

const DEFAULT_CSV_PATH: &str = "/class-schedule/index.csv";
const DEFAULT_JSON_PATH: &str = "/class-schedule/index.json";

/// Outcome of walking the source chain once.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleLoadResult {
    pub entries: Vec<ClassScheduleEntry>,
    pub using_fallback: bool,
    /// Earlier failures and parse warnings, for logs only.
    pub diagnostic: Option<String>,
}

/// The live source URLs for one load.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSources {
    pub csv_url: String,
    pub json_url: String,
}

impl ScheduleSources {
    /// Configured override URLs, or the default paths under the asset base.
    pub fn from_config(config: &SiteConfig, assets: &SiteAssets) -> Self {
        Self {
            csv_url: config
                .schedule
                .csv_url()
                .map(str::to_string)
                .unwrap_or_else(|| assets.public_asset(DEFAULT_CSV_PATH)),
            json_url: config
                .schedule
                .json_url()
                .map(str::to_string)
                .unwrap_or_else(|| assets.public_asset(DEFAULT_JSON_PATH)),
        }
    }

    /// The full fallback chain in attempt order.
    pub fn chain(&self) -> Vec<ScheduleSource> {
        vec![
            ScheduleSource::RemoteCsv(self.csv_url.clone()),
            ScheduleSource::RemoteJson(self.json_url.clone()),
            ScheduleSource::Bundled,
        ]
    }
}

/// Walk `sources` in order and return the first usable schedule.
///
/// If every source fails (or the list has no bundled source and all live
/// ones fail) the bundled schedule is returned with `using_fallback = true`.
pub async fn resolve_schedule<F: Fetch>(
    fetcher: &F,
    sources: &[ScheduleSource],
) -> ScheduleLoadResult {
    let mut notes = Vec::new();

    for source in sources {
        match source.attempt(fetcher).await {
            Ok(data) => {
                log::debug!(
                    "schedule loaded from {} source ({} entries)",
                    source.name(),
                    data.entries.len()
                );
                if !data.warnings.is_empty() {
                    notes.push(format!(
                        "{} parsed with {} warning(s): {}",
                        source.name(),
                        data.warnings.len(),
                        data.warnings.join("; ")
                    ));
                }
                return ScheduleLoadResult {
                    entries: data.entries,
                    using_fallback: source.is_fallback(),
                    diagnostic: join_notes(notes),
                };
            }
            Err(reason) => {
                log::debug!("schedule {} source failed: {reason}", source.name());
                notes.push(format!("{}: {reason}", source.name()));
            }
        }
    }

    ScheduleLoadResult {
        entries: source::bundled_schedule().entries,
        using_fallback: true,
        diagnostic: join_notes(notes),
    }
}

fn join_notes(notes: Vec<String>) -> Option<String> {
    (!notes.is_empty()).then(|| notes.join(DIAGNOSTIC_SEPARATOR))
}

// ============================================================================
// Long-lived schedule state
// ============================================================================

/// What a schedule view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleState {
    pub entries: Vec<ClassScheduleEntry>,
    pub loading: bool,
    pub using_fallback: bool,
    pub diagnostic: Option<String>,
}

impl ScheduleState {
    /// Before the first load finishes the bundled schedule is shown.
    fn initial() -> Self {
        Self {
            entries: source::bundled_schedule().entries,
            loading: true,
            using_fallback: true,
            diagnostic: None,
        }
    }
}

/// Schedule loader with "last request wins" semantics.
pub struct ClassSchedule<F> {
    fetcher: F,
    generations: Generations,
    state: watch::Sender<ScheduleState>,
}

impl<F: Fetch> ClassSchedule<F> {
    pub fn new(fetcher: F) -> Self {
        let (state, _) = watch::channel(ScheduleState::initial());
        Self {
            fetcher,
            generations: Generations::new(),
            state,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> ScheduleState {
        self.state.borrow().clone()
    }

    /// Receive every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<ScheduleState> {
        self.state.subscribe()
    }

    /// Load the schedule from `sources`.
    ///
    /// Returns `false` when a newer load started before this one finished; in
    /// that case nothing was committed.
    pub async fn load(&self, sources: &ScheduleSources) -> bool {
        let ticket = self.generations.begin();
        self.state.send_modify(|s| {
            s.loading = true;
            s.diagnostic = None;
        });

        let result = resolve_schedule(&self.fetcher, &sources.chain()).await;

        if !self.generations.is_current(ticket) {
            log::debug!("discarding superseded schedule load");
            return false;
        }
        if let Some(diagnostic) = &result.diagnostic {
            log::warn!("schedule load warning: {diagnostic}");
        }
        self.state.send_replace(ScheduleState {
            entries: result.entries,
            loading: false,
            using_fallback: result.using_fallback,
            diagnostic: result.diagnostic,
        });
        true
    }
}
