//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output lists what a visitor would see, not where it came from. Each entity
//! (class, show, photo) gets a header line with its positional index and
//! display name; sources and details follow as indented context lines.
//!
//! # Output Format
//!
//! ## Schedule
//!
//! ```text
//! Class schedule: 2 classes (bundled fallback)
//! 001 Youth Choir [Open]
//!     When: Sat 10:00-11:00am
//!     Ages: 8-12, Co-ed
//!     Dates: 9/13 to 12/6 (Fall)
//!     Openings: 10
//!     Tuition: $150 + $25 fees
//!     About: Sing in harmony...
//! ```
//!
//! ## Gallery
//!
//! ```text
//! Gallery: 2 shows from spreadsheet
//!     Note: 1 parsing warning(s) • Row 4: Missing photo source for nemo.
//! 001 Finding Nemo Jr. [nemo] (active)
//! 002 Matilda Jr. [matilda]
//!
//! Finding Nemo Jr. (2 photos)
//!     001 Dory and Marlin
//!         Source: /shows/nemo/1.jpg
//!     002 Curtain call
//!         Source: /shows/nemo/2.jpg
//!         Caption: Opening night
//! ```
//!
//! ## Schedule helper
//!
//! ```text
//! Parsed with 1 warning(s). Review the preview below.
//!     Row 4: expected 13 fields, found 12 (missing cells left empty)
//! Missing headers: fees
//! 001 Youth Choir [Open]
//!     Sat 10am
//! ```
//!
//! ## Gen-index
//!
//! ```text
//! 001 matilda (4 photos)
//! 002 nemo (12 photos)
//! Wrote index.json and 2 photos.json files under public/shows
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use std::path::Path;

use crate::fetch::Fetch;
use crate::gallery::{Gallery, GalleryLoadState, PhotoState};
use crate::gen_index::GalleryIndex;
use crate::schedule::helper::SchedulePreview;
use crate::schedule::{ClassScheduleEntry, ScheduleState};

const DESCRIPTION_WIDTH: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + name, with an optional tag.
///
/// ```text
/// 001 Youth Choir [Open]
/// 002 Untagged
/// ```
fn entity_header(index: usize, name: &str, tag: Option<&str>) -> String {
    match tag {
        Some(t) if !t.is_empty() => format!("{} {} [{}]", format_index(index), name, t),
        _ => format!("{} {}", format_index(index), name),
    }
}

/// Push `indent + label + value` when the value is non-empty.
fn detail(lines: &mut Vec<String>, depth: usize, label: &str, value: &str) {
    if !value.trim().is_empty() {
        lines.push(format!("{}{}: {}", indent(depth), label, value.trim()));
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Schedule
// ============================================================================

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn entry_lines(index: usize, entry: &ClassScheduleEntry) -> Vec<String> {
    let mut lines = vec![entity_header(index, &entry.title, Some(entry.status.as_str()))];

    detail(&mut lines, 1, "When", &join_non_empty(&[&entry.days, &entry.times], " "));
    detail(&mut lines, 1, "Ages", &join_non_empty(&[&entry.ages, &entry.gender], ", "));

    let mut dates = join_non_empty(&[&entry.starts, &entry.ends], " to ");
    if !entry.session.trim().is_empty() {
        dates = if dates.is_empty() {
            entry.session.trim().to_string()
        } else {
            format!("{dates} ({})", entry.session.trim())
        };
    }
    detail(&mut lines, 1, "Dates", &dates);
    detail(&mut lines, 1, "Openings", &entry.openings);

    let fees = if entry.fees.trim().is_empty() {
        String::new()
    } else {
        format!("{} fees", entry.fees.trim())
    };
    detail(&mut lines, 1, "Tuition", &join_non_empty(&[&entry.tuition, &fees], " + "));

    let about = strip_html_tags(&entry.description);
    detail(&mut lines, 1, "About", &truncate_desc(about.trim(), DESCRIPTION_WIDTH));
    lines
}

/// Format a loaded schedule.
pub fn format_schedule(state: &ScheduleState) -> Vec<String> {
    let source = if state.using_fallback {
        " (bundled fallback)"
    } else {
        ""
    };
    let mut lines = vec![format!(
        "Class schedule: {}{}",
        plural(state.entries.len(), "class", "classes"),
        source
    )];
    for (i, entry) in state.entries.iter().enumerate() {
        lines.extend(entry_lines(i + 1, entry));
    }
    lines
}

pub fn print_schedule(state: &ScheduleState) {
    for line in format_schedule(state) {
        println!("{}", line);
    }
}

// ============================================================================
// Gallery
// ============================================================================

/// Format the gallery's show list and the active show's photos.
pub fn format_gallery<F: Fetch>(gallery: &Gallery<F>) -> Vec<String> {
    let view = gallery.view();
    let count = plural(view.shows.len(), "show", "shows");
    let mut lines = match &view.sheet {
        GalleryLoadState::Ready(sheet) => {
            let mut lines = vec![format!("Gallery: {count} from spreadsheet")];
            if let Some(message) = &sheet.message {
                lines.push(format!("{}Note: {}", indent(1), message));
            }
            lines
        }
        GalleryLoadState::Error(message) => vec![
            format!("Gallery: {count} from directory index"),
            format!("{}Spreadsheet unavailable: {}", indent(1), message),
        ],
        GalleryLoadState::Disabled | GalleryLoadState::Loading => {
            vec![format!("Gallery: {count} from directory index")]
        }
    };

    for (i, slug) in view.shows.iter().enumerate() {
        let header = entity_header(i + 1, &gallery.label_for(slug), None);
        let mut line = format!("{header} [{slug}]");
        if view.active_show.as_deref() == Some(slug.as_str()) {
            line.push_str(" (active)");
        }
        lines.push(line);
    }

    let Some(active) = &view.active_show else {
        return lines;
    };
    let label = gallery.label_for(active);
    lines.push(String::new());
    match &view.photos {
        PhotoState::Loaded(photos) => {
            lines.push(format!("{} ({})", label, plural(photos.len(), "photo", "photos")));
            for (i, photo) in photos.iter().enumerate() {
                let name = if photo.alt.is_empty() {
                    format!("({})", photo.src)
                } else {
                    strip_html_tags(&photo.alt)
                };
                lines.push(format!("{}{}", indent(1), entity_header(i + 1, &name, None)));
                detail(&mut lines, 2, "Source", &gallery.photo_url(photo));
                detail(&mut lines, 2, "Caption", &strip_html_tags(&photo.caption));
            }
        }
        PhotoState::Failed { message, .. } => {
            lines.push(label);
            lines.push(format!("{}{}", indent(1), message));
        }
        PhotoState::Idle | PhotoState::Loading => lines.push(label),
    }
    lines
}

pub fn print_gallery<F: Fetch>(gallery: &Gallery<F>) {
    for line in format_gallery(gallery) {
        println!("{}", line);
    }
}

// ============================================================================
// Offline tools
// ============================================================================

/// Format a schedule CSV preview.
pub fn format_preview(preview: &SchedulePreview) -> Vec<String> {
    let mut lines = vec![preview.status_message()];
    for warning in &preview.table.warnings {
        lines.push(format!("{}{}", indent(1), warning));
    }
    if !preview.missing_headers.is_empty() {
        lines.push(format!("Missing headers: {}", preview.missing_headers.join(", ")));
    }
    for (i, row) in preview.rows().iter().enumerate() {
        let title = row.first_non_empty(&["title"]).unwrap_or("(untitled)");
        lines.push(entity_header(i + 1, title, row.first_non_empty(&["status"])));
        let when = join_non_empty(
            &[
                row.get_ignore_case("days").unwrap_or_default(),
                row.get_ignore_case("times").unwrap_or_default(),
            ],
            " ",
        );
        if !when.is_empty() {
            lines.push(format!("{}{}", indent(1), when));
        }
    }
    lines
}

pub fn print_preview(preview: &SchedulePreview) {
    for line in format_preview(preview) {
        println!("{}", line);
    }
}

/// Format the result of `gen-index`.
pub fn format_gen_index(root: &Path, index: &GalleryIndex) -> Vec<String> {
    let mut lines: Vec<String> = index
        .shows
        .iter()
        .enumerate()
        .map(|(i, show)| {
            format!(
                "{} ({})",
                entity_header(i + 1, &show.slug, None),
                plural(show.photos.len(), "photo", "photos")
            )
        })
        .collect();
    lines.push(format!(
        "Wrote index.json and {} photos.json files under {}",
        index.shows.len(),
        root.display()
    ));
    lines
}

pub fn print_gen_index(root: &Path, index: &GalleryIndex) {
    for line in format_gen_index(root, index) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
