//! Gallery spreadsheet pivot.
//!
//! The gallery spreadsheet is "long": one row per photo, with the show it
//! belongs to repeated on every row. [`pivot_rows`] regroups those rows into
//! one ordered photo list per show.
//!
//! ## Columns
//!
//! Headers are matched case-insensitively and several synonyms are accepted.
//! For each concept the first synonym with a non-empty cell wins:
//!
//! | Concept | Columns |
//! |---------|---------|
//! | Show label | `label`, `show`, `production`, `title` |
//! | Slug source | `slug`, then the label columns, `folder`, `album` |
//! | Photo | `src`, `image`, `photo`, `url` |
//! | Show order | `show_order`, `collection_order`, `order_show` |
//! | Photo order | `photo_order`, `order`, `order_photo` |
//! | Alt text | `alt` |
//! | Caption | `caption` |
//!
//! ## Grouping rules
//!
//! Every cell is sanitized before any of the rules below look at it.
//!
//! - A row whose slug source slugifies to nothing is dropped with a warning.
//! - A row with a slug but no photo is dropped with a warning. It does not
//!   create its show or change the show's label or order.
//! - A show's label is the most recent non-empty label seen for it.
//! - A show's order is the smallest numeric show order seen for it. Empty or
//!   non-numeric cells are ignored.
//! - A photo without a numeric order is ordered by its position in the show.
//!
//! Shows sort by order (unordered shows last), then by label. Photos sort by
//! order, keeping spreadsheet order for ties. Warnings name the spreadsheet
//! row: row index + 2, counting the header.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::naming::{humanize, slugify};
use crate::sanitize::sanitize;
use crate::table::Record;

const LABEL_COLUMNS: &[&str] = &["label", "show", "production", "title"];
const SLUG_COLUMNS: &[&str] = &[
    "slug",
    "label",
    "show",
    "production",
    "title",
    "folder",
    "album",
];
const PHOTO_COLUMNS: &[&str] = &["src", "image", "photo", "url"];
const SHOW_ORDER_COLUMNS: &[&str] = &["show_order", "collection_order", "order_show"];
const PHOTO_ORDER_COLUMNS: &[&str] = &["photo_order", "order", "order_photo"];

/// A photo as exposed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryPhoto {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
}

/// Pivot output: shows in display order with their labels and photos.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShowCollection {
    /// Slugs in display order.
    pub shows: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub entries: BTreeMap<String, Vec<GalleryPhoto>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

struct OrderedPhoto {
    photo: GalleryPhoto,
    order: f64,
}

struct ShowGroup {
    slug: String,
    label: Option<String>,
    show_order: Option<f64>,
    photos: Vec<OrderedPhoto>,
}

impl ShowGroup {
    fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| humanize(&self.slug))
    }
}

/// Parse an order cell. Empty, non-numeric, and non-finite values are `None`.
fn parse_order(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Group flat spreadsheet rows into ordered per-show photo lists.
pub fn pivot_rows(rows: &[Record]) -> ShowCollection {
    let mut groups: Vec<ShowGroup> = Vec::new();
    let mut index_by_slug: HashMap<String, usize> = HashMap::new();
    let mut warnings = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 2;
        let row = row.clone().map_values(sanitize);
        let slug = slugify(row.first_non_empty(SLUG_COLUMNS).unwrap_or_default());
        if slug.is_empty() {
            warnings.push(format!("Row {row_number}: Missing slug/show identifier."));
            continue;
        }

        let Some(src) = row.first_non_empty(PHOTO_COLUMNS) else {
            warnings.push(format!("Row {row_number}: Missing photo source for {slug}."));
            continue;
        };
        let label = row.first_non_empty(LABEL_COLUMNS).map(str::to_string);

        let group_index = *index_by_slug.entry(slug.clone()).or_insert_with(|| {
            groups.push(ShowGroup {
                slug: slug.clone(),
                label: None,
                show_order: None,
                photos: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[group_index];

        if label.is_some() {
            group.label = label.clone();
        }
        if let Some(order) = parse_order(row.first_non_empty(SHOW_ORDER_COLUMNS)) {
            group.show_order = Some(group.show_order.map_or(order, |current| current.min(order)));
        }

        let caption = row
            .get_ignore_case("caption")
            .unwrap_or_default()
            .trim()
            .to_string();
        let alt_source = row
            .first_non_empty(&["alt", "caption"])
            .map(str::to_string)
            .or(label)
            .unwrap_or_else(|| slug.clone());
        let order = parse_order(row.first_non_empty(PHOTO_ORDER_COLUMNS))
            .unwrap_or(group.photos.len() as f64);

        group.photos.push(OrderedPhoto {
            photo: GalleryPhoto {
                src: src.to_string(),
                alt: alt_source,
                caption,
            },
            order,
        });
    }

    groups.sort_by(|a, b| {
        let a_order = a.show_order.unwrap_or(f64::INFINITY);
        let b_order = b.show_order.unwrap_or(f64::INFINITY);
        a_order
            .total_cmp(&b_order)
            .then_with(|| a.display_label().cmp(&b.display_label()))
    });

    let mut collection = ShowCollection {
        warnings,
        ..ShowCollection::default()
    };
    for mut group in groups {
        group.photos.sort_by(|a, b| a.order.total_cmp(&b.order));
        collection.shows.push(group.slug.clone());
        collection
            .labels
            .insert(group.slug.clone(), group.display_label());
        collection.entries.insert(
            group.slug,
            group.photos.into_iter().map(|p| p.photo).collect(),
        );
    }
    collection
}
