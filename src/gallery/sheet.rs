//! Gallery spreadsheet loading.

use thiserror::Error;

use super::pivot::{ShowCollection, pivot_rows};
use crate::fetch::{Fetch, FetchError};
use crate::table::{TableError, parse_table};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("spreadsheet has no shows")]
    NoShows,
}

/// A pivoted spreadsheet plus a human-readable note about anything skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGallery {
    pub collection: ShowCollection,
    /// `None` when the sheet parsed cleanly.
    pub message: Option<String>,
}

/// Fetch the CSV at `url`, parse it, and pivot it into shows.
///
/// Parser warnings and pivot warnings are combined into one message of the
/// form `"2 parsing warning(s) • Row 3: ... • Row 7: ..."`.
pub async fn load_sheet<F: Fetch>(fetcher: &F, url: &str) -> Result<SheetGallery, SheetError> {
    let text = fetcher.fetch_text(url).await?;
    let table = parse_table(&text)?;
    let mut collection = pivot_rows(&table.rows);
    if collection.shows.is_empty() {
        return Err(SheetError::NoShows);
    }

    let mut warnings = table.warnings;
    warnings.append(&mut collection.warnings);
    let message = (!warnings.is_empty()).then(|| {
        let mut parts = vec![format!("{} parsing warning(s)", warnings.len())];
        parts.extend(warnings);
        parts.join(crate::schedule::DIAGNOSTIC_SEPARATOR)
    });

    Ok(SheetGallery {
        collection,
        message,
    })
}
