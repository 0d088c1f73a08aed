//! # Marquee
//!
//! Data ingestion for a youth theater website. Staff keep the class schedule
//! and the show photo gallery in spreadsheets; this crate turns those loosely
//! structured exports into a normalized model the pages can render, and never
//! lets a bad export take a page down.
//!
//! # Architecture: Text In, Records Out
//!
//! ```text
//! remote/bundled text → table → sanitize → { schedule | gallery::pivot } → records
//! ```
//!
//! Every stage after the fetch is synchronous and pure. The only suspension
//! points are network fetches behind the [`fetch::Fetch`] trait, which keeps
//! every loader testable with an in-memory transport.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schedule`] | CSV → JSON → bundled fallback chain and the long-lived schedule state |
//! | [`gallery`] | Spreadsheet pivot, directory-index fallback, and gallery view state |
//! | [`table`] | Header-keyed CSV parsing that reports bad rows instead of failing |
//! | [`sanitize`] | Removes active markup from untrusted text, keeps safe inline formatting |
//! | [`assets`] | Resolves data and photo paths against configured bases |
//! | [`fetch`] | The transport trait and its `reqwest` implementation |
//! | [`generation`] | Load tickets that let the newest load win |
//! | [`config`] | Layered `config.toml` + environment configuration and validation |
//! | [`naming`] | Slugs and their display forms |
//! | [`gen_index`] | Writes the directory-index files for a folder of show photos |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Degrade, Never Fail
//!
//! A visitor always sees a schedule. Source failures are collected into a
//! diagnostic string for the logs and the chain moves on; the bundled schedule
//! is compiled into the binary and cannot fail to fetch. The gallery follows
//! the same rule: a broken spreadsheet falls back to the directory index, and
//! a broken photo file only affects its own show.
//!
//! ## Last Request Wins
//!
//! Loads can overlap (a source URL changes, a visitor clicks another show
//! before the first finishes). Each load takes a [`generation::LoadTicket`]
//! and may commit only while its ticket is current, so a slow stale response
//! is dropped rather than overwriting a newer one. State is published through
//! `tokio::sync::watch`, so a view always reads the latest committed value.
//!
//! ## Sanitize Before Modeling
//!
//! Every string cell is sanitized before it becomes part of a record, so
//! titles, slugs, and labels are derived from the text a visitor would
//! actually see. [`sanitize::sanitize`] is idempotent, which makes repeated
//! passes (bundled data, re-exported JSON) harmless.

pub mod assets;
pub mod config;
pub mod fetch;
pub mod gallery;
pub mod gen_index;
pub mod generation;
pub mod naming;
pub mod output;
pub mod sanitize;
pub mod schedule;
pub mod table;

#[cfg(test)]
pub(crate) mod test_helpers;
