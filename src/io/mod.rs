//! Boundary adapters.
//!
//! Pure conversions between files and the in-memory model. Nothing here
//! touches the flow engine.
//!
//! | Format | Read | Write |
//! |--------|------|-------|
//! | Catalog JSON | [`load_catalog`], [`parse_catalog`] | [`catalog_to_json`] |
//! | Roster CSV | [`load_roster`], [`read_roster`] | |
//! | Schedule text | [`load_schedule_text`], [`parse_schedule`] | [`save_schedule_text`], [`render_schedule`] |
//! | Month CSV | | [`save_month_csv`], [`write_month_csv`] |
//! | Deleted shifts CSV | [`load_revision_request`], [`read_revision_request`] | |

mod catalog;
mod export;
mod request;
mod roster;
mod schedule_text;

pub use catalog::{catalog_records, catalog_to_json, load_catalog, parse_catalog, CatalogRecord};
pub use export::{export_rows, save_month_csv, write_month_csv, write_schedules_csv, ExportRow};
pub use request::{load_revision_request, read_revision_request};
pub use roster::{load_roster, read_roster};
pub use schedule_text::{load_schedule_text, parse_schedule, render_schedule, save_schedule_text};

/// Splits a comma-separated cell, trimming items and dropping empty ones.
pub(crate) fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty())
}
