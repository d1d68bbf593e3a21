//! Catalog JSON import and export.
//!
//! The catalog file is an array of records, one per (location,
//! specialization), with the cabinets as a comma-separated `room` string:
//!
//! ```json
//! [
//!   { "location": "North", "specialization": "therapy", "room": "101, 102" },
//!   { "location": "North", "specialization": "surgery", "room": "103" }
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::split_list;
use crate::error::RosterResult;
use crate::models::CabinetCatalog;

/// One catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Location name.
    pub location: String,
    /// Specialization the cabinets serve.
    pub specialization: String,
    /// Comma-separated cabinet identifiers.
    pub room: String,
}

/// Reads a catalog JSON file.
pub fn load_catalog(path: impl AsRef<Path>) -> RosterResult<CabinetCatalog> {
    parse_catalog(&fs::read_to_string(path)?)
}

/// Parses catalog JSON.
pub fn parse_catalog(json: &str) -> RosterResult<CabinetCatalog> {
    let records: Vec<CatalogRecord> = serde_json::from_str(json)?;
    let mut catalog = CabinetCatalog::new();
    for r in &records {
        catalog.insert(r.location.trim(), r.specialization.trim(), split_list(&r.room));
    }
    Ok(catalog)
}

/// Flattens a catalog back into records, one per (location, specialization).
pub fn catalog_records(catalog: &CabinetCatalog) -> Vec<CatalogRecord> {
    let mut records = Vec::new();
    for location in catalog.locations() {
        for (specialization, cabinets) in catalog.specializations(location) {
            records.push(CatalogRecord {
                location: location.to_string(),
                specialization: specialization.to_string(),
                room: cabinets.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
            });
        }
    }
    records
}

/// Serializes a catalog as pretty JSON.
pub fn catalog_to_json(catalog: &CabinetCatalog) -> RosterResult<String> {
    Ok(serde_json::to_string_pretty(&catalog_records(catalog))?)
}
