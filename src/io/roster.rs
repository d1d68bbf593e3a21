//! Roster CSV import.
//!
//! One row per doctor:
//!
//! | Column | Content |
//! |--------|---------|
//! | `Doctor` | doctor id |
//! | `Specialization` | comma-separated specializations |
//! | `Cabinets` | comma-separated locations, most preferred first |
//! | `MinShifts` / `MaxShifts` | monthly quotas (empty = unset) |
//! | `ForbiddenShifts` | comma-separated `W.D.S` entries |
//! | `RequiredShifts` | comma-separated `location\|cabinet\|W.D.S` entries |
//! | `Fine` | `0` marks the doctor fine-exempt |
//!
//! Optional columns may be missing or empty. Malformed forbidden/required
//! entries are skipped with a warning; a malformed quota is an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, warn};

use super::split_list;
use crate::error::{RosterError, RosterResult};
use crate::models::{DoctorProfile, ShiftSlot};

/// Reads a roster CSV file.
pub fn load_roster(path: impl AsRef<Path>) -> RosterResult<Vec<DoctorProfile>> {
    read_roster(File::open(path)?)
}

/// Reads roster rows from any reader.
///
/// # Example
/// ```
/// use u_roster::io::read_roster;
///
/// let csv = "Doctor,Specialization,Cabinets,MinShifts,MaxShifts,ForbiddenShifts,RequiredShifts,Fine\n\
///            D1,therapy,\"North, South\",4,16,1.3.1,North|101|2.1.2,1\n";
/// let doctors = read_roster(csv.as_bytes()).unwrap();
/// assert_eq!(doctors[0].preferred_locations, vec!["North", "South"]);
/// assert_eq!(doctors[0].max_shifts, Some(16));
/// assert_eq!(doctors[0].forbidden_in(1).len(), 1);
/// ```
pub fn read_roster<R: Read>(reader: R) -> RosterResult<Vec<DoctorProfile>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut doctors = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let row: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter().map(str::trim))
            .collect();

        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        doctors.push(parse_row(&row, line)?);
    }

    debug!(doctors = doctors.len(), "roster loaded");
    Ok(doctors)
}

fn parse_row(row: &HashMap<&str, &str>, line: usize) -> RosterResult<DoctorProfile> {
    let field = |name: &str| row.get(name).copied().unwrap_or("");

    let id = field("Doctor");
    if id.is_empty() {
        return Err(RosterError::Parse {
            line,
            message: "missing Doctor".to_string(),
        });
    }

    let mut doctor = DoctorProfile::new(id);
    for s in split_list(field("Specialization")) {
        doctor = doctor.with_specialization(s);
    }
    for loc in split_list(field("Cabinets")) {
        doctor = doctor.with_preferred_location(loc);
    }
    doctor.min_shifts = parse_quota(field("MinShifts"), "MinShifts", line)?;
    doctor.max_shifts = parse_quota(field("MaxShifts"), "MaxShifts", line)?;

    for entry in split_list(field("ForbiddenShifts")) {
        match parse_week_slot(entry) {
            Some((week, slot)) => doctor = doctor.with_forbidden(week, slot),
            None => warn!(doctor = id, line, entry, "skipping malformed forbidden shift"),
        }
    }
    for entry in split_list(field("RequiredShifts")) {
        match parse_required(entry) {
            Some((location, cabinet, week, slot)) => {
                doctor = doctor.with_required(week, location, cabinet, slot);
            }
            None => warn!(doctor = id, line, entry, "skipping malformed required shift"),
        }
    }

    // a fine of 0 (or none given) marks the doctor exempt
    let fine = parse_number(field("Fine")).unwrap_or(0.0);
    Ok(doctor.with_fine_exempt(fine == 0.0))
}

fn parse_quota(value: &str, column: &str, line: usize) -> RosterResult<Option<u32>> {
    if value.is_empty() {
        return Ok(None);
    }
    match parse_number(value) {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(Some(n as u32)),
        _ => Err(RosterError::Parse {
            line,
            message: format!("invalid {column} value '{value}'"),
        }),
    }
}

/// Spreadsheet exports often write integers as `8.0`.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses `W.D.S`.
pub(crate) fn parse_week_slot(entry: &str) -> Option<(u8, ShiftSlot)> {
    let mut parts = entry.trim().split('.').map(|p| p.trim().parse::<u8>());
    let week = parts.next()?.ok()?;
    let day = parts.next()?.ok()?;
    let slot = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((week, ShiftSlot::new(day, slot).ok()?))
}

/// Parses `location|cabinet|W.D.S`.
fn parse_required(entry: &str) -> Option<(&str, &str, u8, ShiftSlot)> {
    let mut parts = entry.split('|').map(str::trim);
    let location = parts.next().filter(|s| !s.is_empty())?;
    let cabinet = parts.next().filter(|s| !s.is_empty())?;
    let (week, slot) = parse_week_slot(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((location, cabinet, week, slot))
}
