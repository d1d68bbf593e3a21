//! Plain-text schedule format.
//!
//! ```text
//! Location: North
//! ========================================
//! Cabinet: 101
//! ------------------------------
//! (1, 1) - Dr. Smith
//! (1, 2) - none
//! ...
//! ------------------------------
//! ```
//!
//! Locations and cabinets appear in sorted order and every cabinet lists all
//! its slots. [`parse_schedule`] is the exact inverse of [`render_schedule`]
//! and also accepts `None` for empty slots.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{RosterError, RosterResult};
use crate::models::{CabinetSlot, Schedule, ShiftSlot};

const LOCATION_PREFIX: &str = "Location:";
const CABINET_PREFIX: &str = "Cabinet:";
const EMPTY: &str = "none";

/// Renders a schedule as text.
pub fn render_schedule(schedule: &Schedule) -> String {
    let mut out = String::new();
    let mut location: Option<&str> = None;
    let mut cabinet: Option<&str> = None;

    for (cell, doctor) in schedule.cells() {
        if location != Some(cell.location.as_str()) {
            if cabinet.is_some() {
                out.push_str(&"-".repeat(30));
                out.push('\n');
            }
            let _ = writeln!(out, "{LOCATION_PREFIX} {}", cell.location);
            out.push_str(&"=".repeat(40));
            out.push('\n');
            location = Some(cell.location.as_str());
            cabinet = None;
        }
        if cabinet != Some(cell.cabinet.as_str()) {
            if cabinet.is_some() {
                out.push_str(&"-".repeat(30));
                out.push('\n');
            }
            let _ = writeln!(out, "{CABINET_PREFIX} {}", cell.cabinet);
            out.push_str(&"-".repeat(30));
            out.push('\n');
            cabinet = Some(cell.cabinet.as_str());
        }
        let _ = writeln!(out, "{} - {}", cell.slot, doctor.unwrap_or(EMPTY));
    }
    if cabinet.is_some() {
        out.push_str(&"-".repeat(30));
        out.push('\n');
    }
    out
}

/// Parses the text format back into a schedule.
///
/// # Errors
/// [`RosterError::Parse`] with a 1-based line number for a slot line before
/// any location/cabinet header, a line without ` - `, or a bad `(day, slot)`.
pub fn parse_schedule(text: &str) -> RosterResult<Schedule> {
    let mut schedule = Schedule::new();
    let mut location: Option<String> = None;
    let mut cabinet: Option<String> = None;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        let error = |message: String| RosterError::Parse {
            line: line_no,
            message,
        };

        if line.is_empty() || line.starts_with('-') || line.starts_with('=') {
            continue;
        }
        if let Some(rest) = line.strip_prefix(LOCATION_PREFIX) {
            location = Some(rest.trim().to_string());
            cabinet = None;
            continue;
        }
        if let Some(rest) = line.strip_prefix(CABINET_PREFIX) {
            cabinet = Some(rest.trim().to_string());
            continue;
        }

        let (Some(loc), Some(cab)) = (&location, &cabinet) else {
            return Err(error("slot line outside a location/cabinet block".to_string()));
        };
        let (slot, doctor) = line
            .split_once(" - ")
            .ok_or_else(|| error(format!("expected '(day, slot) - doctor', got '{line}'")))?;
        let slot = parse_slot(slot).ok_or_else(|| error(format!("invalid slot '{slot}'")))?;

        let cell = CabinetSlot::new(loc.clone(), cab.clone(), slot);
        let doctor = doctor.trim();
        if doctor.is_empty() || doctor.eq_ignore_ascii_case(EMPTY) {
            schedule.add_cell(cell);
        } else {
            schedule.assign(cell, doctor);
        }
    }

    Ok(schedule)
}

/// Writes a schedule to a text file.
pub fn save_schedule_text(path: impl AsRef<Path>, schedule: &Schedule) -> RosterResult<()> {
    fs::write(path, render_schedule(schedule))?;
    Ok(())
}

/// Reads a schedule from a text file.
pub fn load_schedule_text(path: impl AsRef<Path>) -> RosterResult<Schedule> {
    parse_schedule(&fs::read_to_string(path)?)
}

fn parse_slot(s: &str) -> Option<ShiftSlot> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (day, slot) = inner.split_once(',')?;
    ShiftSlot::new(day.trim().parse().ok()?, slot.trim().parse().ok()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CabinetCatalog;

    fn slot(day: u8, s: u8) -> ShiftSlot {
        ShiftSlot::new(day, s).unwrap()
    }

    fn sample() -> Schedule {
        let catalog = CabinetCatalog::new()
            .with_cabinets("North", "therapy", ["101", "102"])
            .with_cabinets("South", "therapy", ["201"]);
        let mut schedule = Schedule::for_catalog(&catalog);
        schedule.assign(CabinetSlot::new("North", "101", slot(1, 1)), "Dr. Smith");
        schedule.assign(CabinetSlot::new("North", "102", slot(7, 2)), "Jones - Senior");
        schedule.assign(CabinetSlot::new("South", "201", slot(3, 1)), "Lee");
        schedule
    }

    #[test]
    fn test_render_layout() {
        let text = render_schedule(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Location: North");
        assert_eq!(lines[1], "=".repeat(40));
        assert_eq!(lines[2], "Cabinet: 101");
        assert_eq!(lines[3], "-".repeat(30));
        assert_eq!(lines[4], "(1, 1) - Dr. Smith");
        assert_eq!(lines[5], "(1, 2) - none");
        assert_eq!(text.matches("Location:").count(), 2);
        assert_eq!(text.matches("Cabinet:").count(), 3);
        assert_eq!(text.matches(" - none").count(), 3 * 14 - 3);
    }

    #[test]
    fn test_parse_inverts_render() {
        let schedule = sample();
        let parsed = parse_schedule(&render_schedule(&schedule)).unwrap();
        assert_eq!(parsed, schedule);
    }

    #[test]
    fn test_parse_accepts_none_spelling() {
        let text = "Location: North\nCabinet: 101\n(2, 1) - None\n(2, 2) - Lee\n";
        let schedule = parse_schedule(text).unwrap();
        assert_eq!(schedule.cell_count(), 2);
        assert_eq!(schedule.get(&CabinetSlot::new("North", "101", slot(2, 1))), None);
        assert_eq!(schedule.get(&CabinetSlot::new("North", "101", slot(2, 2))), Some("Lee"));
    }

    #[test]
    fn test_parse_errors() {
        let orphan = parse_schedule("(1, 1) - Lee\n").unwrap_err();
        assert!(matches!(orphan, RosterError::Parse { line: 1, .. }));

        let bad_slot = parse_schedule("Location: N\nCabinet: 1\n(9, 1) - Lee\n").unwrap_err();
        assert!(matches!(bad_slot, RosterError::Parse { line: 3, .. }));

        let no_dash = parse_schedule("Location: N\nCabinet: 1\n(1, 1) Lee\n").unwrap_err();
        assert!(matches!(no_dash, RosterError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_empty_schedule() {
        assert_eq!(render_schedule(&Schedule::new()), "");
        assert!(parse_schedule("").unwrap().is_empty());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week_1.txt");
        save_schedule_text(&path, &sample()).unwrap();
        assert_eq!(load_schedule_text(&path).unwrap(), sample());
    }
}
