//! Flat CSV export of weekly schedules.
//!
//! One row per cabinet slot: `Week, Location, Cabinet, Day, Slot, Doctor`,
//! with an empty `Doctor` for unassigned slots.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RosterResult;
use crate::models::Schedule;
use crate::scheduler::MonthOutcome;

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportRow {
    pub week: u8,
    pub location: String,
    pub cabinet: String,
    pub day: u8,
    pub slot: u8,
    pub doctor: Option<String>,
}

/// Flattens `(week, schedule)` pairs into rows.
pub fn export_rows<'a, I>(weeks: I) -> Vec<ExportRow>
where
    I: IntoIterator<Item = (u8, &'a Schedule)>,
{
    weeks
        .into_iter()
        .flat_map(|(week, schedule)| {
            schedule.cells().map(move |(cell, doctor)| ExportRow {
                week,
                location: cell.location.clone(),
                cabinet: cell.cabinet.clone(),
                day: cell.slot.day,
                slot: cell.slot.slot,
                doctor: doctor.map(str::to_string),
            })
        })
        .collect()
}

/// Writes `(week, schedule)` pairs as CSV.
pub fn write_schedules_csv<'a, W, I>(writer: W, weeks: I) -> RosterResult<()>
where
    W: Write,
    I: IntoIterator<Item = (u8, &'a Schedule)>,
{
    let mut csv = csv::Writer::from_writer(writer);
    for row in export_rows(weeks) {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes every week of a month as CSV.
pub fn write_month_csv<W: Write>(writer: W, month: &MonthOutcome) -> RosterResult<()> {
    write_schedules_csv(writer, month.weeks.iter().map(|w| (w.week, &w.schedule)))
}

/// Writes every week of a month to a CSV file.
pub fn save_month_csv(path: impl AsRef<Path>, month: &MonthOutcome) -> RosterResult<()> {
    write_month_csv(File::create(path)?, month)
}
