//! Deleted-shift request import.
//!
//! CSV rows `Doctor, Day, Slot`, one per shift to vacate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::RosterResult;
use crate::models::ShiftSlot;
use crate::scheduler::RevisionRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeletedRow {
    doctor: String,
    day: u8,
    slot: u8,
}

/// Reads a deleted-shift CSV file into a request for `week`.
pub fn load_revision_request(path: impl AsRef<Path>, week: u8) -> RosterResult<RevisionRequest> {
    read_revision_request(File::open(path)?, week)
}

/// Reads deleted-shift rows into a request for `week`.
///
/// # Errors
/// [`RosterError::Csv`](crate::error::RosterError::Csv) for unreadable rows,
/// [`RosterError::InvalidSlot`](crate::error::RosterError::InvalidSlot)
/// for a `(day, slot)` outside the weekly grid.
pub fn read_revision_request<R: Read>(reader: R, week: u8) -> RosterResult<RevisionRequest> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut request = RevisionRequest::new(week);
    for row in reader.deserialize() {
        let row: DeletedRow = row?;
        if row.doctor.is_empty() {
            continue;
        }
        request = request.with_deleted(row.doctor, ShiftSlot::new(row.day, row.slot)?);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;

    #[test]
    fn test_read_request() {
        let csv = "Doctor,Day,Slot\nA,3,1\nA, 4 , 2\nB,1,1\n";
        let request = read_revision_request(csv.as_bytes(), 2).unwrap();

        assert_eq!(request.week, 2);
        assert_eq!(request.deleted["A"].len(), 2);
        assert!(request.is_deleted("A", ShiftSlot::new(4, 2).unwrap()));
        assert!(request.is_deleted("B", ShiftSlot::new(1, 1).unwrap()));
        assert!(!request.is_deleted("B", ShiftSlot::new(1, 2).unwrap()));
    }

    #[test]
    fn test_invalid_slot() {
        let csv = "Doctor,Day,Slot\nA,8,1\n";
        let err = read_revision_request(csv.as_bytes(), 1).unwrap_err();
        assert!(matches!(err, RosterError::InvalidSlot { day: 8, slot: 1 }));
    }

    #[test]
    fn test_malformed_row() {
        let csv = "Doctor,Day,Slot\nA,monday,1\n";
        assert!(matches!(
            read_revision_request(csv.as_bytes(), 1),
            Err(RosterError::Csv(_))
        ));
    }
}
