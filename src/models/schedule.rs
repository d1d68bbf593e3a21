//! Schedule (solution) model.
//!
//! A schedule holds exactly one cell per cabinet per shift slot; each cell is
//! either empty or names the doctor working there. It is the only value that
//! outlives a solve: it is written out after generation and read back in for
//! revision.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{CabinetCatalog, CabinetKey, CabinetSlot, ShiftSlot};

/// A weekly roster: (location, cabinet, slot) → doctor or empty.
///
/// Serialized as a flat list of [`ScheduleEntry`] rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ScheduleEntry>", into = "Vec<ScheduleEntry>")]
pub struct Schedule {
    cells: BTreeMap<CabinetSlot, Option<String>>,
}

/// One cell of a schedule in flat form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Location name.
    pub location: String,
    /// Cabinet identifier.
    pub cabinet: String,
    /// Day of week (1..=7).
    pub day: u8,
    /// Slot of day (1..=2).
    pub slot: u8,
    /// Assigned doctor, if any.
    pub doctor: Option<String>,
}

impl Schedule {
    /// Creates a schedule with no cells.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an all-empty schedule covering every slot of the given cabinets.
    pub fn for_cabinets<I: IntoIterator<Item = CabinetKey>>(cabinets: I) -> Self {
        let mut schedule = Self::new();
        for key in cabinets {
            for slot in ShiftSlot::all() {
                schedule.cells.insert(key.at(slot), None);
            }
        }
        schedule
    }

    /// Creates an all-empty schedule covering every cabinet in the catalog.
    pub fn for_catalog(catalog: &CabinetCatalog) -> Self {
        Self::for_cabinets(catalog.cabinets())
    }

    /// Ensures a cell exists, leaving an existing assignment untouched.
    pub fn add_cell(&mut self, cell: CabinetSlot) {
        self.cells.entry(cell).or_insert(None);
    }

    /// Whether the schedule has a cell for the given cabinet slot.
    pub fn has_cell(&self, cell: &CabinetSlot) -> bool {
        self.cells.contains_key(cell)
    }

    /// Doctor assigned to a cell (`None` if empty or unknown).
    pub fn get(&self, cell: &CabinetSlot) -> Option<&str> {
        self.cells.get(cell).and_then(|d| d.as_deref())
    }

    /// Assigns a doctor, creating the cell if needed.
    pub fn assign(&mut self, cell: CabinetSlot, doctor: impl Into<String>) {
        self.cells.insert(cell, Some(doctor.into()));
    }

    /// Empties a cell if it exists.
    pub fn clear(&mut self, cell: &CabinetSlot) {
        if let Some(entry) = self.cells.get_mut(cell) {
            *entry = None;
        }
    }

    /// Empties a cell only if it currently holds `doctor`.
    ///
    /// Returns whether the cell was cleared.
    pub fn clear_if(&mut self, cell: &CabinetSlot, doctor: &str) -> bool {
        match self.cells.get_mut(cell) {
            Some(entry) if entry.as_deref() == Some(doctor) => {
                *entry = None;
                true
            }
            _ => false,
        }
    }

    /// All cells in order, filled or not.
    pub fn cells(&self) -> impl Iterator<Item = (&CabinetSlot, Option<&str>)> {
        self.cells.iter().map(|(c, d)| (c, d.as_deref()))
    }

    /// Filled cells in order.
    pub fn assignments(&self) -> impl Iterator<Item = (&CabinetSlot, &str)> {
        self.cells
            .iter()
            .filter_map(|(c, d)| d.as_deref().map(|d| (c, d)))
    }

    /// Filled cells grouped by doctor.
    pub fn by_doctor(&self) -> BTreeMap<String, BTreeSet<CabinetSlot>> {
        let mut out: BTreeMap<String, BTreeSet<CabinetSlot>> = BTreeMap::new();
        for (cell, doctor) in self.assignments() {
            out.entry(doctor.to_string()).or_default().insert(cell.clone());
        }
        out
    }

    /// Cells assigned to one doctor.
    pub fn shifts_of(&self, doctor: &str) -> BTreeSet<CabinetSlot> {
        self.assignments()
            .filter(|(_, d)| *d == doctor)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Number of cells assigned to one doctor.
    pub fn count_for(&self, doctor: &str) -> usize {
        self.assignments().filter(|(_, d)| *d == doctor).count()
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.assignments().count()
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether the schedule has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct cabinets covered by the schedule.
    pub fn cabinets(&self) -> BTreeSet<CabinetKey> {
        self.cells.keys().map(CabinetSlot::key).collect()
    }
}

impl From<Vec<ScheduleEntry>> for Schedule {
    fn from(entries: Vec<ScheduleEntry>) -> Self {
        let cells = entries
            .into_iter()
            .map(|e| {
                let slot = ShiftSlot {
                    day: e.day,
                    slot: e.slot,
                };
                (CabinetSlot::new(e.location, e.cabinet, slot), e.doctor)
            })
            .collect();
        Self { cells }
    }
}

impl From<Schedule> for Vec<ScheduleEntry> {
    fn from(schedule: Schedule) -> Self {
        schedule
            .cells
            .into_iter()
            .map(|(c, doctor)| ScheduleEntry {
                location: c.location,
                cabinet: c.cabinet,
                day: c.slot.day,
                slot: c.slot.slot,
                doctor,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(cab: &str, day: u8, slot: u8) -> CabinetSlot {
        CabinetSlot::new("North", cab, ShiftSlot::new(day, slot).unwrap())
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::for_cabinets([CabinetKey::new("North", "101"), CabinetKey::new("North", "102")]);
        s.assign(cell("101", 1, 1), "D1");
        s.assign(cell("101", 1, 2), "D2");
        s.assign(cell("102", 3, 1), "D1");
        s
    }

    #[test]
    fn test_for_cabinets_covers_week() {
        let s = Schedule::for_cabinets([CabinetKey::new("North", "101")]);
        assert_eq!(s.cell_count(), 14);
        assert_eq!(s.filled_count(), 0);
        assert!(s.has_cell(&cell("101", 7, 2)));
    }

    #[test]
    fn test_assign_and_query() {
        let s = sample_schedule();
        assert_eq!(s.get(&cell("101", 1, 1)), Some("D1"));
        assert_eq!(s.get(&cell("102", 1, 1)), None);
        assert_eq!(s.filled_count(), 3);
        assert_eq!(s.count_for("D1"), 2);
        assert_eq!(s.count_for("D9"), 0);
    }

    #[test]
    fn test_by_doctor() {
        let s = sample_schedule();
        let by = s.by_doctor();
        assert_eq!(by.len(), 2);
        assert_eq!(by["D1"].len(), 2);
        assert!(by["D2"].contains(&cell("101", 1, 2)));
    }

    #[test]
    fn test_clear_if_only_matching_doctor() {
        let mut s = sample_schedule();
        assert!(!s.clear_if(&cell("101", 1, 1), "D2"));
        assert_eq!(s.get(&cell("101", 1, 1)), Some("D1"));
        assert!(s.clear_if(&cell("101", 1, 1), "D1"));
        assert_eq!(s.get(&cell("101", 1, 1)), None);
        assert!(s.has_cell(&cell("101", 1, 1)));
    }

    #[test]
    fn test_add_cell_keeps_assignment() {
        let mut s = sample_schedule();
        s.add_cell(cell("101", 1, 1));
        assert_eq!(s.get(&cell("101", 1, 1)), Some("D1"));
    }

    #[test]
    fn test_serde_flat_form() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
