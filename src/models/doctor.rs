//! Doctor profile model.
//!
//! Doctors are the resources being rostered. Each profile carries the
//! specializations that decide which cabinets the doctor may occupy, a ranked
//! list of preferred locations, monthly workload quotas, and week-tagged
//! forbidden and required shifts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{CabinetSlot, ShiftSlot, SLOTS_PER_WEEK};

/// A forbidden slot in a specific week of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekSlot {
    /// Week of month (1-based).
    pub week: u8,
    /// Slot within the week.
    pub slot: ShiftSlot,
}

/// A shift that must appear in the output for a specific week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequiredShift {
    /// Week of month (1-based).
    pub week: u8,
    /// Location name.
    pub location: String,
    /// Cabinet identifier.
    pub cabinet: String,
    /// Slot within the week.
    pub slot: ShiftSlot,
}

/// A doctor available for rostering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    /// Unique doctor identifier.
    pub id: String,
    /// Specializations, in declaration order.
    #[serde(default)]
    pub specializations: Vec<String>,
    /// Preferred locations; position is the preference rank (0 = best).
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    /// Minimum shifts per month. `None` = no minimum.
    #[serde(default)]
    pub min_shifts: Option<u32>,
    /// Maximum shifts per month. `None` = every slot of every week.
    #[serde(default)]
    pub max_shifts: Option<u32>,
    /// Slots the doctor must not work.
    #[serde(default)]
    pub forbidden: BTreeSet<WeekSlot>,
    /// Shifts the doctor must work.
    #[serde(default)]
    pub required: BTreeSet<RequiredShift>,
    /// Fine-exempt doctors start every week with a higher fairness penalty.
    #[serde(default)]
    pub fine_exempt: bool,
}

/// Splits `total` into `parts` near-equal shares.
///
/// Each share is `total / parts`; the remainder is handed out one unit at a
/// time to the earliest shares.
///
/// ```
/// use u_roster::models::distribute_evenly;
///
/// assert_eq!(distribute_evenly(10, 4), vec![3, 3, 2, 2]);
/// assert_eq!(distribute_evenly(0, 4), vec![0, 0, 0, 0]);
/// ```
pub fn distribute_evenly(total: u32, parts: usize) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts as u32;
    let remainder = (total % parts as u32) as usize;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

impl DoctorProfile {
    /// Creates a doctor with no specializations, preferences, or quotas.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            specializations: Vec::new(),
            preferred_locations: Vec::new(),
            min_shifts: None,
            max_shifts: None,
            forbidden: BTreeSet::new(),
            required: BTreeSet::new(),
            fine_exempt: false,
        }
    }

    /// Adds a specialization.
    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specializations.push(specialization.into());
        self
    }

    /// Appends a preferred location (ranked after those already present).
    pub fn with_preferred_location(mut self, location: impl Into<String>) -> Self {
        self.preferred_locations.push(location.into());
        self
    }

    /// Sets monthly quotas.
    pub fn with_quota(mut self, min_shifts: u32, max_shifts: u32) -> Self {
        self.min_shifts = Some(min_shifts);
        self.max_shifts = Some(max_shifts);
        self
    }

    /// Forbids a slot in a week.
    pub fn with_forbidden(mut self, week: u8, slot: ShiftSlot) -> Self {
        self.forbidden.insert(WeekSlot { week, slot });
        self
    }

    /// Requires a shift in a week.
    pub fn with_required(
        mut self,
        week: u8,
        location: impl Into<String>,
        cabinet: impl Into<String>,
        slot: ShiftSlot,
    ) -> Self {
        self.required.insert(RequiredShift {
            week,
            location: location.into(),
            cabinet: cabinet.into(),
            slot,
        });
        self
    }

    /// Sets the fine-exemption flag.
    pub fn with_fine_exempt(mut self, fine_exempt: bool) -> Self {
        self.fine_exempt = fine_exempt;
        self
    }

    /// Whether the doctor holds a specialization.
    pub fn has_specialization(&self, specialization: &str) -> bool {
        self.specializations.iter().any(|s| s == specialization)
    }

    /// Zero-based rank of a location in the preference list.
    pub fn preference_rank(&self, location: &str) -> Option<usize> {
        self.preferred_locations.iter().position(|l| l == location)
    }

    /// Minimum shifts for a week (1-based) of a `weeks`-week month.
    pub fn min_quota(&self, week: u8, weeks: usize) -> u32 {
        week_share(self.min_shifts.unwrap_or(0), week, weeks)
    }

    /// Maximum shifts for a week (1-based) of a `weeks`-week month.
    pub fn max_quota(&self, week: u8, weeks: usize) -> u32 {
        let monthly = self
            .max_shifts
            .unwrap_or((weeks * SLOTS_PER_WEEK) as u32);
        week_share(monthly, week, weeks)
    }

    /// Slots forbidden in `week`.
    pub fn forbidden_in(&self, week: u8) -> BTreeSet<ShiftSlot> {
        self.forbidden
            .iter()
            .filter(|f| f.week == week)
            .map(|f| f.slot)
            .collect()
    }

    /// Shifts required in `week`.
    pub fn required_in(&self, week: u8) -> BTreeSet<CabinetSlot> {
        self.required
            .iter()
            .filter(|r| r.week == week)
            .map(|r| CabinetSlot::new(r.location.clone(), r.cabinet.clone(), r.slot))
            .collect()
    }
}

fn week_share(monthly: u32, week: u8, weeks: usize) -> u32 {
    distribute_evenly(monthly, weeks)
        .get((week as usize).wrapping_sub(1))
        .copied()
        .unwrap_or(0)
}
