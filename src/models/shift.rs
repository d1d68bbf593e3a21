//! Shift slot model.
//!
//! A week is divided into a fixed grid of schedulable periods: seven days,
//! two slots per day. A slot carries no calendar date and no duration; it is
//! only a (day-of-week, slot-of-day) coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RosterError, RosterResult};

/// Days per scheduling week.
pub const DAYS_PER_WEEK: u8 = 7;
/// Slots per day.
pub const SLOTS_PER_DAY: u8 = 2;
/// Distinct slots per week.
pub const SLOTS_PER_WEEK: usize = (DAYS_PER_WEEK as usize) * (SLOTS_PER_DAY as usize);

/// A (day, slot) coordinate within a week.
///
/// Days are numbered `1..=7`, slots `1..=2`. Ordering is day-major, so
/// iterating a sorted collection walks the week chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftSlot {
    /// Day of week (1..=7).
    pub day: u8,
    /// Slot of day (1..=2).
    pub slot: u8,
}

impl ShiftSlot {
    /// Creates a slot, rejecting coordinates outside the weekly grid.
    pub fn new(day: u8, slot: u8) -> RosterResult<Self> {
        if !(1..=DAYS_PER_WEEK).contains(&day) || !(1..=SLOTS_PER_DAY).contains(&slot) {
            return Err(RosterError::InvalidSlot { day, slot });
        }
        Ok(Self { day, slot })
    }

    /// All slots of a week in chronological order.
    pub fn all() -> impl Iterator<Item = ShiftSlot> {
        (1..=DAYS_PER_WEEK)
            .flat_map(|day| (1..=SLOTS_PER_DAY).map(move |slot| ShiftSlot { day, slot }))
    }

    /// Whether the coordinates lie inside the weekly grid.
    ///
    /// Values built through [`ShiftSlot::new`] are always valid; this is for
    /// slots that arrived through deserialization.
    pub fn is_valid(&self) -> bool {
        (1..=DAYS_PER_WEEK).contains(&self.day) && (1..=SLOTS_PER_DAY).contains(&self.slot)
    }

    /// Zero-based position in the weekly grid (0..14).
    #[inline]
    pub fn index(&self) -> usize {
        (self.day as usize - 1) * SLOTS_PER_DAY as usize + (self.slot as usize - 1)
    }
}

impl fmt::Display for ShiftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.day, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_slots_enumerated() {
        let slots: Vec<ShiftSlot> = ShiftSlot::all().collect();
        assert_eq!(slots.len(), SLOTS_PER_WEEK);
        assert_eq!(slots[0], ShiftSlot { day: 1, slot: 1 });
        assert_eq!(slots[1], ShiftSlot { day: 1, slot: 2 });
        assert_eq!(slots[13], ShiftSlot { day: 7, slot: 2 });
    }

    #[test]
    fn test_slot_bounds() {
        assert!(ShiftSlot::new(1, 1).is_ok());
        assert!(ShiftSlot::new(7, 2).is_ok());
        assert!(ShiftSlot::new(0, 1).is_err());
        assert!(ShiftSlot::new(8, 1).is_err());
        assert!(ShiftSlot::new(3, 3).is_err());
    }

    #[test]
    fn test_slot_index_matches_enumeration() {
        for (i, s) in ShiftSlot::all().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn test_slot_display() {
        let s = ShiftSlot::new(3, 1).unwrap();
        assert_eq!(s.to_string(), "(3, 1)");
    }
}
