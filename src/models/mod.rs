//! Rostering domain models.
//!
//! Provides the data types consumed and produced by the scheduling engine:
//! the weekly slot grid, the cabinet catalog, doctor profiles, and the
//! schedule itself.
//!
//! # Domain Mappings
//!
//! | u-roster | Generic scheduling |
//! |----------|--------------------|
//! | DoctorProfile | Human resource |
//! | CabinetSlot | Capacity-1 resource × time bucket |
//! | ShiftSlot | Time bucket |
//! | Schedule | Assignment plan |

mod catalog;
mod doctor;
mod schedule;
mod shift;

pub use catalog::{CabinetCatalog, CabinetKey, CabinetSlot};
pub use doctor::{distribute_evenly, DoctorProfile, RequiredShift, WeekSlot};
pub use schedule::{Schedule, ScheduleEntry};
pub use shift::{ShiftSlot, DAYS_PER_WEEK, SLOTS_PER_DAY, SLOTS_PER_WEEK};
