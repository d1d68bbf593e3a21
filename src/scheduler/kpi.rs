//! Roster quality metrics (KPIs).
//!
//! Computes coverage and fairness indicators from a finished weekly
//! schedule and the roster it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill Rate | Filled cabinet slots / all cabinet slots |
//! | Cabinet Utilization | Filled slots of a cabinet / slots per week |
//! | Load Spread | Max − min shifts among doctors with a non-zero weekly maximum |
//! | First-Choice Rate | Fraction of assignments at the doctor's top location |
//! | Below Minimum | Doctors assigned fewer shifts than their weekly minimum |

use std::collections::HashMap;

use crate::models::{CabinetKey, DoctorProfile, Schedule, SLOTS_PER_WEEK};

/// Weekly roster performance indicators.
#[derive(Debug, Clone)]
pub struct RosterKpi {
    /// Cabinet slots with a doctor.
    pub filled: usize,
    /// All cabinet slots in the schedule.
    pub total: usize,
    /// `filled / total` (1.0 for an empty schedule).
    pub fill_rate: f64,
    /// Shifts per rostered doctor (zero included).
    pub shifts_by_doctor: HashMap<String, usize>,
    /// Per-cabinet utilization (0.0..1.0).
    pub utilization_by_cabinet: HashMap<CabinetKey, f64>,
    /// Mean cabinet utilization.
    pub avg_utilization: f64,
    /// Max − min shifts among doctors who may work this week.
    pub load_spread: usize,
    /// Fraction of assignments at the doctor's first-ranked location.
    pub first_choice_rate: f64,
    /// Doctors below their weekly minimum, sorted by id.
    pub below_minimum: Vec<String>,
}

impl RosterKpi {
    /// Computes KPIs for `week` of a `weeks`-week month.
    pub fn calculate(schedule: &Schedule, doctors: &[DoctorProfile], week: u8, weeks: usize) -> Self {
        let filled = schedule.filled_count();
        let total = schedule.cell_count();
        let fill_rate = if total == 0 {
            1.0
        } else {
            filled as f64 / total as f64
        };

        let mut utilization_by_cabinet: HashMap<CabinetKey, f64> =
            schedule.cabinets().into_iter().map(|k| (k, 0.0)).collect();
        for (cell, _) in schedule.assignments() {
            *utilization_by_cabinet.entry(cell.key()).or_insert(0.0) += 1.0 / SLOTS_PER_WEEK as f64;
        }
        let avg_utilization = if utilization_by_cabinet.is_empty() {
            0.0
        } else {
            utilization_by_cabinet.values().sum::<f64>() / utilization_by_cabinet.len() as f64
        };

        let shifts_by_doctor: HashMap<String, usize> = doctors
            .iter()
            .map(|d| (d.id.clone(), schedule.count_for(&d.id)))
            .collect();

        let active: Vec<usize> = doctors
            .iter()
            .filter(|d| d.max_quota(week, weeks) > 0)
            .map(|d| shifts_by_doctor[&d.id])
            .collect();
        let load_spread = match (active.iter().max(), active.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };

        let mut first_choice = 0usize;
        let mut ranked = 0usize;
        for (cell, doctor) in schedule.assignments() {
            if let Some(profile) = doctors.iter().find(|d| d.id == doctor) {
                ranked += 1;
                if profile.preference_rank(&cell.location) == Some(0) {
                    first_choice += 1;
                }
            }
        }
        let first_choice_rate = if ranked == 0 {
            1.0
        } else {
            first_choice as f64 / ranked as f64
        };

        let mut below_minimum: Vec<String> = doctors
            .iter()
            .filter(|d| (shifts_by_doctor[&d.id] as u32) < d.min_quota(week, weeks))
            .map(|d| d.id.clone())
            .collect();
        below_minimum.sort();

        Self {
            filled,
            total,
            fill_rate,
            shifts_by_doctor,
            utilization_by_cabinet,
            avg_utilization,
            load_spread,
            first_choice_rate,
            below_minimum,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_spread: usize) -> bool {
        self.fill_rate >= min_fill_rate && self.load_spread <= max_spread && self.below_minimum.is_empty()
    }
}
