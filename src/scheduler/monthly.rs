//! Month-long scheduling with carried-over fairness.
//!
//! Weeks are solved strictly in order. After each week every assigned shift
//! adds `weekly_assignment_penalty` to its doctor's running baseline, and
//! fine-exempt doctors' baselines are then multiplied by
//! `exempt_growth_factor`. The baseline seeds the next week's penalties, so
//! doctors who worked a lot early in the month become progressively more
//! expensive to assign.

use std::collections::BTreeMap;

use tracing::info;

use super::{WeekOutcome, WeeklyScheduler};
use crate::config::SolverConfig;
use crate::error::RosterResult;
use crate::models::{CabinetCatalog, DoctorProfile, Schedule};

/// Running per-doctor fairness baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FairnessBaseline {
    values: BTreeMap<String, f64>,
}

impl FairnessBaseline {
    /// Zero baseline for every doctor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline of one doctor.
    pub fn get(&self, doctor: &str) -> f64 {
        self.values.get(doctor).copied().unwrap_or(0.0)
    }

    /// All baselines.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Folds a finished week into the baseline.
    pub fn record_week(&mut self, schedule: &Schedule, doctors: &[DoctorProfile], config: &SolverConfig) {
        for (_, doctor) in schedule.assignments() {
            *self.values.entry(doctor.to_string()).or_insert(0.0) += config.weekly_assignment_penalty;
        }
        for d in doctors.iter().filter(|d| d.fine_exempt) {
            if let Some(v) = self.values.get_mut(&d.id) {
                *v *= config.exempt_growth_factor;
            }
        }
    }
}

/// Result of scheduling a month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthOutcome {
    /// One outcome per week, in order.
    pub weeks: Vec<WeekOutcome>,
    /// Baseline in force at the start of each week (entry 0 is week 1).
    pub baselines: Vec<FairnessBaseline>,
}

impl MonthOutcome {
    /// Schedule of a 1-based week.
    pub fn schedule(&self, week: u8) -> Option<&Schedule> {
        self.weeks.iter().find(|w| w.week == week).map(|w| &w.schedule)
    }

    /// Shifts per doctor over the whole month.
    pub fn totals(&self) -> BTreeMap<String, usize> {
        let mut totals = BTreeMap::new();
        for week in &self.weeks {
            for (_, doctor) in week.schedule.assignments() {
                *totals.entry(doctor.to_string()).or_insert(0) += 1;
            }
        }
        totals
    }

    /// Weeks whose minimum pass fell short.
    pub fn weeks_with_shortfall(&self) -> Vec<u8> {
        self.weeks
            .iter()
            .filter(|w| w.minimum_shortfall().is_some())
            .map(|w| w.week)
            .collect()
    }
}

/// Runs the weekly scheduler over every week of the month.
///
/// # Example
/// ```
/// use u_roster::config::SolverConfig;
/// use u_roster::models::{CabinetCatalog, DoctorProfile};
/// use u_roster::scheduler::MonthlyScheduler;
///
/// let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
/// let doctors = vec![
///     DoctorProfile::new("D1")
///         .with_specialization("therapy")
///         .with_preferred_location("North")
///         .with_quota(0, 10),
/// ];
/// let config = SolverConfig::deterministic();
///
/// let month = MonthlyScheduler::new(&catalog, &doctors, &config).run().unwrap();
/// assert_eq!(month.weeks.len(), 4);
/// // 10 split over 4 weeks: 3, 3, 2, 2
/// assert_eq!(month.totals()["D1"], 10);
/// ```
#[derive(Debug, Clone)]
pub struct MonthlyScheduler<'a> {
    weekly: WeeklyScheduler<'a>,
    doctors: &'a [DoctorProfile],
    config: &'a SolverConfig,
}

impl<'a> MonthlyScheduler<'a> {
    /// Creates a monthly scheduler.
    pub fn new(catalog: &'a CabinetCatalog, doctors: &'a [DoctorProfile], config: &'a SolverConfig) -> Self {
        Self {
            weekly: WeeklyScheduler::new(catalog, doctors, config),
            doctors,
            config,
        }
    }

    /// Schedules weeks `1..=weeks_per_month` in order.
    ///
    /// # Errors
    /// Validation failures, or any hard error from a week's solve. Weeks
    /// already solved are discarded.
    pub fn run(&self) -> RosterResult<MonthOutcome> {
        self.weekly.validate()?;

        let weeks = self.config.weeks_per_month;
        let mut baseline = FairnessBaseline::new();
        let mut outcome = MonthOutcome {
            weeks: Vec::with_capacity(weeks),
            baselines: Vec::with_capacity(weeks),
        };

        for week in 1..=weeks {
            let week = u8::try_from(week).unwrap_or(u8::MAX);
            self.weekly.check_week(week)?;
            let result = self.weekly.solve_week(week, baseline.values())?;
            info!(
                week,
                filled = result.schedule.filled_count(),
                cells = result.schedule.cell_count(),
                cost = result.total_cost(),
                "week scheduled"
            );
            outcome.baselines.push(baseline.clone());
            baseline.record_week(&result.schedule, self.doctors, self.config);
            outcome.weeks.push(result);
        }

        Ok(outcome)
    }
}
