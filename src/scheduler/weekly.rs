//! Two-pass weekly scheduler.
//!
//! # Algorithm
//!
//! 1. **Minimum pass**: every doctor's Source edge carries their weekly
//!    minimum (raised to cover their required shifts). Required shifts are
//!    forced in first; the solver then fills minimum quotas.
//! 2. **Maximum pass**: a fresh network with weekly maximum quotas. Every
//!    assignment the minimum pass produced is forced in as mandatory, so the
//!    second pass can only add work, never take it away.
//!
//! Each pass builds its own network and penalty state. Both start from the
//! same per-doctor penalties: the fine-exemption start penalty plus the
//! caller's running baseline (see [`MonthlyScheduler`](super::MonthlyScheduler)).
//!
//! # Complexity
//! Two solver runs, each O(F · V · E).

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::config::SolverConfig;
use crate::error::{RosterError, RosterResult};
use crate::flow::{
    DoctorDemand, FlowOutcome, FlowShortfall, FlowSolver, MandatorySeeder, NetworkBuilder,
    PenaltyState,
};
use crate::models::{CabinetCatalog, CabinetSlot, DoctorProfile, Schedule};
use crate::validation::validate_roster;

/// Which quota a pass puts on the Source→Doctor edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandMode {
    /// Weekly minimum shifts.
    Minimum,
    /// Weekly maximum shifts.
    Maximum,
}

impl DemandMode {
    fn stream(self) -> u64 {
        match self {
            DemandMode::Minimum => 0,
            DemandMode::Maximum => 1,
        }
    }
}

/// Result of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    /// Quota mode of the pass.
    pub mode: DemandMode,
    /// Solver result (forced units included in `flow.flow`).
    pub flow: FlowOutcome,
    /// Sum of the quotas on the Source edges.
    pub expected: u64,
    /// Set when fewer units than `expected` were delivered.
    pub shortfall: Option<FlowShortfall>,
}

/// Result of scheduling one week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekOutcome {
    /// Week number (1-based).
    pub week: u8,
    /// Final schedule of the maximum pass.
    pub schedule: Schedule,
    /// Minimum-pass result.
    pub minimum: PassOutcome,
    /// Maximum-pass result.
    pub maximum: PassOutcome,
}

impl WeekOutcome {
    /// Whether some doctors could not be given their weekly minimum.
    pub fn minimum_shortfall(&self) -> Option<FlowShortfall> {
        self.minimum.shortfall
    }

    /// Cost accumulated over both passes.
    pub fn total_cost(&self) -> f64 {
        self.minimum.flow.cost + self.maximum.flow.cost
    }
}

/// Schedules single weeks of a month.
///
/// # Example
/// ```
/// use u_roster::config::SolverConfig;
/// use u_roster::models::{CabinetCatalog, DoctorProfile};
/// use u_roster::scheduler::WeeklyScheduler;
///
/// let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
/// let doctors = vec![
///     DoctorProfile::new("D1")
///         .with_specialization("therapy")
///         .with_preferred_location("North")
///         .with_quota(8, 20),
/// ];
/// let config = SolverConfig::deterministic();
///
/// let outcome = WeeklyScheduler::new(&catalog, &doctors, &config)
///     .schedule_week(1)
///     .unwrap();
/// // 20 per month → 5 in week 1
/// assert_eq!(outcome.schedule.count_for("D1"), 5);
/// assert!(outcome.minimum_shortfall().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct WeeklyScheduler<'a> {
    catalog: &'a CabinetCatalog,
    doctors: &'a [DoctorProfile],
    config: &'a SolverConfig,
}

impl<'a> WeeklyScheduler<'a> {
    /// Creates a scheduler over a catalog and roster.
    pub fn new(catalog: &'a CabinetCatalog, doctors: &'a [DoctorProfile], config: &'a SolverConfig) -> Self {
        Self {
            catalog,
            doctors,
            config,
        }
    }

    /// Validates the roster against the catalog.
    pub fn validate(&self) -> RosterResult<()> {
        validate_roster(self.doctors, self.catalog, self.config.weeks_per_month)
            .map_err(RosterError::Validation)
    }

    /// Schedules a week with no carried-over baseline.
    pub fn schedule_week(&self, week: u8) -> RosterResult<WeekOutcome> {
        self.schedule_week_with_baseline(week, &BTreeMap::new())
    }

    /// Schedules a week, adding `baseline[doctor]` to each doctor's start penalty.
    ///
    /// # Errors
    /// - [`RosterError::InvalidWeek`] if `week` is outside `1..=weeks_per_month`.
    /// - [`RosterError::Validation`] if the roster fails validation.
    /// - Any hard error from seeding or solving.
    pub fn schedule_week_with_baseline(
        &self,
        week: u8,
        baseline: &BTreeMap<String, f64>,
    ) -> RosterResult<WeekOutcome> {
        self.check_week(week)?;
        self.validate()?;
        self.solve_week(week, baseline)
    }

    /// Both passes, without the input checks.
    pub(crate) fn solve_week(&self, week: u8, baseline: &BTreeMap<String, f64>) -> RosterResult<WeekOutcome> {
        let required: BTreeMap<String, BTreeSet<CabinetSlot>> = self
            .doctors
            .iter()
            .map(|d| (d.id.clone(), d.required_in(week)))
            .filter(|(_, shifts)| !shifts.is_empty())
            .collect();

        let (first, minimum) = self.run_pass(week, DemandMode::Minimum, baseline, &required)?;
        let (schedule, maximum) = self.run_pass(week, DemandMode::Maximum, baseline, &first.by_doctor())?;

        Ok(WeekOutcome {
            week,
            schedule,
            minimum,
            maximum,
        })
    }

    /// Runs one pass with the given mandatory assignments forced in.
    pub fn run_pass(
        &self,
        week: u8,
        mode: DemandMode,
        baseline: &BTreeMap<String, f64>,
        mandatory: &BTreeMap<String, BTreeSet<CabinetSlot>>,
    ) -> RosterResult<(Schedule, PassOutcome)> {
        let demands: Vec<DoctorDemand<'_>> = self
            .doctors
            .iter()
            .map(|d| {
                let forced = mandatory.get(&d.id).map_or(0, |s| s.len() as u32);
                DoctorDemand::new(d, self.quota(d, week, mode).max(forced)).with_blocked(d.forbidden_in(week))
            })
            .collect();
        let expected: u64 = demands.iter().map(|d| u64::from(d.quota)).sum();

        let mut net = NetworkBuilder::new(self.catalog, self.config)
            .with_demands(demands)
            .build();
        let mut state = self.start_penalties(baseline);
        let mut schedule = Schedule::for_catalog(self.catalog);

        let seeded = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, mandatory)?;
        let stream = u64::from(week) * 2 + mode.stream();
        let flow = FlowSolver::new(self.config, stream).run(&mut net, &mut state, &mut schedule, seeded)?;

        let shortfall = match mode {
            DemandMode::Minimum => FlowShortfall::check(expected, flow.flow),
            DemandMode::Maximum => None,
        };
        if let Some(s) = shortfall {
            warn!(
                week,
                expected = s.expected,
                delivered = s.delivered,
                "not all doctors could be given their minimum shifts"
            );
        }
        info!(
            week,
            mode = ?mode,
            flow = flow.flow,
            cost = flow.cost,
            seeded = seeded.units,
            "pass complete"
        );

        Ok((
            schedule,
            PassOutcome {
                mode,
                flow,
                expected,
                shortfall,
            },
        ))
    }

    /// Start-of-week penalties: exemption start penalty plus baseline.
    pub fn start_penalties(&self, baseline: &BTreeMap<String, f64>) -> PenaltyState {
        let mut state = PenaltyState::new();
        for d in self.doctors {
            let start = if d.fine_exempt {
                self.config.exempt_start_penalty
            } else {
                0.0
            };
            state.seed_doctor(d.id.clone(), start + baseline.get(&d.id).copied().unwrap_or(0.0));
        }
        state
    }

    fn quota(&self, doctor: &DoctorProfile, week: u8, mode: DemandMode) -> u32 {
        let weeks = self.config.weeks_per_month;
        match mode {
            DemandMode::Minimum => doctor.min_quota(week, weeks),
            DemandMode::Maximum => doctor.max_quota(week, weeks),
        }
    }

    pub(crate) fn check_week(&self, week: u8) -> RosterResult<()> {
        let weeks = self.config.weeks_per_month;
        if week == 0 || usize::from(week) > weeks {
            return Err(RosterError::InvalidWeek { week, weeks });
        }
        Ok(())
    }
}
