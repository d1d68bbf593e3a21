//! Incremental revision of a published week.
//!
//! Vacates the requested shifts and re-solves only the part of the schedule
//! they touch. Everything else is left exactly as published.
//!
//! # Algorithm
//!
//! 1. Split the published schedule into *retained* assignments (per doctor)
//!    and *vacated* cells (assignments named in the request).
//! 2. Build a network whose cabinet layer is only retained ∪ vacated cells.
//!    Each doctor may move into a vacated cell (if eligible) and is pinned to
//!    their own retained cells; vacated slots are blocked for the doctor who
//!    gave them up.
//! 3. Quotas: a doctor who lost shifts gets their pre-deletion count, so the
//!    solver looks for like-for-like replacements; everyone else gets
//!    `max(weekly maximum, retained count)`.
//! 4. Penalties start at half the retained count plus the exemption start
//!    penalty.
//! 5. Retained assignments are forced in, then the solver fills what it can.
//!
//! Assignments held by doctors missing from the roster are copied through
//! and their cells stay out of the network.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::config::SolverConfig;
use crate::error::{RosterError, RosterResult};
use crate::flow::{
    DoctorDemand, FlowOutcome, FlowShortfall, FlowSolver, MandatorySeeder, NetworkBuilder,
    PenaltyState,
};
use crate::models::{CabinetCatalog, CabinetSlot, DoctorProfile, Schedule, ShiftSlot};

/// Jitter stream offset keeping revision solves apart from weekly passes.
const REVISION_STREAM: u64 = 1 << 32;

/// Shifts to vacate in one published week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionRequest {
    /// Week the published schedule belongs to (1-based).
    pub week: u8,
    /// Doctor → slots they no longer work.
    pub deleted: BTreeMap<String, BTreeSet<ShiftSlot>>,
}

impl RevisionRequest {
    /// Creates an empty request for a week.
    pub fn new(week: u8) -> Self {
        Self {
            week,
            deleted: BTreeMap::new(),
        }
    }

    /// Adds a slot to vacate.
    pub fn with_deleted(mut self, doctor: impl Into<String>, slot: ShiftSlot) -> Self {
        self.deleted.entry(doctor.into()).or_default().insert(slot);
        self
    }

    /// Whether `doctor` gave up `slot`.
    pub fn is_deleted(&self, doctor: &str, slot: ShiftSlot) -> bool {
        self.deleted.get(doctor).is_some_and(|s| s.contains(&slot))
    }
}

/// Result of a revision.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionOutcome {
    /// Revised schedule.
    pub schedule: Schedule,
    /// Solver result (retained units included in `flow.flow`).
    pub flow: FlowOutcome,
    /// Previously filled cells the solver was asked to cover.
    pub expected: u64,
    /// Set when some vacated cells found no replacement.
    pub shortfall: Option<FlowShortfall>,
    /// Cells vacated by the request.
    pub vacated: BTreeSet<CabinetSlot>,
    /// Vacated cells still empty after the revision.
    pub unfilled: BTreeSet<CabinetSlot>,
}

impl RevisionOutcome {
    /// Whether every vacated cell was reassigned.
    pub fn fully_relocated(&self) -> bool {
        self.unfilled.is_empty()
    }
}

/// Re-solves the vacated part of a published week.
///
/// # Example
/// ```
/// use u_roster::config::SolverConfig;
/// use u_roster::models::{CabinetCatalog, CabinetSlot, DoctorProfile, Schedule, ShiftSlot};
/// use u_roster::scheduler::{RevisionEngine, RevisionRequest};
///
/// let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
/// let doctors: Vec<DoctorProfile> = ["A", "B"]
///     .iter()
///     .map(|id| {
///         DoctorProfile::new(*id)
///             .with_specialization("therapy")
///             .with_preferred_location("North")
///     })
///     .collect();
/// let config = SolverConfig::deterministic();
///
/// let slot = ShiftSlot::new(3, 1).unwrap();
/// let cell = CabinetSlot::new("North", "101", slot);
/// let mut published = Schedule::for_catalog(&catalog);
/// published.assign(cell.clone(), "A");
///
/// let request = RevisionRequest::new(1).with_deleted("A", slot);
/// let outcome = RevisionEngine::new(&catalog, &doctors, &config)
///     .revise(&published, &request)
///     .unwrap();
/// assert_eq!(outcome.schedule.get(&cell), Some("B"));
/// ```
#[derive(Debug, Clone)]
pub struct RevisionEngine<'a> {
    catalog: &'a CabinetCatalog,
    doctors: &'a [DoctorProfile],
    config: &'a SolverConfig,
}

impl<'a> RevisionEngine<'a> {
    /// Creates a revision engine.
    pub fn new(catalog: &'a CabinetCatalog, doctors: &'a [DoctorProfile], config: &'a SolverConfig) -> Self {
        Self {
            catalog,
            doctors,
            config,
        }
    }

    /// Vacates the requested shifts of `published` and reassigns them.
    ///
    /// # Errors
    /// - [`RosterError::InvalidWeek`] if the request's week is out of range.
    /// - [`RosterError::UnknownDoctor`] if the request names a doctor not in
    ///   the roster.
    /// - Seeding errors if the published schedule is internally inconsistent
    ///   (e.g. a doctor in two cabinets in the same slot).
    pub fn revise(&self, published: &Schedule, request: &RevisionRequest) -> RosterResult<RevisionOutcome> {
        let weeks = self.config.weeks_per_month;
        if request.week == 0 || usize::from(request.week) > weeks {
            return Err(RosterError::InvalidWeek {
                week: request.week,
                weeks,
            });
        }
        let roster: BTreeSet<&str> = self.doctors.iter().map(|d| d.id.as_str()).collect();
        if let Some(unknown) = request.deleted.keys().find(|d| !roster.contains(d.as_str())) {
            return Err(RosterError::UnknownDoctor(unknown.clone()));
        }

        let mut retained: BTreeMap<String, BTreeSet<CabinetSlot>> = BTreeMap::new();
        let mut before: BTreeMap<&str, u32> = BTreeMap::new();
        let mut vacated = BTreeSet::new();
        let mut schedule = published.clone();

        for (cell, doctor) in published.assignments() {
            if !roster.contains(doctor) {
                continue;
            }
            *before.entry(doctor).or_insert(0) += 1;
            if request.is_deleted(doctor, cell.slot) {
                vacated.insert(cell.clone());
            } else {
                retained.entry(doctor.to_string()).or_default().insert(cell.clone());
            }
        }
        for cell in &vacated {
            schedule.clear(cell);
        }

        let mut cells: BTreeSet<CabinetSlot> = vacated.clone();
        cells.extend(retained.values().flatten().cloned());
        let empty = BTreeSet::new();

        let demands: Vec<DoctorDemand<'_>> = self
            .doctors
            .iter()
            .map(|d| {
                let held = retained.get(&d.id).unwrap_or(&empty);
                let quota = if request.deleted.contains_key(&d.id) {
                    before.get(d.id.as_str()).copied().unwrap_or(0)
                } else {
                    d.max_quota(request.week, weeks).max(held.len() as u32)
                };
                let mut blocked = d.forbidden_in(request.week);
                if let Some(slots) = request.deleted.get(&d.id) {
                    blocked.extend(slots.iter().copied());
                }
                DoctorDemand::new(d, quota)
                    .with_blocked(blocked)
                    .with_allowed(vacated.clone())
                    .with_pinned(held.clone())
            })
            .collect();

        let mut net = NetworkBuilder::new(self.catalog, self.config)
            .restrict_to(cells)
            .with_demands(demands)
            .build();
        let mut state = self.start_penalties(&retained);

        let seeded = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &retained)?;
        let stream = REVISION_STREAM + u64::from(request.week);
        let flow = FlowSolver::new(self.config, stream).run(&mut net, &mut state, &mut schedule, seeded)?;

        let expected = seeded.units + vacated.len() as u64;
        let shortfall = FlowShortfall::check(expected, flow.flow);
        let unfilled: BTreeSet<CabinetSlot> = vacated
            .iter()
            .filter(|c| schedule.get(c).is_none())
            .cloned()
            .collect();

        if let Some(s) = shortfall {
            warn!(
                week = request.week,
                expected = s.expected,
                delivered = s.delivered,
                unfilled = unfilled.len(),
                "not all vacated shifts found a replacement"
            );
        }
        info!(
            week = request.week,
            vacated = vacated.len(),
            refilled = vacated.len() - unfilled.len(),
            cost = flow.cost,
            "revision complete"
        );

        Ok(RevisionOutcome {
            schedule,
            flow,
            expected,
            shortfall,
            vacated,
            unfilled,
        })
    }

    fn start_penalties(&self, retained: &BTreeMap<String, BTreeSet<CabinetSlot>>) -> PenaltyState {
        let mut state = PenaltyState::new();
        for d in self.doctors {
            let held = retained.get(&d.id).map_or(0, BTreeSet::len) as f64;
            let start = if d.fine_exempt {
                self.config.exempt_start_penalty
            } else {
                0.0
            };
            state.seed_doctor(d.id.clone(), held / 2.0 + start);
        }
        state
    }
}
