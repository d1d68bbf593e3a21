//! Cost and penalty model.
//!
//! # Edge costs
//!
//! | Arc | Cost |
//! |-----|------|
//! | DoctorShift→CabinetShift | `pref + (penalty[doctor] + load[cabinet]) × multiplier` |
//! | CabinetShift→DoctorShift (cancel) | `−pref` |
//! | any other | `0` |
//!
//! `pref = base + step × rank`, with `rank` the zero-based position of the
//! location in the doctor's preference list. A small non-negative jitter is
//! added to every evaluated cost to break ties between equal-cost paths.
//!
//! The penalty and load counters are live: each forward assignment push
//! raises both by one, each cancellation lowers both by one, so later
//! searches are costed against the current distribution of work.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{ArcKind, FlowNetwork};
use crate::config::SolverConfig;
use crate::models::CabinetKey;

/// Live fairness counters for one solve.
///
/// Owned by exactly one solve; never shared between concurrent solves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenaltyState {
    doctor: HashMap<String, f64>,
    load: HashMap<CabinetKey, f64>,
}

impl PenaltyState {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a doctor's starting penalty.
    pub fn seed_doctor(&mut self, doctor: impl Into<String>, penalty: f64) {
        self.doctor.insert(doctor.into(), penalty);
    }

    /// Builder form of [`PenaltyState::seed_doctor`].
    pub fn with_doctor(mut self, doctor: impl Into<String>, penalty: f64) -> Self {
        self.seed_doctor(doctor, penalty);
        self
    }

    /// Current penalty of a doctor (0 if never touched).
    pub fn doctor_penalty(&self, doctor: &str) -> f64 {
        self.doctor.get(doctor).copied().unwrap_or(0.0)
    }

    /// Current load of a cabinet (0 if never touched).
    pub fn cabinet_load(&self, key: &CabinetKey) -> f64 {
        self.load.get(key).copied().unwrap_or(0.0)
    }

    /// Adds `delta` to a doctor's penalty.
    pub fn bump_doctor(&mut self, doctor: &str, delta: f64) {
        match self.doctor.get_mut(doctor) {
            Some(v) => *v += delta,
            None => {
                self.doctor.insert(doctor.to_string(), delta);
            }
        }
    }

    /// Adds `delta` to a cabinet's load.
    pub fn bump_load(&mut self, key: &CabinetKey, delta: f64) {
        match self.load.get_mut(key) {
            Some(v) => *v += delta,
            None => {
                self.load.insert(key.clone(), delta);
            }
        }
    }

    /// All doctor penalties.
    pub fn doctor_penalties(&self) -> &HashMap<String, f64> {
        &self.doctor
    }
}

/// Evaluates arc costs under the live penalty state.
#[derive(Debug, Clone)]
pub struct CostModel {
    multiplier: f64,
    jitter_epsilon: f64,
    rng: SmallRng,
}

impl CostModel {
    /// Creates a cost model from configuration.
    ///
    /// `stream` separates jitter sequences of different solves that share a
    /// configured seed.
    pub fn new(config: &SolverConfig, stream: u64) -> Self {
        let rng = match config.random_seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(stream)),
            None => SmallRng::from_os_rng(),
        };
        Self {
            multiplier: config.penalty_multiplier,
            jitter_epsilon: config.jitter_epsilon,
            rng,
        }
    }

    /// Cost of traversing an arc, without jitter.
    pub fn arc_cost(&self, kind: &ArcKind, net: &FlowNetwork, state: &PenaltyState) -> f64 {
        match *kind {
            ArcKind::Plain => 0.0,
            ArcKind::Assign {
                doctor,
                cabinet,
                preference,
                forward: true,
                ..
            } => {
                let penalty = state.doctor_penalty(&net.doctors()[doctor]);
                let load = state.cabinet_load(&net.cabinets()[cabinet]);
                preference + (penalty + load) * self.multiplier
            }
            ArcKind::Assign {
                preference,
                forward: false,
                ..
            } => -preference,
        }
    }

    /// Draws a tie-break offset in `[0, epsilon)`.
    pub fn jitter(&mut self) -> f64 {
        if self.jitter_epsilon > 0.0 {
            self.rng.random_range(0.0..self.jitter_epsilon)
        } else {
            0.0
        }
    }

    /// Applies the counter update for one traversal of an assignment arc.
    ///
    /// Forward traversals raise the doctor's penalty and the cabinet's load by
    /// `amount`; cancellations lower them.
    pub fn record_traversal(kind: &ArcKind, amount: f64, net: &FlowNetwork, state: &mut PenaltyState) {
        if let ArcKind::Assign {
            doctor,
            cabinet,
            forward,
            ..
        } = *kind
        {
            let delta = if forward { amount } else { -amount };
            state.bump_doctor(&net.doctors()[doctor], delta);
            state.bump_load(&net.cabinets()[cabinet], delta);
        }
    }
}
