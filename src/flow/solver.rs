//! Successive-shortest-path min-cost max-flow.
//!
//! # Algorithm
//!
//! 1. Evaluate every arc with residual capacity under the current penalty
//!    state (plus jitter, sampled once per arc per search).
//! 2. Bellman–Ford from Source for at most `|V| − 1` rounds, stopping early
//!    once a round relaxes nothing. Dijkstra is not usable: cancelling arcs
//!    carry negative cost.
//! 3. One extra round detects negative cycles reachable from Source. Under
//!    [`NegativeCyclePolicy::Warn`] the cycle is traced through the parent
//!    arcs and cancelled, then the search restarts.
//! 4. If Sink is unreachable, stop. Otherwise walk parent arcs back from
//!    Sink, push the bottleneck along the path, update penalty counters and
//!    the schedule, and repeat.
//!
//! Costs change after every push, so each search sees the distribution of
//! work left by the previous one.
//!
//! # Complexity
//! O(F · V · E) where F is the total flow.
//!
//! # Reference
//! Ahuja, Magnanti & Orlin (1993), "Network Flows", Ch. 9.7 (Successive Shortest Paths)

use tracing::{debug, trace, warn};

use super::{ArcId, ArcKind, CostModel, FlowNetwork, NodeId, PenaltyState, SeedReport};
use crate::config::{NegativeCyclePolicy, SolverConfig};
use crate::error::{RosterError, RosterResult};
use crate::models::Schedule;

/// Minimum distance decrease that counts as a relaxation.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Result of a solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowOutcome {
    /// Total units delivered, forced units included.
    pub flow: u64,
    /// Accumulated cost of all pushed paths and cancelled cycles (forced units carry no cost).
    pub cost: f64,
    /// Number of augmenting paths pushed.
    pub augmentations: usize,
    /// Whether a negative cycle was seen and tolerated.
    pub negative_cycle_seen: bool,
    /// Negative cycles cancelled under [`NegativeCyclePolicy::Warn`].
    pub cancelled_cycles: usize,
}

/// Delivered flow fell short of what the caller expected.
///
/// A soft condition: the partial schedule is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowShortfall {
    /// Units the caller asked for.
    pub expected: u64,
    /// Units actually delivered.
    pub delivered: u64,
}

impl FlowShortfall {
    /// Compares delivered flow against expectation.
    ///
    /// Returns `None` when nothing is missing.
    pub fn check(expected: u64, delivered: u64) -> Option<Self> {
        (delivered < expected).then_some(Self { expected, delivered })
    }

    /// Units missing.
    pub fn missing(&self) -> u64 {
        self.expected - self.delivered
    }
}

/// Successive-shortest-path solver over a [`FlowNetwork`].
#[derive(Debug, Clone)]
pub struct FlowSolver {
    cost: CostModel,
    policy: NegativeCyclePolicy,
}

/// What one Bellman–Ford search found.
enum Search {
    /// Source→Sink path, in traversal order.
    Path(Vec<ArcId>),
    /// Negative cycle reachable from Source.
    Cycle(Vec<ArcId>),
}

impl FlowSolver {
    /// Creates a solver; `stream` selects the jitter sequence.
    pub fn new(config: &SolverConfig, stream: u64) -> Self {
        Self {
            cost: CostModel::new(config, stream),
            policy: config.negative_cycle_policy,
        }
    }

    /// Augments until Sink is unreachable.
    ///
    /// `seeded` is what [`MandatorySeeder`](super::MandatorySeeder) already
    /// forced; its units count towards the returned flow.
    ///
    /// Under [`NegativeCyclePolicy::Warn`] a detected cycle is cancelled by
    /// pushing its bottleneck around it, and the search is repeated. Once the
    /// number of cancellations exceeds the edge count, augmentation stops and
    /// the partial result is returned.
    pub fn run(
        &mut self,
        net: &mut FlowNetwork,
        state: &mut PenaltyState,
        schedule: &mut Schedule,
        seeded: SeedReport,
    ) -> RosterResult<FlowOutcome> {
        let mut outcome = FlowOutcome {
            flow: seeded.units,
            ..FlowOutcome::default()
        };
        let cancel_limit = net.edge_count().max(1);

        while let Some(search) = self.search(net, state, outcome.augmentations)? {
            match search {
                Search::Cycle(arcs) => {
                    outcome.negative_cycle_seen = true;
                    if outcome.cancelled_cycles >= cancel_limit {
                        warn!(
                            cancelled = outcome.cancelled_cycles,
                            "negative cycles keep reappearing, stopping augmentation"
                        );
                        break;
                    }
                    let (_, cost) = self.push_along(&arcs, net, state, schedule);
                    outcome.cost += cost;
                    outcome.cancelled_cycles += 1;
                    debug!(length = arcs.len(), cost, "cancelled negative cycle");
                }
                Search::Path(arcs) => {
                    let (amount, cost) = self.push_along(&arcs, net, state, schedule);
                    if amount <= 0 {
                        break;
                    }
                    outcome.flow += amount as u64;
                    outcome.cost += cost;
                    outcome.augmentations += 1;
                    trace!(length = arcs.len(), cost, "augmented");
                }
            }
        }

        debug!(
            flow = outcome.flow,
            cost = outcome.cost,
            augmentations = outcome.augmentations,
            cancelled_cycles = outcome.cancelled_cycles,
            "max flow reached"
        );
        Ok(outcome)
    }

    /// Pushes the bottleneck along `arcs`, returning the amount and its cost.
    fn push_along(
        &self,
        arcs: &[ArcId],
        net: &mut FlowNetwork,
        state: &mut PenaltyState,
        schedule: &mut Schedule,
    ) -> (i64, f64) {
        let amount = arcs.iter().map(|&a| net.arc(a).residual).min().unwrap_or(0);
        if amount <= 0 {
            return (0, 0.0);
        }

        let mut cost = 0.0;
        for &arc in arcs {
            let kind = net.arc(arc).kind;
            cost += self.cost.arc_cost(&kind, net, state) * amount as f64;
            net.push(arc, amount);
            Self::apply_to_schedule(&kind, net, schedule);
            CostModel::record_traversal(&kind, amount as f64, net, state);
        }
        (amount, cost)
    }

    fn apply_to_schedule(kind: &ArcKind, net: &FlowNetwork, schedule: &mut Schedule) {
        let ArcKind::Assign {
            doctor,
            cell,
            forward,
            ..
        } = *kind
        else {
            return;
        };
        let Some(cell) = net.cell(cell) else {
            return;
        };
        let doctor = &net.doctors()[doctor];
        if forward {
            schedule.assign(cell.clone(), doctor.clone());
        } else {
            // the same push may already have placed a new doctor here
            schedule.clear_if(cell, doctor);
        }
    }

    fn search(
        &mut self,
        net: &FlowNetwork,
        state: &PenaltyState,
        augmentations: usize,
    ) -> RosterResult<Option<Search>> {
        let n = net.node_count();
        let costs: Vec<f64> = net
            .arcs()
            .iter()
            .map(|arc| {
                if arc.residual > 0 {
                    self.cost.arc_cost(&arc.kind, net, state) + self.cost.jitter()
                } else {
                    0.0
                }
            })
            .collect();

        let mut dist = vec![f64::INFINITY; n];
        let mut parent: Vec<Option<ArcId>> = vec![None; n];
        dist[net.source()] = 0.0;

        for _ in 1..n {
            if Self::relax(net, &costs, &mut dist, &mut parent).is_none() {
                break;
            }
        }

        if let Some(updated) = Self::relax(net, &costs, &mut dist, &mut parent) {
            match self.policy {
                NegativeCyclePolicy::Fail => {
                    return Err(RosterError::NegativeCycle { augmentations });
                }
                NegativeCyclePolicy::Warn => {
                    warn!(augmentations, "negative cycle in residual network, cancelling");
                    let cycle = Self::trace_cycle(net, &parent, updated)
                        .ok_or(RosterError::NegativeCycle { augmentations })?;
                    return Ok(Some(Search::Cycle(cycle)));
                }
            }
        }

        if !dist[net.sink()].is_finite() {
            return Ok(None);
        }

        let mut arcs = Vec::new();
        let mut node = net.sink();
        while node != net.source() {
            let Some(arc) = parent[node] else {
                return Err(RosterError::NegativeCycle { augmentations });
            };
            if arcs.len() >= n {
                return Err(RosterError::NegativeCycle { augmentations });
            }
            arcs.push(arc);
            node = Self::tail(net, arc);
        }
        arcs.reverse();
        Ok(Some(Search::Path(arcs)))
    }

    /// Walks parent arcs back from a node relaxed in the extra round until a
    /// node repeats, and returns that cycle in traversal order.
    fn trace_cycle(net: &FlowNetwork, parent: &[Option<ArcId>], updated: NodeId) -> Option<Vec<ArcId>> {
        let n = net.node_count();
        let mut node = updated;
        for _ in 0..n {
            node = Self::tail(net, parent[node]?);
        }

        let start = node;
        let mut arcs = Vec::new();
        loop {
            let arc = parent[node]?;
            arcs.push(arc);
            node = Self::tail(net, arc);
            if node == start {
                break;
            }
            if arcs.len() > n {
                return None;
            }
        }
        arcs.reverse();
        Some(arcs)
    }

    #[inline]
    fn tail(net: &FlowNetwork, arc: ArcId) -> NodeId {
        net.arc(net.arc(arc).twin).to
    }

    /// One Bellman–Ford round. Returns the last node whose distance improved.
    fn relax(
        net: &FlowNetwork,
        costs: &[f64],
        dist: &mut [f64],
        parent: &mut [Option<ArcId>],
    ) -> Option<NodeId> {
        let mut updated = None;
        for u in 0..net.node_count() {
            let du = dist[u];
            if !du.is_finite() {
                continue;
            }
            for &a in net.arcs_from(u) {
                let arc = net.arc(a);
                if arc.residual <= 0 {
                    continue;
                }
                let candidate = du + costs[a];
                if candidate < dist[arc.to] - IMPROVEMENT_EPS {
                    dist[arc.to] = candidate;
                    parent[arc.to] = Some(a);
                    updated = Some(arc.to);
                }
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{DoctorDemand, FlowNode, MandatorySeeder, NetworkBuilder};
    use crate::models::{CabinetCatalog, CabinetSlot, DoctorProfile, ShiftSlot};
    use std::collections::{BTreeMap, BTreeSet};

    fn slot(day: u8, s: u8) -> ShiftSlot {
        ShiftSlot::new(day, s).unwrap()
    }

    fn therapist(id: &str) -> DoctorProfile {
        DoctorProfile::new(id)
            .with_specialization("therapy")
            .with_preferred_location("North")
    }

    fn solve(
        catalog: &CabinetCatalog,
        demands: Vec<DoctorDemand<'_>>,
        config: &SolverConfig,
    ) -> (Schedule, FlowOutcome) {
        let mut net = NetworkBuilder::new(catalog, config).with_demands(demands).build();
        let mut state = PenaltyState::new();
        let mut schedule = Schedule::for_catalog(catalog);
        let outcome = FlowSolver::new(config, 0)
            .run(&mut net, &mut state, &mut schedule, SeedReport::default())
            .unwrap();
        (schedule, outcome)
    }

    #[test]
    fn test_fills_up_to_quota() {
        let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
        let d = therapist("D1");
        let config = SolverConfig::deterministic();
        let (schedule, outcome) = solve(&catalog, vec![DoctorDemand::new(&d, 2)], &config);

        assert_eq!(outcome.flow, 2);
        assert_eq!(outcome.augmentations, 2);
        assert_eq!(schedule.count_for("D1"), 2);
        assert!(!outcome.negative_cycle_seen);
        assert_eq!(outcome.cancelled_cycles, 0);
        // first push: 1 + 0; second push: 1 + (1 + 1) × 1.5
        assert!((outcome.cost - (1.0 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_one_doctor_per_cell() {
        let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
        let a = therapist("A");
        let b = therapist("B");
        let config = SolverConfig::deterministic();
        let demands = vec![DoctorDemand::new(&a, 14), DoctorDemand::new(&b, 14)];
        let (schedule, outcome) = solve(&catalog, demands, &config);

        assert_eq!(outcome.flow, 14);
        assert_eq!(schedule.filled_count(), 14);
        // fairness spreads the 14 cells across both doctors
        assert_eq!(schedule.count_for("A"), 7);
        assert_eq!(schedule.count_for("B"), 7);
    }

    #[test]
    fn test_flow_bounded_by_capacity() {
        let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101", "102"]);
        let d = therapist("D1");
        let config = SolverConfig::deterministic();
        let (schedule, outcome) = solve(&catalog, vec![DoctorDemand::new(&d, 40)], &config);

        // one doctor can only cover each slot once
        assert_eq!(outcome.flow, 14);
        let by_slot: BTreeSet<ShiftSlot> = schedule.shifts_of("D1").iter().map(|c| c.slot).collect();
        assert_eq!(by_slot.len(), 14);
    }

    #[test]
    fn test_seeded_units_survive() {
        let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101"]);
        let a = therapist("A");
        let b = therapist("B");
        let config = SolverConfig::deterministic();
        let mut net = NetworkBuilder::new(&catalog, &config)
            .with_demands(vec![DoctorDemand::new(&a, 1), DoctorDemand::new(&b, 14)])
            .build();
        let mut state = PenaltyState::new().with_doctor("A", 100.0);
        let mut schedule = Schedule::for_catalog(&catalog);
        let forced = CabinetSlot::new("North", "101", slot(4, 2));
        let mandatory = BTreeMap::from([("A".to_string(), BTreeSet::from([forced.clone()]))]);

        let seeded = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &mandatory).unwrap();
        let outcome = FlowSolver::new(&config, 0)
            .run(&mut net, &mut state, &mut schedule, seeded)
            .unwrap();

        assert_eq!(schedule.get(&forced), Some("A"));
        assert_eq!(outcome.flow, 14);
        assert_eq!(schedule.count_for("B"), 13);
    }

    #[test]
    fn test_deterministic_without_jitter() {
        let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101", "102", "103"]);
        let a = therapist("A");
        let b = therapist("B");
        let config = SolverConfig::deterministic();

        let run = || solve(&catalog, vec![DoctorDemand::new(&a, 9), DoctorDemand::new(&b, 9)], &config);
        let (s1, o1) = run();
        let (s2, o2) = run();
        assert_eq!(s1, s2);
        assert_eq!(o1, o2);
    }

    #[test]
    fn test_empty_network() {
        let catalog = CabinetCatalog::new();
        let config = SolverConfig::deterministic();
        let (schedule, outcome) = solve(&catalog, Vec::new(), &config);
        assert_eq!(outcome.flow, 0);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_shortfall() {
        assert_eq!(FlowShortfall::check(5, 5), None);
        assert_eq!(FlowShortfall::check(5, 6), None);
        let s = FlowShortfall::check(5, 3).unwrap();
        assert_eq!(s.missing(), 2);
    }

    /// Pushes one unit Source→doctor→cell→Sink outside the solver.
    fn push_assignment(net: &mut FlowNetwork, schedule: &mut Schedule, doctor: &str, cell: &CabinetSlot) {
        let doctor_node = net.find(&FlowNode::Doctor(doctor.into())).unwrap();
        let shift = net.find(&FlowNode::DoctorShift(doctor.into(), cell.slot)).unwrap();
        let target = net.find(&FlowNode::CabinetShift(cell.clone())).unwrap();
        let hops = [
            (net.source(), doctor_node),
            (doctor_node, shift),
            (shift, target),
            (target, net.sink()),
        ];
        for (from, to) in hops {
            let arc = net.find_edge(from, to).unwrap();
            net.push(arc, 1);
        }
        schedule.assign(cell.clone(), doctor);
    }

    /// A prefers North, B prefers South, but each sits at the other's
    /// first choice: swapping them is a negative cycle.
    fn crossed(config: &SolverConfig) -> (FlowNetwork, Schedule) {
        let catalog = CabinetCatalog::new()
            .with_cabinets("North", "therapy", ["101"])
            .with_cabinets("South", "therapy", ["201"]);
        let a = DoctorProfile::new("A")
            .with_specialization("therapy")
            .with_preferred_location("North")
            .with_preferred_location("South");
        let b = DoctorProfile::new("B")
            .with_specialization("therapy")
            .with_preferred_location("South")
            .with_preferred_location("North");
        let mut net = NetworkBuilder::new(&catalog, config)
            .with_demands(vec![DoctorDemand::new(&a, 2), DoctorDemand::new(&b, 2)])
            .build();
        let mut schedule = Schedule::for_catalog(&catalog);
        push_assignment(&mut net, &mut schedule, "A", &CabinetSlot::new("South", "201", slot(1, 2)));
        push_assignment(&mut net, &mut schedule, "B", &CabinetSlot::new("North", "101", slot(1, 1)));
        (net, schedule)
    }

    #[test]
    fn test_negative_cycle_fails_by_default() {
        let config = SolverConfig::deterministic().with_penalty_multiplier(0.0);
        let (mut net, mut schedule) = crossed(&config);
        let mut state = PenaltyState::new();

        let result = FlowSolver::new(&config, 0).run(&mut net, &mut state, &mut schedule, SeedReport::default());
        assert!(matches!(result, Err(RosterError::NegativeCycle { augmentations: 0 })));
    }

    #[test]
    fn test_negative_cycle_cancelled_under_warn() {
        let config = SolverConfig::deterministic()
            .with_penalty_multiplier(0.0)
            .with_negative_cycle_policy(NegativeCyclePolicy::Warn);
        let (mut net, mut schedule) = crossed(&config);
        let mut state = PenaltyState::new();

        let outcome = FlowSolver::new(&config, 0)
            .run(&mut net, &mut state, &mut schedule, SeedReport::default())
            .unwrap();

        assert!(outcome.negative_cycle_seen);
        assert!(outcome.cancelled_cycles >= 1);
        // the two crossed units were pushed before the run
        assert_eq!(outcome.flow, 2);
        assert_eq!(outcome.augmentations, 2);
        assert_eq!(schedule.filled_count(), 4);
        for (doctor, home) in [("A", "North"), ("B", "South")] {
            let shifts = schedule.shifts_of(doctor);
            assert_eq!(shifts.len(), 2);
            assert!(shifts.iter().all(|c| c.location == home));
        }
    }
}
