//! Mandatory pre-seeding.
//!
//! Forces known (doctor, cabinet, slot) assignments into the residual network
//! before any path search runs. Each forced unit consumes capacity along
//! Source→Doctor→DoctorShift→CabinetShift→Sink without crediting the reverse
//! arcs, so the solver can never cancel it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{ArcId, FlowNetwork, FlowNode, PenaltyState};
use crate::error::{RosterError, RosterResult};
use crate::models::{CabinetSlot, Schedule};

/// Result of a seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Units forced into the network.
    pub units: u64,
    /// Doctors with at least one forced unit.
    pub doctors: usize,
}

/// Forces mandatory assignments into a network.
#[derive(Debug, Default, Clone, Copy)]
pub struct MandatorySeeder;

impl MandatorySeeder {
    /// Seeds every mandatory triple.
    ///
    /// For each triple the four arcs on its path lose one unit of residual,
    /// the cabinet load rises by one, and the cell is written to `schedule`.
    /// Afterwards each doctor's penalty rises by their number of forced units.
    ///
    /// # Errors
    /// - [`RosterError::InadmissibleMandatoryShift`] if any node or edge on
    ///   the path was filtered out at build time.
    /// - [`RosterError::InsufficientCapacity`] if an arc on the path is
    ///   already exhausted.
    ///
    /// Both are checked before the triple mutates anything.
    pub fn seed(
        net: &mut FlowNetwork,
        state: &mut PenaltyState,
        schedule: &mut Schedule,
        mandatory: &BTreeMap<String, BTreeSet<CabinetSlot>>,
    ) -> RosterResult<SeedReport> {
        let mut report = SeedReport::default();

        for (doctor, shifts) in mandatory {
            if shifts.is_empty() {
                continue;
            }
            for shift in shifts {
                let path = Self::locate(net, doctor, shift)?;
                for (arc, edge) in path.iter().zip(EDGE_NAMES) {
                    if net.arc(*arc).residual < 1 {
                        return Err(RosterError::InsufficientCapacity {
                            doctor: doctor.clone(),
                            shift: shift.clone(),
                            edge,
                        });
                    }
                }
                for arc in path {
                    net.consume(arc, 1);
                }
                state.bump_load(&shift.key(), 1.0);
                schedule.assign(shift.clone(), doctor.clone());
            }
            state.bump_doctor(doctor, shifts.len() as f64);
            report.units += shifts.len() as u64;
            report.doctors += 1;
            debug!(doctor = %doctor, count = shifts.len(), "seeded mandatory shifts");
        }

        Ok(report)
    }

    fn locate(net: &FlowNetwork, doctor: &str, shift: &CabinetSlot) -> RosterResult<[ArcId; 4]> {
        let inadmissible = |reason: &str| RosterError::InadmissibleMandatoryShift {
            doctor: doctor.to_string(),
            shift: shift.clone(),
            reason: reason.to_string(),
        };

        let doctor_node = net
            .find(&FlowNode::Doctor(doctor.to_string()))
            .ok_or_else(|| inadmissible("doctor is not in the network"))?;
        let shift_node = net
            .find(&FlowNode::DoctorShift(doctor.to_string(), shift.slot))
            .ok_or_else(|| inadmissible("slot is blocked for the doctor"))?;
        let cell_node = net
            .find(&FlowNode::CabinetShift(shift.clone()))
            .ok_or_else(|| inadmissible("cabinet slot is not in the network"))?;

        let missing = || inadmissible("doctor is not eligible for the cabinet");
        Ok([
            net.find_edge(net.source(), doctor_node).ok_or_else(missing)?,
            net.find_edge(doctor_node, shift_node).ok_or_else(missing)?,
            net.find_edge(shift_node, cell_node).ok_or_else(missing)?,
            net.find_edge(cell_node, net.sink()).ok_or_else(missing)?,
        ])
    }
}

const EDGE_NAMES: [&str; 4] = [
    "source to doctor",
    "doctor to doctor shift",
    "doctor shift to cabinet shift",
    "cabinet shift to sink",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::flow::{DoctorDemand, NetworkBuilder};
    use crate::models::{CabinetCatalog, CabinetKey, DoctorProfile, ShiftSlot};

    fn slot(day: u8, s: u8) -> ShiftSlot {
        ShiftSlot::new(day, s).unwrap()
    }

    fn catalog() -> CabinetCatalog {
        CabinetCatalog::new()
            .with_cabinets("North", "therapy", ["101"])
            .with_cabinets("North", "surgery", ["102"])
    }

    fn doctor() -> DoctorProfile {
        DoctorProfile::new("D1")
            .with_specialization("therapy")
            .with_preferred_location("North")
    }

    fn mandatory(cells: &[CabinetSlot]) -> BTreeMap<String, BTreeSet<CabinetSlot>> {
        BTreeMap::from([("D1".to_string(), cells.iter().cloned().collect())])
    }

    #[test]
    fn test_seed_consumes_capacity_and_records() {
        let config = SolverConfig::default();
        let cat = catalog();
        let d = doctor();
        let mut net = NetworkBuilder::new(&cat, &config)
            .with_demand(DoctorDemand::new(&d, 3))
            .build();
        let mut state = PenaltyState::new().with_doctor("D1", 0.5);
        let mut schedule = Schedule::for_catalog(&cat);

        let a = CabinetSlot::new("North", "101", slot(1, 1));
        let b = CabinetSlot::new("North", "101", slot(2, 1));
        let report = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &mandatory(&[a.clone(), b.clone()])).unwrap();

        assert_eq!(report.units, 2);
        assert_eq!(report.doctors, 1);
        assert_eq!(schedule.get(&a), Some("D1"));
        assert_eq!(schedule.get(&b), Some("D1"));
        assert!((state.doctor_penalty("D1") - 2.5).abs() < 1e-10);
        assert!((state.cabinet_load(&CabinetKey::new("North", "101")) - 2.0).abs() < 1e-10);

        let doctor_node = net.find(&FlowNode::Doctor("D1".into())).unwrap();
        let source_arc = net.find_edge(net.source(), doctor_node).unwrap();
        assert_eq!(net.arc(source_arc).residual, 1);
        // forced flow is not cancellable
        assert_eq!(net.arc(net.arc(source_arc).twin).residual, 0);
    }

    #[test]
    fn test_ineligible_cabinet_fails() {
        let config = SolverConfig::default();
        let cat = catalog();
        let d = doctor();
        let mut net = NetworkBuilder::new(&cat, &config)
            .with_demand(DoctorDemand::new(&d, 3))
            .build();
        let mut state = PenaltyState::new();
        let mut schedule = Schedule::for_catalog(&cat);

        let bad = CabinetSlot::new("North", "102", slot(1, 1));
        let err = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &mandatory(&[bad.clone()])).unwrap_err();
        assert!(matches!(err, RosterError::InadmissibleMandatoryShift { .. }));
        assert_eq!(schedule.get(&bad), None);
    }

    #[test]
    fn test_forbidden_slot_fails() {
        let config = SolverConfig::default();
        let cat = catalog();
        let d = doctor();
        let mut net = NetworkBuilder::new(&cat, &config)
            .with_demand(DoctorDemand::new(&d, 3).with_blocked(BTreeSet::from([slot(3, 1)])))
            .build();
        let mut state = PenaltyState::new();
        let mut schedule = Schedule::for_catalog(&cat);

        let cell = CabinetSlot::new("North", "101", slot(3, 1));
        let err = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &mandatory(&[cell])).unwrap_err();
        match err {
            RosterError::InadmissibleMandatoryShift { reason, .. } => assert!(reason.contains("blocked")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_quota_exhausted_fails() {
        let config = SolverConfig::default();
        let cat = catalog();
        let d = doctor();
        let mut net = NetworkBuilder::new(&cat, &config)
            .with_demand(DoctorDemand::new(&d, 1))
            .build();
        let mut state = PenaltyState::new();
        let mut schedule = Schedule::for_catalog(&cat);

        let cells = [
            CabinetSlot::new("North", "101", slot(1, 1)),
            CabinetSlot::new("North", "101", slot(1, 2)),
        ];
        let err = MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &mandatory(&cells)).unwrap_err();
        match err {
            RosterError::InsufficientCapacity { edge, .. } => assert_eq!(edge, "source to doctor"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_doctor_fails() {
        let config = SolverConfig::default();
        let cat = catalog();
        let mut net = NetworkBuilder::new(&cat, &config).build();
        let mut state = PenaltyState::new();
        let mut schedule = Schedule::for_catalog(&cat);

        let cells = [CabinetSlot::new("North", "101", slot(1, 1))];
        assert!(MandatorySeeder::seed(&mut net, &mut state, &mut schedule, &mandatory(&cells)).is_err());
    }
}
