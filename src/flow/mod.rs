//! Min-cost max-flow engine.
//!
//! Builds the layered doctor/cabinet network for one week, forces mandatory
//! assignments into it, and saturates it with successive shortest paths under
//! a cost model whose fairness penalties move as flow is pushed.
//!
//! # Pipeline
//!
//! | Step | Type |
//! |------|------|
//! | Build | [`NetworkBuilder`] → [`FlowNetwork`] |
//! | Cost | [`CostModel`] over [`PenaltyState`] |
//! | Pre-seed | [`MandatorySeeder`] |
//! | Solve | [`FlowSolver`] → [`FlowOutcome`] |
//!
//! # Reference
//! Ahuja, Magnanti & Orlin (1993), "Network Flows: Theory, Algorithms, and Applications"

mod cost;
mod network;
mod seeder;
mod solver;

pub use cost::{CostModel, PenaltyState};
pub use network::{
    ArcId, ArcKind, DoctorDemand, FlowArc, FlowNetwork, FlowNode, NetworkBuilder, NodeId,
};
pub use seeder::{MandatorySeeder, SeedReport};
pub use solver::{FlowOutcome, FlowShortfall, FlowSolver};
