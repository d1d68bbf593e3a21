//! Week, month, and revision orchestration plus KPI evaluation.
//!
//! Wires the [`flow`](crate::flow) engine into complete scheduling runs.
//!
//! # Schedulers
//!
//! | Type | Produces |
//! |------|----------|
//! | [`WeeklyScheduler`] | One week: minimum pass, then maximum pass |
//! | [`MonthlyScheduler`] | All weeks in order with carried fairness baselines |
//! | [`RevisionEngine`] | A published week with some shifts vacated and refilled |
//!
//! # KPI
//!
//! [`RosterKpi`] computes coverage and fairness metrics: fill rate, cabinet
//! utilization, load spread, first-choice rate, and doctors below minimum.

mod kpi;
mod monthly;
mod revision;
mod weekly;

pub use kpi::RosterKpi;
pub use monthly::{FairnessBaseline, MonthOutcome, MonthlyScheduler};
pub use revision::{RevisionEngine, RevisionOutcome, RevisionRequest};
pub use weekly::{DemandMode, PassOutcome, WeekOutcome, WeeklyScheduler};
