//! Doctor rostering on a min-cost max-flow engine.
//!
//! Assigns doctors to cabinet shifts across a multi-week month, subject to
//! specialization compatibility, weekly quotas, forbidden and required
//! shifts, and location preferences, while spreading load fairly between
//! doctors and cabinets.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ShiftSlot`, `DoctorProfile`, `CabinetCatalog`,
//!   `CabinetSlot`, `Schedule`
//! - **`flow`**: Network builder, cost/penalty model, mandatory pre-seeding,
//!   successive-shortest-path solver
//! - **`scheduler`**: Weekly two-pass scheduling, monthly orchestration,
//!   incremental revision, KPIs
//! - **`validation`**: Roster integrity checks (duplicate IDs, quotas, required shifts)
//! - **`io`**: Catalog JSON, roster CSV, schedule text, CSV export, revision requests
//! - **`config`**: Solver tunables, loadable from TOML
//! - **`error`**: Crate error type
//! - **`logging`**: `tracing` subscriber setup
//!
//! # Example
//!
//! ```
//! use u_roster::config::SolverConfig;
//! use u_roster::models::{CabinetCatalog, DoctorProfile};
//! use u_roster::scheduler::MonthlyScheduler;
//!
//! let catalog = CabinetCatalog::new().with_cabinets("North", "therapy", ["101", "102"]);
//! let doctors = vec![
//!     DoctorProfile::new("A")
//!         .with_specialization("therapy")
//!         .with_preferred_location("North")
//!         .with_quota(8, 16),
//!     DoctorProfile::new("B")
//!         .with_specialization("therapy")
//!         .with_preferred_location("North")
//!         .with_quota(4, 12),
//! ];
//!
//! let month = MonthlyScheduler::new(&catalog, &doctors, &SolverConfig::default())
//!     .run()
//!     .unwrap();
//! assert_eq!(month.totals()["A"], 16);
//! assert_eq!(month.totals()["B"], 12);
//! ```
//!
//! # References
//!
//! - Ahuja, Magnanti & Orlin (1993), "Network Flows: Theory, Algorithms, and Applications"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

pub mod config;
pub mod error;
pub mod flow;
pub mod io;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{RosterError, RosterResult};
