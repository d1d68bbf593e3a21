//! Error types for roster construction and solving.
//!
//! Only structural failures are errors. Shortfalls against demand are
//! reported as [`FlowShortfall`](crate::flow::FlowShortfall) values on the
//! solve outcome and never abort a solve.

use thiserror::Error;

use crate::models::CabinetSlot;
use crate::validation::ValidationError;

/// Main error type for rostering operations.
#[derive(Debug, Error)]
pub enum RosterError {
    /// A mandatory shift has no admissible path through the network.
    #[error("mandatory shift {shift} for doctor '{doctor}' is not admissible: {reason}")]
    InadmissibleMandatoryShift {
        doctor: String,
        shift: CabinetSlot,
        reason: String,
    },

    /// Pre-seeding would push more units through an edge than it carries.
    #[error("insufficient capacity to force shift {shift} for doctor '{doctor}' ({edge})")]
    InsufficientCapacity {
        doctor: String,
        shift: CabinetSlot,
        edge: &'static str,
    },

    /// Shortest-path search found a negative-cost cycle in the residual network.
    #[error("negative-cost cycle in residual network after {augmentations} augmentations")]
    NegativeCycle { augmentations: usize },

    /// A doctor id referenced by a request is not in the roster.
    #[error("unknown doctor: {0}")]
    UnknownDoctor(String),

    /// A (day, slot) pair outside the weekly grid.
    #[error("invalid shift slot ({day}, {slot})")]
    InvalidSlot { day: u8, slot: u8 },

    /// A week number outside the month.
    #[error("invalid week {week} (month has {weeks} weeks)")]
    InvalidWeek { week: u8, weeks: usize },

    /// Input failed pre-solve validation.
    #[error("roster validation failed with {} error(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),

    /// Malformed line in a text artifact.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for rostering operations.
pub type RosterResult<T> = std::result::Result<T, RosterError>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftSlot;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_error_messages() {
        let e = RosterError::InvalidSlot { day: 9, slot: 1 };
        assert_eq!(e.to_string(), "invalid shift slot (9, 1)");

        let shift = CabinetSlot::new("North", "101", ShiftSlot::new(3, 1).unwrap());
        let e = RosterError::InadmissibleMandatoryShift {
            doctor: "D1".into(),
            shift,
            reason: "slot is forbidden".into(),
        };
        assert!(e.to_string().contains("North/101 (3, 1)"));
        assert!(e.to_string().contains("D1"));
    }

    #[test]
    fn test_validation_summary() {
        let e = RosterError::Validation(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate doctor ID: D1"),
            ValidationError::new(ValidationErrorKind::QuotaInverted, "min above max"),
        ]);
        let msg = e.to_string();
        assert!(msg.contains("2 error(s)"));
        assert!(msg.contains("Duplicate doctor ID: D1"));
    }
}
