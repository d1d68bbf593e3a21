//! Input validation for rostering problems.
//!
//! Checks the roster against the catalog before any network is built.
//! Detects:
//! - Duplicate doctor IDs
//! - Inverted quotas (minimum above maximum)
//! - Slots and weeks outside the month grid
//! - Required shifts in unknown cabinets, in cabinets the doctor cannot
//!   work in, in forbidden slots, or above the week's maximum quota
//! - Required shifts that collide (same doctor twice in a slot, or two
//!   doctors in one cabinet slot)
//!
//! All problems are collected; validation does not stop at the first one.

use crate::models::{CabinetCatalog, CabinetSlot, DoctorProfile};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two doctors share the same ID.
    DuplicateId,
    /// Minimum monthly shifts above maximum.
    QuotaInverted,
    /// A (day, slot) outside the weekly grid.
    InvalidSlot,
    /// A week number outside the month.
    InvalidWeek,
    /// A required shift names a cabinet the catalog doesn't have.
    UnknownCabinet,
    /// A required shift the doctor cannot work (specialization, location, or forbidden slot).
    InadmissibleRequirement,
    /// More required shifts in a week than the week's maximum quota.
    RequirementOverQuota,
    /// Required shifts collide with each other.
    ConflictingRequirement,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Whether a doctor may be assigned to a cabinet at all.
///
/// True iff the location is in the doctor's preference list and the cabinet
/// accepts one of the doctor's specializations.
pub fn is_eligible(doctor: &DoctorProfile, catalog: &CabinetCatalog, location: &str, cabinet: &str) -> bool {
    doctor.preference_rank(location).is_some()
        && doctor
            .specializations
            .iter()
            .any(|s| catalog.accepts(location, cabinet, s))
}

/// Validates a roster against a catalog for a `weeks`-week month.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(doctors: &[DoctorProfile], catalog: &CabinetCatalog, weeks: usize) -> ValidationResult {
    let mut errors = Vec::new();
    let week_ok = |w: u8| w >= 1 && (w as usize) <= weeks;

    let mut ids = HashSet::new();
    for d in doctors {
        if !ids.insert(d.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate doctor ID: {}", d.id),
            ));
        }
    }

    // cell → doctor, per week
    let mut claimed: HashMap<(u8, &CabinetSlot), &str> = HashMap::new();
    let mut required_cells = Vec::new();

    for d in doctors {
        if let (Some(min), Some(max)) = (d.min_shifts, d.max_shifts) {
            if min > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::QuotaInverted,
                    format!("Doctor '{}' has minimum {} above maximum {}", d.id, min, max),
                ));
            }
        }

        for f in &d.forbidden {
            if !f.slot.is_valid() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSlot,
                    format!("Doctor '{}' forbids invalid slot {}", d.id, f.slot),
                ));
            }
            if !week_ok(f.week) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWeek,
                    format!("Doctor '{}' forbids a slot in invalid week {}", d.id, f.week),
                ));
            }
        }

        for r in &d.required {
            let cell = CabinetSlot::new(r.location.clone(), r.cabinet.clone(), r.slot);
            if !r.slot.is_valid() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSlot,
                    format!("Doctor '{}' requires invalid slot {}", d.id, r.slot),
                ));
                continue;
            }
            if !week_ok(r.week) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWeek,
                    format!("Doctor '{}' requires {} in invalid week {}", d.id, cell, r.week),
                ));
                continue;
            }
            if !catalog.has_cabinet(&r.location, &r.cabinet) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownCabinet,
                    format!("Doctor '{}' requires unknown cabinet {}/{}", d.id, r.location, r.cabinet),
                ));
                continue;
            }
            if !is_eligible(d, catalog, &r.location, &r.cabinet) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InadmissibleRequirement,
                    format!(
                        "Doctor '{}' requires {} but is not eligible for that cabinet",
                        d.id, cell
                    ),
                ));
            }
            if d.forbidden_in(r.week).contains(&r.slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InadmissibleRequirement,
                    format!(
                        "Doctor '{}' requires {} in week {} but the slot is forbidden",
                        d.id, cell, r.week
                    ),
                ));
            }
            required_cells.push((r.week, d.id.as_str(), r));
        }

        for week in 1..=weeks {
            let week = week as u8;
            let required = d.required_in(week);
            let max = d.max_quota(week, weeks) as usize;
            if required.len() > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::RequirementOverQuota,
                    format!(
                        "Doctor '{}' has {} required shifts in week {} but a maximum of {}",
                        d.id,
                        required.len(),
                        week,
                        max
                    ),
                ));
            }
            let mut slots = HashSet::new();
            for cell in &required {
                if !slots.insert(cell.slot) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::ConflictingRequirement,
                        format!(
                            "Doctor '{}' is required twice in slot {} of week {}",
                            d.id, cell.slot, week
                        ),
                    ));
                }
            }
        }
    }

    let cells: Vec<(u8, &str, CabinetSlot)> = required_cells
        .into_iter()
        .map(|(w, id, r)| (w, id, CabinetSlot::new(r.location.clone(), r.cabinet.clone(), r.slot)))
        .collect();
    for (week, id, cell) in &cells {
        match claimed.get(&(*week, cell)) {
            Some(other) if other != id => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ConflictingRequirement,
                    format!(
                        "Doctors '{}' and '{}' are both required in {} of week {}",
                        other, id, cell, week
                    ),
                ));
            }
            _ => {
                claimed.insert((*week, cell), id);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftSlot;

    fn slot(day: u8, s: u8) -> ShiftSlot {
        ShiftSlot::new(day, s).unwrap()
    }

    fn catalog() -> CabinetCatalog {
        CabinetCatalog::new()
            .with_cabinets("North", "therapy", ["101", "102"])
            .with_cabinets("South", "surgery", ["201"])
    }

    fn therapist(id: &str) -> DoctorProfile {
        DoctorProfile::new(id)
            .with_specialization("therapy")
            .with_preferred_location("North")
            .with_quota(4, 20)
    }

    fn has(errors: &[ValidationError], kind: ValidationErrorKind) -> bool {
        errors.iter().any(|e| e.kind == kind)
    }

    #[test]
    fn test_valid_roster() {
        let doctors = vec![
            therapist("D1").with_required(1, "North", "101", slot(1, 1)),
            therapist("D2").with_forbidden(2, slot(3, 1)),
        ];
        assert!(validate_roster(&doctors, &catalog(), 4).is_ok());
    }

    #[test]
    fn test_duplicate_doctor_id() {
        let doctors = vec![therapist("D1"), therapist("D1")];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_quota_inverted() {
        let doctors = vec![DoctorProfile::new("D1").with_quota(10, 5)];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::QuotaInverted));
    }

    #[test]
    fn test_invalid_week_and_slot() {
        let doctors = vec![therapist("D1")
            .with_forbidden(5, slot(1, 1))
            .with_required(1, "North", "101", ShiftSlot { day: 9, slot: 1 })];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::InvalidWeek));
        assert!(has(&errors, ValidationErrorKind::InvalidSlot));
    }

    #[test]
    fn test_unknown_cabinet() {
        let doctors = vec![therapist("D1").with_required(1, "North", "999", slot(1, 1))];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::UnknownCabinet));
    }

    #[test]
    fn test_inadmissible_requirement() {
        // surgery cabinet, therapist doctor
        let doctors = vec![therapist("D1")
            .with_preferred_location("South")
            .with_required(1, "South", "201", slot(1, 1))];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::InadmissibleRequirement));

        // required in a forbidden slot
        let doctors = vec![therapist("D1")
            .with_forbidden(1, slot(2, 2))
            .with_required(1, "North", "101", slot(2, 2))];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::InadmissibleRequirement));
    }

    #[test]
    fn test_requirement_over_quota() {
        let doctors = vec![DoctorProfile::new("D1")
            .with_specialization("therapy")
            .with_preferred_location("North")
            .with_quota(0, 4)
            .with_required(1, "North", "101", slot(1, 1))
            .with_required(1, "North", "101", slot(1, 2))];
        // 4 per month → 1 in week 1
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(has(&errors, ValidationErrorKind::RequirementOverQuota));
    }

    #[test]
    fn test_conflicting_requirements() {
        let doctors = vec![
            therapist("D1")
                .with_required(1, "North", "101", slot(1, 1))
                .with_required(1, "North", "102", slot(1, 1)),
            therapist("D2").with_required(1, "North", "101", slot(1, 1)),
        ];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        let conflicts = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::ConflictingRequirement)
            .count();
        assert_eq!(conflicts, 2);
    }

    #[test]
    fn test_is_eligible() {
        let cat = catalog();
        let d = therapist("D1");
        assert!(is_eligible(&d, &cat, "North", "101"));
        assert!(!is_eligible(&d, &cat, "South", "201"));
        let no_pref = DoctorProfile::new("D2").with_specialization("therapy");
        assert!(!is_eligible(&no_pref, &cat, "North", "101"));
    }

    #[test]
    fn test_multiple_errors() {
        let doctors = vec![
            DoctorProfile::new("D1").with_quota(9, 1),
            DoctorProfile::new("D1"),
        ];
        let errors = validate_roster(&doctors, &catalog(), 4).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
