//! Cabinet catalog.
//!
//! Static lookup of the rooms a clinic network offers: each location hosts
//! cabinets, and each cabinet is usable by one or more specializations.
//! The catalog is read-only for the duration of a solve.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::ShiftSlot;

/// Identity of a room: a cabinet at a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CabinetKey {
    /// Location name.
    pub location: String,
    /// Cabinet identifier, unique within its location.
    pub cabinet: String,
}

/// A cabinet during one shift slot; the unit a doctor is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CabinetSlot {
    /// Location name.
    pub location: String,
    /// Cabinet identifier.
    pub cabinet: String,
    /// Shift slot.
    pub slot: ShiftSlot,
}

impl CabinetKey {
    /// Creates a cabinet key.
    pub fn new(location: impl Into<String>, cabinet: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cabinet: cabinet.into(),
        }
    }

    /// This cabinet during `slot`.
    pub fn at(&self, slot: ShiftSlot) -> CabinetSlot {
        CabinetSlot {
            location: self.location.clone(),
            cabinet: self.cabinet.clone(),
            slot,
        }
    }
}

impl CabinetSlot {
    /// Creates a cabinet slot.
    pub fn new(location: impl Into<String>, cabinet: impl Into<String>, slot: ShiftSlot) -> Self {
        Self {
            location: location.into(),
            cabinet: cabinet.into(),
            slot,
        }
    }

    /// The room this slot belongs to.
    pub fn key(&self) -> CabinetKey {
        CabinetKey::new(self.location.clone(), self.cabinet.clone())
    }
}

impl fmt::Display for CabinetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.location, self.cabinet, self.slot)
    }
}

/// Mapping location → specialization → cabinets.
///
/// Backed by ordered maps so every traversal (and therefore network
/// construction) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CabinetCatalog {
    locations: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl CabinetCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers cabinets for a specialization at a location.
    ///
    /// Cabinets already registered for the pair are kept.
    pub fn insert<I, S>(&mut self, location: impl Into<String>, specialization: impl Into<String>, cabinets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations
            .entry(location.into())
            .or_default()
            .entry(specialization.into())
            .or_default()
            .extend(cabinets.into_iter().map(Into::into));
    }

    /// Builder form of [`CabinetCatalog::insert`].
    pub fn with_cabinets<I, S>(
        mut self,
        location: impl Into<String>,
        specialization: impl Into<String>,
        cabinets: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(location, specialization, cabinets);
        self
    }

    /// Location names in order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// Whether the catalog knows a location.
    pub fn has_location(&self, location: &str) -> bool {
        self.locations.contains_key(location)
    }

    /// Specializations served at `location`, each with its cabinets.
    pub fn specializations(&self, location: &str) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.locations
            .get(location)
            .into_iter()
            .flat_map(|specs| specs.iter().map(|(s, cabs)| (s.as_str(), cabs)))
    }

    /// Cabinets at `location` usable by `specialization`.
    pub fn cabinets_for(&self, location: &str, specialization: &str) -> impl Iterator<Item = &str> {
        self.locations
            .get(location)
            .and_then(|specs| specs.get(specialization))
            .into_iter()
            .flat_map(|cabs| cabs.iter().map(String::as_str))
    }

    /// Every distinct (location, cabinet) pair, in order.
    ///
    /// A cabinet listed under several specializations appears once.
    pub fn cabinets(&self) -> Vec<CabinetKey> {
        let mut keys = BTreeSet::new();
        for (location, specs) in &self.locations {
            for cabinets in specs.values() {
                for cabinet in cabinets {
                    keys.insert(CabinetKey::new(location.clone(), cabinet.clone()));
                }
            }
        }
        keys.into_iter().collect()
    }

    /// Whether a cabinet exists at a location under any specialization.
    pub fn has_cabinet(&self, location: &str, cabinet: &str) -> bool {
        self.locations
            .get(location)
            .is_some_and(|specs| specs.values().any(|cabs| cabs.contains(cabinet)))
    }

    /// Whether `cabinet` at `location` accepts `specialization`.
    pub fn accepts(&self, location: &str, cabinet: &str, specialization: &str) -> bool {
        self.locations
            .get(location)
            .and_then(|specs| specs.get(specialization))
            .is_some_and(|cabs| cabs.contains(cabinet))
    }

    /// Number of distinct cabinets.
    pub fn cabinet_count(&self) -> usize {
        self.cabinets().len()
    }

    /// Whether the catalog has no cabinets.
    pub fn is_empty(&self) -> bool {
        self.cabinet_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CabinetCatalog {
        CabinetCatalog::new()
            .with_cabinets("North", "cardiology", ["101", "102"])
            .with_cabinets("North", "therapy", ["102", "103"])
            .with_cabinets("South", "therapy", ["1"])
    }

    #[test]
    fn test_cabinets_deduplicated() {
        let c = sample();
        let keys = c.cabinets();
        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0], CabinetKey::new("North", "101"));
        assert_eq!(keys[3], CabinetKey::new("South", "1"));
    }

    #[test]
    fn test_cabinets_for_specialization() {
        let c = sample();
        let cabs: Vec<&str> = c.cabinets_for("North", "therapy").collect();
        assert_eq!(cabs, vec!["102", "103"]);
        assert_eq!(c.cabinets_for("South", "cardiology").count(), 0);
        assert_eq!(c.cabinets_for("West", "therapy").count(), 0);
    }

    #[test]
    fn test_accepts_and_has_cabinet() {
        let c = sample();
        assert!(c.accepts("North", "102", "cardiology"));
        assert!(c.accepts("North", "102", "therapy"));
        assert!(!c.accepts("North", "103", "cardiology"));
        assert!(c.has_cabinet("South", "1"));
        assert!(!c.has_cabinet("South", "2"));
    }

    #[test]
    fn test_cabinet_slot_key() {
        let slot = ShiftSlot::new(2, 1).unwrap();
        let cs = CabinetKey::new("North", "101").at(slot);
        assert_eq!(cs.key(), CabinetKey::new("North", "101"));
        assert_eq!(cs.to_string(), "North/101 (2, 1)");
    }
}
