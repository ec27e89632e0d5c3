//! Insertion-ordered location groupings.
//!
//! Locations serialize as a JSON object keyed by location name. Key order in
//! the document is the first-use order, and deserialization keeps it, so a
//! persist/reload cycle does not reorder facilities.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::PatientRecord;

/// Patients registered under one location, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub patients: Vec<PatientRecord>,
}

/// Ordered mapping of location name to its patients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locations(Vec<Location>);

impl Locations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&[PatientRecord]> {
        self.0
            .iter()
            .find(|loc| loc.name == name)
            .map(|loc| loc.patients.as_slice())
    }

    /// Append a patient to `location`, creating the location at the end if new.
    pub fn push(&mut self, location: &str, patient: PatientRecord) {
        match self.0.iter_mut().find(|loc| loc.name == location) {
            Some(loc) => loc.patients.push(patient),
            None => self.0.push(Location {
                name: location.to_string(),
                patients: vec![patient],
            }),
        }
    }

    /// First location (in iteration order) holding a patient called `name`.
    pub fn locate(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|loc| loc.patients.iter().any(|p| p.name == name))
            .map(|loc| loc.name.as_str())
    }

    /// Remove the first record named `name` from every location.
    ///
    /// Locations emptied this way are kept. Returns the number removed.
    pub fn remove_patient(&mut self, name: &str) -> usize {
        let mut removed = 0;
        for loc in &mut self.0 {
            if let Some(index) = loc.patients.iter().position(|p| p.name == name) {
                loc.patients.remove(index);
                removed += 1;
            }
        }
        removed
    }

    pub fn patient_count(&self) -> usize {
        self.0.iter().map(|loc| loc.patients.len()).sum()
    }
}

impl Serialize for Locations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for loc in &self.0 {
            map.serialize_entry(&loc.name, &loc.patients)?;
        }
        map.end()
    }
}

struct LocationsVisitor;

impl<'de> Visitor<'de> for LocationsVisitor {
    type Value = Locations;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of location name to patient list")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut locations = Locations(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((name, patients)) = access.next_entry::<String, Vec<PatientRecord>>()? {
            // A repeated key merges into the first occurrence.
            match locations.0.iter_mut().find(|loc| loc.name == name) {
                Some(loc) => loc.patients.extend(patients),
                None => locations.0.push(Location { name, patients }),
            }
        }
        Ok(locations)
    }
}

impl<'de> Deserialize<'de> for Locations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LocationsVisitor)
    }
}
