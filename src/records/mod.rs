//! Victim records: the deceased list and per-location patient groupings.
//!
//! `RecordStore` owns the data, enforces that a name is never both deceased
//! and a patient, and rewrites the JSON snapshot after every mutation.
//! `SharedRecords` is the handle request handlers use; it serializes all
//! access to one store behind a single lock.

mod locations;
pub mod seed;
mod shared;
mod store;

use serde::{Deserialize, Serialize};

pub use locations::{Location, Locations};
pub use shared::SharedRecords;
pub use store::{RecordStore, RegistrationError, StoreError, StoreStats};

/// A hospitalized person. Absent age is not the same as age zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "edad", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

/// Full store contents, in the persisted layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "fallecidos", default)]
    pub deceased: Vec<String>,
    #[serde(rename = "pacientes_hospitales", default)]
    pub patients: Locations,
}

impl Snapshot {
    /// Plain-text block embedded in the chat system prompt.
    ///
    /// The layout is consumed by existing prompt instructions and must not
    /// change: header, one `- name` line per deceased entry, a blank line,
    /// then each location as `\n{location}:\n` followed by its patients.
    pub fn render_for_prompt(&self) -> String {
        let mut text = String::from("Lista de fallecidos confirmados:\n");
        for name in &self.deceased {
            text.push_str("- ");
            text.push_str(name);
            text.push('\n');
        }

        text.push_str("\nPacientes en hospitales:\n");
        for location in self.patients.iter() {
            text.push('\n');
            text.push_str(&location.name);
            text.push_str(":\n");
            for patient in &location.patients {
                match patient.age {
                    Some(age) => text.push_str(&format!("- {}, {} años\n", patient.name, age)),
                    None => text.push_str(&format!("- {}\n", patient.name)),
                }
            }
        }

        text
    }
}
