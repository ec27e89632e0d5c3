//! File-backed record store.
//!
//! The whole state lives in memory and is written to a single JSON document
//! after every successful mutation. Writes go to a sibling temporary file that
//! is renamed over the snapshot, so a crash mid-write leaves the previous
//! snapshot intact.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::instrument;

use super::{seed, PatientRecord, Snapshot};

/// Errors reading or writing the snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed snapshot {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a patient registration was refused.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("El paciente ya existe en {location}")]
    AlreadyPatient { location: String },

    #[error("La persona está en la lista de fallecidos")]
    AlreadyDeceased,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Collection sizes, for the startup log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub deceased: usize,
    pub locations: usize,
    pub patients: usize,
}

pub struct RecordStore {
    path: PathBuf,
    state: Snapshot,
}

impl RecordStore {
    /// Open the store backed by `path`.
    ///
    /// A missing file is created from the built-in seed. An unreadable or
    /// malformed file is an error unless `tolerate_corrupt` is set, in which
    /// case the failure is logged and the store starts empty.
    pub fn open(path: impl Into<PathBuf>, tolerate_corrupt: bool) -> Result<Self, StoreError> {
        let path = path.into();

        if !path.exists() {
            let store = Self {
                path,
                state: seed::snapshot(),
            };
            write_snapshot(&store.path, &store.state)?;
            tracing::info!(path = %store.path.display(), "Seeded new snapshot");
            return Ok(store);
        }

        match read_snapshot(&path) {
            Ok(state) => {
                warn_on_violations(&state);
                Ok(Self { path, state })
            }
            Err(e) if tolerate_corrupt => {
                tracing::error!(error = %e, "Failed to load snapshot, starting with empty records");
                Ok(Self {
                    path,
                    state: Snapshot::default(),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists_deceased(&self, name: &str) -> bool {
        self.state.deceased.iter().any(|n| n == name)
    }

    /// Location of the first patient record matching `name` exactly.
    pub fn find_patient(&self, name: &str) -> Option<&str> {
        self.state.patients.locate(name)
    }

    /// Record `name` as deceased, removing any patient record first.
    ///
    /// Returns `Ok(false)` without touching the snapshot if the name is
    /// already on the deceased list.
    #[instrument(name = "records::register_deceased", skip(self))]
    pub fn register_deceased(&mut self, name: &str) -> Result<bool, StoreError> {
        if self.exists_deceased(name) {
            tracing::debug!("Already registered as deceased");
            return Ok(false);
        }

        let mut next = self.state.clone();
        let removed = next.patients.remove_patient(name);
        next.deceased.push(name.to_string());
        self.commit(next)?;

        if removed > 0 {
            tracing::info!(removed, "Removed from patient list");
        }
        tracing::info!("Registered as deceased");
        Ok(true)
    }

    /// Add a patient under `location`. Zero ages are stored as absent.
    #[instrument(name = "records::register_patient", skip(self))]
    pub fn register_patient(
        &mut self,
        name: &str,
        location: &str,
        age: Option<u32>,
    ) -> Result<(), RegistrationError> {
        if let Some(existing) = self.find_patient(name) {
            tracing::debug!(existing, "Already registered as patient");
            return Err(RegistrationError::AlreadyPatient {
                location: existing.to_string(),
            });
        }
        if self.exists_deceased(name) {
            tracing::debug!("Already registered as deceased");
            return Err(RegistrationError::AlreadyDeceased);
        }

        let mut next = self.state.clone();
        next.patients.push(
            location,
            PatientRecord {
                name: name.to_string(),
                age: age.filter(|a| *a > 0),
            },
        );
        self.commit(next)?;
        tracing::info!("Registered as patient");
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    pub fn render_for_prompt(&self) -> String {
        self.state.render_for_prompt()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            deceased: self.state.deceased.len(),
            locations: self.state.patients.len(),
            patients: self.state.patients.patient_count(),
        }
    }

    /// Persist `next` and make it the current state.
    ///
    /// The in-memory state only changes once the file write succeeded.
    fn commit(&mut self, next: Snapshot) -> Result<(), StoreError> {
        write_snapshot(&self.path, &next)?;
        self.state = next;
        Ok(())
    }
}

/// Overwrite the snapshot file at `path` with `state`.
fn write_snapshot(path: &Path, state: &Snapshot) -> Result<(), StoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| StoreError::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let mut serialized = serde_json::to_string_pretty(state)?;
    serialized.push('\n');

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, serialized).map_err(io_err(&temp_path))?;

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Log names in a loaded snapshot that break the exclusivity rules.
///
/// Hand-edited snapshots are kept verbatim; this only makes problems visible.
fn warn_on_violations(state: &Snapshot) {
    let deceased: HashSet<&str> = state.deceased.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    for location in state.patients.iter() {
        for patient in &location.patients {
            if deceased.contains(patient.name.as_str()) {
                tracing::warn!(
                    name = %patient.name,
                    location = %location.name,
                    "Snapshot lists a deceased person as patient"
                );
            }
            if !seen.insert(patient.name.as_str()) {
                tracing::warn!(
                    name = %patient.name,
                    location = %location.name,
                    "Snapshot lists a patient more than once"
                );
            }
        }
    }
}
