//! Lock-guarded handle to a record store, shared across request handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{RecordStore, RegistrationError, Snapshot, StoreError, StoreStats};

/// Cloneable handle serializing access to one `RecordStore`.
///
/// Registrations hold the write lock for their whole check-then-append
/// sequence including the snapshot write, so two requests for the same new
/// name cannot both pass the duplicate checks. Reads share the read lock.
#[derive(Clone)]
pub struct SharedRecords {
    inner: Arc<RwLock<RecordStore>>,
}

impl SharedRecords {
    pub fn new(store: RecordStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn exists_deceased(&self, name: &str) -> bool {
        self.inner.read().await.exists_deceased(name)
    }

    pub async fn find_patient(&self, name: &str) -> Option<String> {
        self.inner.read().await.find_patient(name).map(str::to_string)
    }

    pub async fn register_deceased(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.write().await.register_deceased(name)
    }

    pub async fn register_patient(
        &self,
        name: &str,
        location: &str,
        age: Option<u32>,
    ) -> Result<(), RegistrationError> {
        self.inner
            .write()
            .await
            .register_patient(name, location, age)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.snapshot()
    }

    pub async fn render_for_prompt(&self) -> String {
        self.inner.read().await.render_for_prompt()
    }

    pub async fn stats(&self) -> StoreStats {
        self.inner.read().await.stats()
    }
}
