//! Shared application state for request handlers.

use std::sync::Arc;

use crate::completion::ChatCompleter;
use crate::config::AppConfig;
use crate::records::SharedRecords;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, the lock-guarded record store and
/// the chat-completion client used by the question endpoint.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: SharedRecords,
    pub completer: Arc<dyn ChatCompleter>,
}

impl AppState {
    /// Creates a new application state from the given configuration, store and completion client.
    pub fn new(config: AppConfig, records: SharedRecords, completer: Arc<dyn ChatCompleter>) -> Self {
        Self {
            config: Arc::new(config),
            records,
            completer,
        }
    }
}
