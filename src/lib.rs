//! Incident victim registry.
//!
//! Tracks confirmed deceased people and hospitalized patients by location,
//! persists both lists to a JSON snapshot, and answers free-text questions
//! about specific people through a chat-completion API that is given the
//! current records as context.

pub mod completion;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod records;
pub mod routes;
pub mod state;
