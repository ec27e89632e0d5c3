//! HTTP server module with optional TLS.
//!
//! Two listener modes:
//! - **None (default)**: Plain HTTP, for development or behind a reverse proxy
//! - **Manual**: User-provided certificate and key files
//!
//! Both modes shut down gracefully on SIGTERM/SIGINT. In manual mode the
//! certificate is reloaded from disk on SIGHUP.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
