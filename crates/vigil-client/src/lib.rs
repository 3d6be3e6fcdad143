//! # vigil-client
//!
//! Application layer of the Vigil vehicle-theft complaint tracker: the
//! operations a UI calls (create complaint, track status, chat, triage) and
//! the view synchronization that keeps two independently rendering clients
//! looking at the same remotely stored record.

pub mod auth;
pub mod chat;
pub mod complaints;
pub mod config;
pub mod dashboard;
pub mod detect;
pub mod notify;
pub mod state;
pub mod sync;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise tracing for an embedding application. Respects `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vigil_client=debug,vigil_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
