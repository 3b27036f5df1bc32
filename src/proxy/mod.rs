//! HTTP server module.
//!
//! Provides the public `/ask` endpoint that relays symptom descriptions to
//! the configured completion provider, plus a health probe.

mod handlers;
mod server;
pub mod types;

pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
