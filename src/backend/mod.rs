//! Marketplace chat API integration: HTTP client, wire mapping, and the
//! async dispatcher feeding results back to the UI loop.

pub mod client;
pub mod dispatcher;
pub mod wire;

pub use client::HttpBackend;
pub use dispatcher::TokioDispatcher;

/// Returns the backend module name for smoke checks.
pub fn module_name() -> &'static str {
    "backend"
}
