//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod context;
pub mod contracts;
pub mod create_thread;
pub mod inbox;
pub mod list_threads;
pub mod load_messages;
pub mod send_message;
pub mod view_scope;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
