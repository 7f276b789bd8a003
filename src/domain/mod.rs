//! Domain layer: threads, messages and inbox state.

pub mod events;
pub mod inbox_state;
pub mod message;
pub mod message_input_state;
pub mod selection;
pub mod session;
pub mod thread;
pub mod thread_store;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
