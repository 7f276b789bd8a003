mod app_config;
mod file_config;
mod loader;

pub use app_config::{AppConfig, BackendConfig, LayoutConfig, LogConfig, SessionConfig};
pub use loader::{load, FileConfigAdapter, AUTH_TOKEN_ENV, USER_ID_ENV};
