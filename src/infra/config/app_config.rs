use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{selection::DEFAULT_NARROW_BREAKPOINT, session::Credentials};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Log file for the TUI. Defaults to the state directory when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// `0` disables the periodic thread list refresh.
    pub thread_refresh_interval_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_owned(),
            request_timeout_ms: 15_000,
            thread_refresh_interval_ms: 30_000,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
    pub sender_type: String,
}

impl SessionConfig {
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.user_id.as_deref(), self.auth_token.as_deref())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            auth_token: None,
            sender_type: "manager".to_owned(),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("user_id", &self.user_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("sender_type", &self.sender_type)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Terminal width (columns) below which only one pane is shown.
    pub narrow_breakpoint: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            narrow_breakpoint: DEFAULT_NARROW_BREAKPOINT,
        }
    }
}
