use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{AppConfig, BackendConfig, LayoutConfig, LogConfig, SessionConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub backend: Option<FileBackendConfig>,
    pub session: Option<FileSessionConfig>,
    pub layout: Option<FileLayoutConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }

        if let Some(session) = self.session {
            session.merge_into(&mut config.session);
        }

        if let Some(layout) = self.layout {
            layout.merge_into(&mut config.layout);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileBackendConfig {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub thread_refresh_interval_ms: Option<u64>,
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }

        if let Some(interval_ms) = self.thread_refresh_interval_ms {
            config.thread_refresh_interval_ms = interval_ms;
        }
    }
}

#[derive(Deserialize, Default)]
pub struct FileSessionConfig {
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
    pub sender_type: Option<String>,
}

impl FileSessionConfig {
    fn merge_into(self, config: &mut SessionConfig) {
        if let Some(user_id) = self.user_id {
            config.user_id = Some(user_id);
        }

        if let Some(auth_token) = self.auth_token {
            config.auth_token = Some(auth_token);
        }

        if let Some(sender_type) = self.sender_type {
            config.sender_type = sender_type;
        }
    }
}

impl std::fmt::Debug for FileSessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSessionConfig")
            .field("user_id", &self.user_id)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("sender_type", &self.sender_type)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLayoutConfig {
    pub narrow_breakpoint: Option<u16>,
}

impl FileLayoutConfig {
    fn merge_into(self, config: &mut LayoutConfig) {
        if let Some(breakpoint) = self.narrow_breakpoint {
            config.narrow_breakpoint = breakpoint;
        }
    }
}
