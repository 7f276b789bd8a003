use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    contracts::ConfigAdapter,
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const AUTH_TOKEN_ENV: &str = "SWEEP_INBOX_AUTH_TOKEN";
pub const USER_ID_ENV: &str = "SWEEP_INBOX_USER_ID";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let mut config = load_file(path)?;
    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Loads from an optional file path, falling back to `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> anyhow::Result<AppConfig> {
        load(self.path.as_deref()).map_err(Into::into)
    }
}

fn load_file(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if !config_path.exists() {
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(token) = non_blank_env(AUTH_TOKEN_ENV) {
        config.session.auth_token = Some(token);
    }

    if let Some(user_id) = non_blank_env(USER_ID_ENV) {
        config.session.user_id = Some(user_id);
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn validate(config: &AppConfig) -> Result<(), AppError> {
    let base_url = config.backend.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(AppError::InvalidConfig {
            details: format!("backend.base_url must be an http(s) URL, got `{base_url}`"),
        });
    }

    if config.backend.request_timeout_ms == 0 {
        return Err(AppError::InvalidConfig {
            details: "backend.request_timeout_ms must be greater than zero".to_owned(),
        });
    }

    Ok(())
}
