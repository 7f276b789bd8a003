use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        storage_layout::StorageLayout,
    },
    usecases::context::AppContext,
};

const SESSION_CREDENTIALS_MISSING: &str = "SESSION_CREDENTIALS_MISSING";

/// Where log lines go for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// One-shot CLI commands.
    Stderr,
    /// The TUI owns the terminal, so logs go to the state directory.
    File,
}

pub struct Bootstrapped {
    pub context: AppContext,
    /// Flushes the file writer on drop; hold it until the UI loop exits.
    pub log_guard: Option<WorkerGuard>,
}

pub fn bootstrap(config_path: Option<&Path>, sink: LogSink) -> Result<Bootstrapped, AppError> {
    let context = build_context(config_path)?;

    let log_guard = match sink {
        LogSink::Stderr => {
            infra::logging::init(&context.config.logging)?;
            None
        }
        LogSink::File => {
            let log_file = match &context.config.logging.file {
                Some(path) => path.clone(),
                None => {
                    let layout = StorageLayout::resolve()?;
                    layout.ensure_dirs()?;
                    layout.log_file()
                }
            };
            Some(infra::logging::init_to_file(
                &context.config.logging,
                &log_file,
            )?)
        }
    };

    if context.credentials.is_none() {
        tracing::warn!(
            code = SESSION_CREDENTIALS_MISSING,
            "no user id or auth token configured; backend calls are disabled"
        );
    }

    Ok(Bootstrapped { context, log_guard })
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config_adapter = FileConfigAdapter::new(config_path);
    let config = config_adapter.load().map_err(AppError::Other)?;

    Ok(AppContext::new(config))
}
