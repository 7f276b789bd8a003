use crate::{domain::session::Credentials, infra::config::AppConfig};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    /// `None` when the user id or token is missing; network operations then no-op.
    pub credentials: Option<Credentials>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let credentials = config.session.credentials();
        Self {
            config,
            credentials,
        }
    }
}
