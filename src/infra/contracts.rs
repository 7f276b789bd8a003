use anyhow::Result;

use crate::infra::config::AppConfig;

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Hands a URL to the desktop's default handler.
pub trait ExternalOpener {
    fn open(&self, target: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open(&self, target: &str) -> Result<()> {
        open::that_detached(target)?;
        Ok(())
    }
}
