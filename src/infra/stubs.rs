//! Test doubles for infra contracts.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::infra::contracts::ExternalOpener;

/// Opener that ignores every request.
#[derive(Debug, Clone, Default)]
pub struct NoopOpener;

impl ExternalOpener for NoopOpener {
    fn open(&self, target: &str) -> Result<()> {
        tracing::debug!(url = target, "external open skipped");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("opener lock").clone()
    }
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, target: &str) -> Result<()> {
        self.opened.lock().expect("opener lock").push(target.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_opener_accepts_any_target() {
        assert!(NoopOpener.open("https://cdn.example/a.png").is_ok());
    }

    #[test]
    fn recording_opener_shares_history_between_clones() {
        let opener = RecordingOpener::default();
        let clone = opener.clone();

        clone.open("https://cdn.example/a.png").expect("open");

        assert_eq!(opener.opened(), vec!["https://cdn.example/a.png".to_owned()]);
    }
}
