//! Cancellation scopes for work started on behalf of a visible view.

use tokio::sync::watch;

/// Held by the view that started the work. Dropping it cancels every
/// [`ScopeToken`] handed out from it.
#[derive(Debug)]
pub struct ViewScope {
    id: u64,
    cancel_tx: watch::Sender<bool>,
}

impl ViewScope {
    pub fn new(id: u64) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self { id, cancel_tx }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            id: self.id,
            cancel_rx: self.cancel_tx.subscribe(),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct ScopeToken {
    id: u64,
    cancel_rx: watch::Receiver<bool>,
}

impl ScopeToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow() || self.cancel_rx.has_changed().is_err()
    }

    /// Resolves once the owning [`ViewScope`] is dropped.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.cancel_rx.borrow_and_update() {
                return;
            }

            if self.cancel_rx.changed().await.is_err() {
                return;
            }
        }
    }
}
