//! Abort signalling between an orchestrator and a running task.
//!
//! - `AbortHandle::abort()` flips every `AbortSignal` subscribed to it
//! - dropping the handle does not count as an abort

use tokio::sync::watch;

/// Orchestrator side: requests the abort.
#[derive(Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn abort(&self) {
        // send_replace works even while no signal is subscribed
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Task side: observes the abort.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once abort is requested. Never resolves if the handle is
    /// dropped without aborting.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|aborted| *aborted).await.map(|_| ()).is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
