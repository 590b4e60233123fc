//! Cooperative cancellation for watches

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Create a linked cancel handle and cancellation signal
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, Cancellation { rx })
}

/// Fires the cancellation signal
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed at every suspension point of a transport
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// A signal that never fires
    pub fn never() -> Self {
        cancellation().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Pends forever if every handle was dropped first.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            futures::future::pending::<()>().await;
        }
    }

    /// Drive `fut` to completion unless the signal fires first, in which case
    /// `fut` is dropped and `None` is returned.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut cancel = self.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
