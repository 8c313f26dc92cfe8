//! Graceful shutdown signal.
//!
//! A single-shot flag, set by a keypress on stdin or Ctrl-C and checked by
//! the cycle loop once per cycle.

use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// Cloneable shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Non-blocking check.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // Sender lives in self, so changed() cannot fail while we wait.
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Watch stdin and Ctrl-C in the background.
    ///
    /// Stdin is read on a plain thread so a pending read never holds up
    /// runtime shutdown. End of input (e.g. stdin redirected from
    /// /dev/null) is not treated as a keypress.
    pub fn spawn_watchers(&self) {
        let keypress = self.clone();
        std::thread::spawn(move || {
            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(n) if n > 0 => {
                    info!("Keypress received, shutting down");
                    keypress.trigger();
                }
                Ok(_) => info!("Stdin closed, only Ctrl-C will stop the bot"),
                Err(e) => warn!(error = %e, "Failed to read stdin"),
            }
        });

        let ctrl_c = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, shutting down");
                    ctrl_c.trigger();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }
}
