// src/exec/slot.rs

use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};

/// Single-capacity handoff cell for the discovered tunnel URL.
///
/// - `offer` never blocks: the first value is buffered, later ones are
///   dropped while the buffer is full.
/// - `take` waits for the buffered value. A value offered before `take` is
///   called is still observed.
#[derive(Debug)]
pub struct UrlSlot {
    tx: mpsc::Sender<String>,
    rx: Mutex<mpsc::Receiver<String>>,
}

impl UrlSlot {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Try to deliver `url`. Returns `false` if the slot was already full.
    pub fn offer(&self, url: String) -> bool {
        match self.tx.try_send(url) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Wait up to `timeout` for a delivered value.
    pub async fn take(&self, timeout: Duration) -> Option<String> {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
    }
}

impl Default for UrlSlot {
    fn default() -> Self {
        Self::new()
    }
}
