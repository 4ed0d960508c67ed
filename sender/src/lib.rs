//! Reliable UDP sender with on-disk spill and resend. See spec §4.2.
//!
//! The send-then-await-"OK"-then-spill-on-failure shape, the batching
//! worker's sentinel-driven flush/shutdown protocol, and the spill/resend
//! pairing are all ported from `python_poc/adapters/common_utils.py`
//! (`sendUDPmsg`, `procemSendWorker`, `BackupFileHandler`).

mod config;
mod send;
mod spill;
mod worker;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use config::SenderConfig;
pub use spill::SpillFiles;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("sender worker has shut down")]
    Closed,
}

/// A running batching worker plus its companion resend sweep loop.
pub struct SenderHandle {
    tx: mpsc::Sender<Option<Bytes>>,
    worker: JoinHandle<()>,
    resend_task: JoinHandle<()>,
}

impl SenderHandle {
    /// Spawns the batching worker and the resend sweep loop.
    #[must_use]
    pub fn spawn(config: SenderConfig) -> Self {
        let spill = Arc::new(SpillFiles::new(&config.spill_dir));
        let (tx, rx) = mpsc::channel(config.queue_capacity);

        let worker = tokio::spawn(worker::batching_worker(config.clone(), spill.clone(), rx));
        let resend_task = tokio::spawn(worker::resend_loop(config, spill, tx.clone()));

        SenderHandle {
            tx,
            worker,
            resend_task,
        }
    }

    /// Enqueues one already-encoded datagram for batching and send.
    pub async fn enqueue(&self, datagram: Bytes) -> Result<(), SendError> {
        self.tx
            .send(Some(datagram))
            .await
            .map_err(|_| SendError::Closed)
    }

    /// Requests an immediate flush of whatever is currently buffered.
    pub async fn flush(&self) -> Result<(), SendError> {
        self.tx
            .send(Some(Bytes::new()))
            .await
            .map_err(|_| SendError::Closed)
    }

    /// Flushes any pending buffer, stops the batching worker, and stops the
    /// resend sweep loop. Waits for the batching worker's final flush to
    /// complete before returning.
    pub async fn shutdown(self) {
        let _ = self.tx.send(None).await;
        self.resend_task.abort();
        let _ = self.worker.await;
    }
}
