//! Single FIFO writer between the controller and the store.
//!
//! Saves are applied strictly in the order they were enqueued. Saves that
//! pile up while the store is busy are folded into one patch, later fields
//! winning, so a stale write can never land after a newer one.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::{
    log_debug, log_warn,
    store::{InputPatch, InputStore},
};

const ENABLE_LOGS: bool = true;

enum PersistCommand {
    Save(InputPatch),
    Flush(oneshot::Sender<()>),
}

pub struct PersistQueue {
    sender: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistQueue {
    /// Starts the writer task. Must be called inside a Tokio runtime.
    pub fn spawn(store: Arc<dyn InputStore>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, receiver));
        Self { sender }
    }

    pub fn enqueue(&self, patch: InputPatch) {
        if self.sender.send(PersistCommand::Save(patch)).is_err() {
            log_warn!("Persist writer is gone; inputs stay in memory only");
        }
    }

    /// Resolves once every save enqueued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.sender.send(PersistCommand::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run_writer(store: Arc<dyn InputStore>, mut receiver: mpsc::UnboundedReceiver<PersistCommand>) {
    while let Some(command) = receiver.recv().await {
        let mut patch = match command {
            PersistCommand::Save(patch) => patch,
            PersistCommand::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        let mut pending_flush = None;
        let mut folded = 1usize;
        while let Ok(next) = receiver.try_recv() {
            match next {
                PersistCommand::Save(later) => {
                    patch = patch.then(later);
                    folded += 1;
                }
                PersistCommand::Flush(done) => {
                    pending_flush = Some(done);
                    break;
                }
            }
        }

        match store.save(patch).await {
            Ok(record) => {
                log_debug!(
                    "Persisted inputs ({folded} edit(s)) at {}",
                    record.updated_at.to_rfc3339()
                );
            }
            Err(err) => {
                log_warn!("Failed to persist inputs, next edit will retry: {err:#}");
            }
        }

        if let Some(done) = pending_flush {
            let _ = done.send(());
        }
    }
}
