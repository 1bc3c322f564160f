//! Debounced notebook saving.

use super::{NotebookSink, PersistError};
use crate::models::NotebookPatch;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

enum Command {
    Edit(NotebookPatch),
    Flush(oneshot::Sender<Result<(), PersistError>>),
    Close,
}

/// Coalesces edits to one notebook and saves them after a quiet period.
///
/// Every edit restarts the delay. When it elapses, all edits since the last
/// save are merged into one patch and written. A failed save keeps the patch
/// pending; it is retried on the next edit or an explicit [`flush`].
///
/// [`flush`]: DebouncedSaver::flush
pub struct DebouncedSaver {
    notebook_id: Uuid,
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

impl DebouncedSaver {
    /// Starts a saver task for `notebook_id` on the current runtime.
    pub fn spawn<S: NotebookSink>(sink: Arc<S>, notebook_id: Uuid, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(sink, notebook_id, delay, rx));
        Self {
            notebook_id,
            tx,
            handle,
        }
    }

    /// The notebook this saver writes to.
    #[must_use]
    pub fn notebook_id(&self) -> Uuid {
        self.notebook_id
    }

    /// Records an edit and restarts the delay.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Closed` if the saver task has stopped.
    pub fn edit(&self, patch: NotebookPatch) -> Result<(), PersistError> {
        self.tx
            .send(Command::Edit(patch))
            .map_err(|_| PersistError::Closed)
    }

    /// Saves pending edits immediately.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the save fails, or `PersistError::Closed`
    /// if the saver task has stopped.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| PersistError::Closed)?;
        rx.await.map_err(|_| PersistError::Closed)?
    }

    /// Stops the saver. Edits not yet saved are discarded.
    pub async fn close(self) {
        let _ = self.tx.send(Command::Close);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Notebook saver task ended abnormally");
        }
    }
}

async fn run<S: NotebookSink>(
    sink: Arc<S>,
    notebook_id: Uuid,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut pending: Option<NotebookPatch> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            Some(at) => tokio::select! {
                command = rx.recv() => command,
                () = sleep_until(at) => {
                    deadline = None;
                    let _ = save_pending(sink.as_ref(), notebook_id, &mut pending).await;
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match command {
            Some(Command::Edit(patch)) => {
                match pending.as_mut() {
                    Some(existing) => existing.merge(patch),
                    None => pending = Some(patch),
                }
                deadline = Some(Instant::now() + delay);
            }
            Some(Command::Flush(reply)) => {
                deadline = None;
                let result = save_pending(sink.as_ref(), notebook_id, &mut pending).await;
                let _ = reply.send(result);
            }
            Some(Command::Close) | None => {
                if pending.is_some() {
                    tracing::debug!(%notebook_id, "Discarding unsaved notebook edits");
                }
                break;
            }
        }
    }
}

async fn save_pending<S: NotebookSink>(
    sink: &S,
    notebook_id: Uuid,
    pending: &mut Option<NotebookPatch>,
) -> Result<(), PersistError> {
    let Some(patch) = pending.take() else {
        return Ok(());
    };

    match sink.save(notebook_id, patch.clone()).await {
        Ok(()) => {
            tracing::debug!(%notebook_id, "Saved notebook");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(%notebook_id, error = %e, "Failed to save notebook");
            *pending = Some(patch);
            Err(e)
        }
    }
}
