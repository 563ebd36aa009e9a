//! Per-surface ordered mutation queue.
//!
//! Gestures push mutations without waiting. A single worker task sends
//! them to the store in push order, so a commit never overtakes the writes
//! of its own gesture. Failures go to the surface's notice sink and are
//! not retried.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::ipc::{CommandClient, IpcError};
use crate::prefs::FieldUpdate;
use crate::window::SurfaceId;

use super::notice::{Notice, NoticeSink};
use super::SurfaceError;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Set(FieldUpdate),
    ToggleLock,
    ToggleVisibility,
    Commit,
    MoveBy { target: SurfaceId, dx: i32, dy: i32 },
    Center(SurfaceId),
    NextDisplay(SurfaceId),
    /// Store the window's current placement and commit.
    PersistPosition(SurfaceId),
}

enum QueueItem {
    Mutation(Mutation),
    Flush(oneshot::Sender<()>),
}

pub struct MutationQueue {
    sender: mpsc::UnboundedSender<QueueItem>,
}

impl MutationQueue {
    /// Start the worker. Must be called inside a tokio runtime.
    pub fn spawn(surface: SurfaceId, client: CommandClient, notices: Arc<dyn NoticeSink>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(surface, client, notices, receiver));
        Self { sender }
    }

    pub fn push(&self, mutation: Mutation) {
        if self.sender.send(QueueItem::Mutation(mutation)).is_err() {
            tracing::trace!("Mutation dropped (worker gone)");
        }
    }

    /// Wait until everything pushed before this call has been answered.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(QueueItem::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }
}

async fn run_worker(
    surface: SurfaceId,
    client: CommandClient,
    notices: Arc<dyn NoticeSink>,
    mut receiver: mpsc::UnboundedReceiver<QueueItem>,
) {
    while let Some(item) = receiver.recv().await {
        match item {
            QueueItem::Mutation(mutation) => {
                if let Err(e) = execute(&client, &mutation).await {
                    tracing::debug!(surface = %surface, ?mutation, error = %e, "Mutation failed");
                    notices.notify(Notice::from_error(surface.clone(), &SurfaceError::Ipc(e)));
                }
            }
            QueueItem::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn execute(client: &CommandClient, mutation: &Mutation) -> Result<(), IpcError> {
    match mutation {
        Mutation::Set(update) => client.set(update.clone()).await,
        Mutation::ToggleLock => client.toggle_lock().await.map(drop),
        Mutation::ToggleVisibility => client.toggle_visibility().await.map(drop),
        Mutation::Commit => client.save_preferences().await,
        Mutation::MoveBy { target, dx, dy } => client
            .move_window_by(target.clone(), *dx, *dy)
            .await
            .map(drop),
        Mutation::Center(target) => client.center_window(target.clone()).await.map(drop),
        Mutation::NextDisplay(target) => client
            .move_to_next_display(target.clone())
            .await
            .map(drop),
        Mutation::PersistPosition(target) => {
            let (x, y) = client.window_position(target.clone()).await?;
            client.set_position(x, y).await?;
            client.save_preferences().await
        }
    }
}
