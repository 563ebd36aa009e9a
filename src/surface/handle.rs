use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::shutdown::ShutdownHandle;
use crate::window::SurfaceId;

use super::controller::{Nudge, SurfaceController};
use super::{SurfaceError, SurfaceState};

const EVENT_BUFFER: usize = 64;

/// Input delivered to a running surface.
#[derive(Debug)]
pub enum SurfaceEvent {
    SizeInput(u32),
    OpacityInput(u8),
    SliderRelease,
    ColorInput(String),
    ColorBlur,
    PickCrosshair(String),
    PickReticle(String),
    SetFollowMouse(bool),
    SetHideOnAds(bool),
    ToggleLock,
    ToggleVisibility,
    DragMove { dx: i32, dy: i32 },
    DragRelease,
    Nudge { direction: Nudge, fast: bool },
    Center,
    NextDisplay,
    ImportCrosshair(PathBuf),
    Duplicate,
    Reset,
    OpenSettings,
    OpenChooser,
    /// Answered once every mutation queued before it has completed.
    Flush(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<SurfaceState>),
}

/// Address of a running surface task.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    id: SurfaceId,
    events: mpsc::Sender<SurfaceEvent>,
    close: Arc<watch::Sender<bool>>,
}

impl SurfaceHandle {
    pub fn id(&self) -> &SurfaceId {
        &self.id
    }

    pub async fn send(&self, event: SurfaceEvent) -> Result<(), SurfaceError> {
        self.events
            .send(event)
            .await
            .map_err(|_| SurfaceError::Closed)
    }

    pub async fn snapshot(&self) -> Result<SurfaceState, SurfaceError> {
        let (respond_to, response) = oneshot::channel();
        self.send(SurfaceEvent::Snapshot(respond_to)).await?;
        response.await.map_err(|_| SurfaceError::Closed)
    }

    /// Wait until the surface has drained its mutation queue.
    pub async fn flush(&self) -> Result<(), SurfaceError> {
        let (done, wait) = oneshot::channel();
        self.send(SurfaceEvent::Flush(done)).await?;
        wait.await.map_err(|_| SurfaceError::Closed)
    }

    /// Stop the surface once its current event is handled. Queued
    /// mutations are still flushed.
    pub fn close(&self) {
        self.close.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

/// Run `controller` on its own task.
pub fn spawn_surface(controller: SurfaceController, shutdown: ShutdownHandle) -> SurfaceHandle {
    let (events, receiver) = mpsc::channel(EVENT_BUFFER);
    let (close, closed) = watch::channel(false);
    let id = controller.id().clone();
    tokio::spawn(controller.run(receiver, closed, shutdown));
    SurfaceHandle {
        id,
        events,
        close: Arc::new(close),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bus::NotificationBus;
    use crate::config::Config;
    use crate::ipc::IpcLayer;
    use crate::shutdown::ShutdownCoordinator;
    use crate::surface::{HeadlessBindings, NoticeLog, SurfaceContext, SurfaceRole};

    #[tokio::test]
    async fn close_stops_a_spawned_surface() {
        let config = Config::default();
        let (client, server) = IpcLayer::new(&config.ipc);
        drop(server);
        let notices = Arc::new(NoticeLog::new());
        let context = SurfaceContext {
            client,
            bus: NotificationBus::new(8),
            notices: notices.clone(),
            lock: config.lock.clone(),
        };
        let id = SurfaceId::shadow(1);
        let controller = SurfaceController::new(
            id.clone(),
            SurfaceRole::Shadow,
            Arc::new(HeadlessBindings::new(id)),
            &context,
        );
        let shutdown = ShutdownCoordinator::new();

        // `spawn_surface` requires the run loop to be `Send`.
        let handle = spawn_surface(controller, shutdown.handle());
        let state = handle.snapshot().await.unwrap();
        assert_eq!(state.role, SurfaceRole::Shadow);

        handle.close();
        tokio::time::timeout(Duration::from_secs(1), async {
            while !handle.is_closed() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("surface kept running after close");

        assert!(matches!(handle.flush().await, Err(SurfaceError::Closed)));
        // Hydration failed against the missing store and was reported once.
        assert_eq!(notices.len(), 1);
    }
}
