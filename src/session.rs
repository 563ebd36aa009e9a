//! Wiring for one running overlay: store task, window owner, surfaces.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::bus::NotificationBus;
use crate::config::Config;
use crate::ipc::{CommandClient, IpcError, IpcLayer};
use crate::prefs::{Preferences, PreferencesFile};
use crate::shutdown::{ShutdownCoordinator, ShutdownHandle, ShutdownPhase};
use crate::store::{ExternalAction, PreferenceState, Store};
use crate::surface::{
    spawn_surface, HeadlessBindings, NoticeLog, SurfaceContext, SurfaceController, SurfaceError,
    SurfaceHandle, SurfaceRole,
};
use crate::window::{HeadlessWindows, SurfaceId, WindowError, WindowOwner};

/// Flush rounds in [`Session::settle`]. A round can trigger follow-up work
/// on other surfaces, such as a duplicate requested over the bus.
const SETTLE_ROUNDS: usize = 3;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to open window: {0}")]
    Window(#[from] WindowError),

    #[error("Store request failed: {0}")]
    Ipc(#[from] IpcError),

    #[error("Surface unavailable: {0}")]
    Surface(#[from] SurfaceError),
}

type BindingsMap = Arc<Mutex<BTreeMap<SurfaceId, Arc<HeadlessBindings>>>>;

pub struct Session {
    client: CommandClient,
    state: PreferenceState,
    windows: Arc<HeadlessWindows>,
    bindings: BindingsMap,
    notices: Arc<NoticeLog>,
    coordinator: ShutdownCoordinator,
    server: JoinHandle<()>,
}

impl Session {
    /// Load preferences, start the store and open the primary surface.
    /// Must be called inside a tokio runtime.
    pub fn start(config: &Config, file: PreferencesFile) -> Result<Self, SessionError> {
        let coordinator = ShutdownCoordinator::new();
        let bus = NotificationBus::new(config.bus.capacity);
        let prefs = file.load_or_default();
        let state = PreferenceState::new(prefs.clone());
        let (client, server) = IpcLayer::new(&config.ipc);
        let notices = Arc::new(NoticeLog::new());
        let bindings: BindingsMap = Arc::default();

        let context = SurfaceContext {
            client: client.clone(),
            bus: bus.clone(),
            notices: notices.clone(),
            lock: config.lock.clone(),
        };
        let spawned = Arc::clone(&bindings);
        let shutdown = coordinator.handle();
        let windows = Arc::new(HeadlessWindows::single_display().with_spawner(Box::new(
            move |id: &SurfaceId, role: SurfaceRole| -> SurfaceHandle {
                let surface_bindings = Arc::new(HeadlessBindings::new(id.clone()));
                spawned.lock().insert(id.clone(), Arc::clone(&surface_bindings));
                let controller = SurfaceController::new(id.clone(), role, surface_bindings, &context);
                spawn_surface(controller, shutdown.clone())
            },
        )));

        let store = Store::new(
            config,
            state.clone(),
            bus,
            windows.clone(),
            file,
            coordinator.handle(),
        );
        let server = tokio::spawn(server.run(store, coordinator.handle()));

        let main = SurfaceId::main();
        windows.open(&main, SurfaceRole::Primary, prefs.position())?;
        windows.set_click_through(&main, prefs.locked)?;
        tracing::info!(locked = prefs.locked, "Session started");

        Ok(Self {
            client,
            state,
            windows,
            bindings,
            notices,
            coordinator,
            server,
        })
    }

    pub fn client(&self) -> &CommandClient {
        &self.client
    }

    pub fn state(&self) -> &PreferenceState {
        &self.state
    }

    pub fn windows(&self) -> &Arc<HeadlessWindows> {
        &self.windows
    }

    pub fn notices(&self) -> &Arc<NoticeLog> {
        &self.notices
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.coordinator.handle()
    }

    pub fn surface(&self, id: &SurfaceId) -> Option<SurfaceHandle> {
        self.windows.handle(id)
    }

    pub fn primary(&self) -> Result<SurfaceHandle, SessionError> {
        self.surface(&SurfaceId::main())
            .ok_or(SessionError::Surface(SurfaceError::Closed))
    }

    /// What a surface's headless bindings have recorded so far.
    pub fn bindings(&self, id: &SurfaceId) -> Option<Arc<HeadlessBindings>> {
        self.bindings.lock().get(id).cloned()
    }

    pub async fn dispatch(&self, action: ExternalAction) -> Result<(), SessionError> {
        Ok(self.client.dispatch(action).await?)
    }

    /// Wait for every open surface to drain its queued mutations and the
    /// notifications they caused.
    pub async fn settle(&self) {
        for _ in 0..SETTLE_ROUNDS {
            for id in self.windows.surfaces() {
                if let Some(handle) = self.windows.handle(&id) {
                    if let Err(e) = handle.flush().await {
                        tracing::debug!(surface = %id, error = %e, "Skipped flush");
                    }
                }
            }
            tokio::task::yield_now().await;
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let surfaces = self
            .windows
            .surfaces()
            .into_iter()
            .filter_map(|id| self.windows.record(&id).map(|record| (id, record.role)))
            .collect();
        SessionSummary {
            prefs: self.state.snapshot(),
            surfaces,
            commits: self.state.commit_count(),
            requests: self.state.requests().len(),
            notices: self.notices.len(),
        }
    }

    /// Close every surface, commit unless a quit already did, then stop
    /// the store.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        let already_committed = self.coordinator.is_shutting_down();

        self.coordinator.advance(ShutdownPhase::ClosingSurfaces);
        self.settle().await;
        self.windows.close_all();

        self.coordinator.advance(ShutdownPhase::Committing);
        let committed = if already_committed {
            Ok(())
        } else {
            self.client.save_preferences().await
        };

        self.coordinator.advance(ShutdownPhase::StoppingStore);
        self.coordinator.signal();
        if let Err(e) = self.server.await {
            tracing::error!(error = %e, "Store task failed");
        }

        self.coordinator.advance(ShutdownPhase::Complete);
        Ok(committed?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub prefs: Preferences,
    pub surfaces: Vec<(SurfaceId, SurfaceRole)>,
    pub commits: u64,
    pub requests: usize,
    pub notices: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.prefs;
        writeln!(f, "crosshair:    {}", p.crosshair)?;
        writeln!(f, "size:         {}", p.size)?;
        writeln!(f, "opacity:      {:.2}", p.opacity)?;
        writeln!(f, "color:        {}", p.color)?;
        writeln!(f, "reticle:      {}", p.reticle.as_str())?;
        writeln!(f, "locked:       {}", p.locked)?;
        writeln!(f, "visible:      {}", p.visible)?;
        writeln!(f, "follow mouse: {}", p.follow_mouse)?;
        writeln!(f, "hide on ADS:  {}", p.hide_on_ads)?;
        if let Some((x, y)) = p.position() {
            writeln!(f, "position:     {x},{y}")?;
        }
        let surfaces: Vec<String> = self
            .surfaces
            .iter()
            .map(|(id, role)| format!("{id} ({role})"))
            .collect();
        writeln!(f, "surfaces:     {}", surfaces.join(", "))?;
        write!(
            f,
            "{} commits, {} store requests, {} notices",
            self.commits, self.requests, self.notices
        )
    }
}
