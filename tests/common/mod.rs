//! Shared harness: a live store task with a headless window owner.

#![allow(dead_code, unused_imports)]

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossover::bus::NotificationBus;
use crossover::catalog::CrosshairCatalog;
use crossover::config::Config;
use crossover::ipc::{CommandClient, IpcLayer};
use crossover::prefs::{Preferences, PreferencesFile};
use crossover::shutdown::ShutdownCoordinator;
use crossover::store::{PreferenceState, Store};
use crossover::surface::{
    spawn_surface, NoticeLog, SurfaceBindings, SurfaceContext, SurfaceController, SurfaceRole,
    SurfaceView,
};
use crossover::window::{HeadlessWindows, SurfaceId, WindowOwner};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const BUILTIN: &[&str] = &["crosshair-default.png", "target-dot.png", "x-thin.svg"];

/// Everything a surface asked its presentation layer to do.
#[derive(Debug, Default, Clone)]
pub struct Recorded {
    pub views: Vec<SurfaceView>,
    pub sounds: Vec<String>,
    pub about: usize,
    /// Whether the last rendered view was locked when the chooser opened.
    pub chooser_opened_locked: Vec<bool>,
}

#[derive(Debug, Default)]
pub struct RecordingBindings {
    inner: Mutex<Recorded>,
}

impl RecordingBindings {
    pub fn recorded(&self) -> Recorded {
        self.inner.lock().clone()
    }

    pub fn last_view(&self) -> Option<SurfaceView> {
        self.inner.lock().views.last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.inner.lock().views.len()
    }
}

impl SurfaceBindings for RecordingBindings {
    fn render(&self, view: &SurfaceView) {
        self.inner.lock().views.push(view.clone());
    }

    fn play_sound(&self, name: &str) {
        self.inner.lock().sounds.push(name.to_string());
    }

    fn show_about(&self) {
        self.inner.lock().about += 1;
    }

    fn show_chooser(&self, _catalog: &[String]) {
        let mut inner = self.inner.lock();
        let locked = inner.views.last().map(|view| view.locked).unwrap_or(false);
        inner.chooser_opened_locked.push(locked);
    }
}

type Spawned = Arc<Mutex<BTreeMap<SurfaceId, Arc<RecordingBindings>>>>;

pub struct Harness {
    pub dir: TempDir,
    pub config: Config,
    pub bus: NotificationBus,
    pub state: PreferenceState,
    pub windows: Arc<HeadlessWindows>,
    pub client: CommandClient,
    pub notices: Arc<NoticeLog>,
    pub shutdown: ShutdownCoordinator,
    context: SurfaceContext,
    spawned: Spawned,
    server: JoinHandle<()>,
}

impl Harness {
    pub fn new(prefs: Preferences) -> Self {
        Self::with_config(prefs, test_config())
    }

    /// The main window is open but has no running controller; tests build
    /// it with [`Harness::controller`]. Windows the store opens later
    /// (shadows, settings) get a spawned controller.
    pub fn with_config(prefs: Preferences, config: Config) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let builtin = dir.path().join("builtin");
        std::fs::create_dir_all(&builtin).expect("builtin dir");
        for name in BUILTIN {
            std::fs::write(builtin.join(name), b"img").expect("builtin crosshair");
        }

        let shutdown = ShutdownCoordinator::new();
        let bus = NotificationBus::new(config.bus.capacity);
        let state = PreferenceState::new(prefs.clone());
        let (client, server) = IpcLayer::new(&config.ipc);
        let notices = Arc::new(NoticeLog::new());
        let context = SurfaceContext {
            client: client.clone(),
            bus: bus.clone(),
            notices: notices.clone(),
            lock: config.lock.clone(),
        };

        let windows = HeadlessWindows::single_display();
        windows
            .open(&SurfaceId::main(), SurfaceRole::Primary, prefs.position())
            .expect("main window");
        windows
            .set_click_through(&SurfaceId::main(), prefs.locked)
            .expect("click-through");

        let spawned: Spawned = Arc::default();
        let spawn_context = context.clone();
        let spawn_registry = Arc::clone(&spawned);
        let spawn_shutdown = shutdown.handle();
        let windows = Arc::new(windows.with_spawner(Box::new(move |id: &SurfaceId, role: SurfaceRole| {
            let bindings = Arc::new(RecordingBindings::default());
            spawn_registry.lock().insert(id.clone(), Arc::clone(&bindings));
            let controller = SurfaceController::new(id.clone(), role, bindings, &spawn_context);
            spawn_surface(controller, spawn_shutdown.clone())
        })));

        let store = Store::new(
            &config,
            state.clone(),
            bus.clone(),
            windows.clone(),
            PreferencesFile::new(dir.path().join("prefs.json")),
            shutdown.handle(),
        )
        .with_catalog(CrosshairCatalog::new(
            Some(builtin),
            dir.path().join("custom"),
        ));
        let server = tokio::spawn(server.run(store, shutdown.handle()));

        Self {
            dir,
            config,
            bus,
            state,
            windows,
            client,
            notices,
            shutdown,
            context,
            spawned,
            server,
        }
    }

    pub fn context(&self) -> &SurfaceContext {
        &self.context
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.dir.path().join("prefs.json")
    }

    /// A controller driven directly by the test, subscribed but not hydrated.
    pub fn controller(
        &self,
        id: SurfaceId,
        role: SurfaceRole,
    ) -> (SurfaceController, Arc<RecordingBindings>) {
        let bindings = Arc::new(RecordingBindings::default());
        let controller = SurfaceController::new(id, role, bindings.clone(), &self.context);
        (controller, bindings)
    }

    pub async fn hydrated(
        &self,
        id: SurfaceId,
        role: SurfaceRole,
    ) -> (SurfaceController, Arc<RecordingBindings>) {
        let (mut controller, bindings) = self.controller(id, role);
        controller.hydrate().await.expect("hydrate");
        (controller, bindings)
    }

    /// Bindings of a surface the window owner spawned.
    pub fn spawned(&self, id: &SurfaceId) -> Option<Arc<RecordingBindings>> {
        self.spawned.lock().get(id).cloned()
    }

    pub async fn stop(self) {
        self.windows.close_all();
        self.shutdown.signal();
        let _ = self.server.await;
    }
}

/// Short timings so lock tests do not sleep for long.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.lock.ack_ms = 30;
    config.lock.unlock_wait_ms = 300;
    config
}

/// Flush each controller's queue, then let each reconcile what the store
/// broadcast in the meantime.
pub async fn quiesce(controllers: &mut [&mut SurfaceController]) {
    for controller in controllers.iter() {
        controller.flush().await;
    }
    for controller in controllers.iter_mut() {
        controller.pump_pending().await;
    }
}

/// Poll `check` until it holds or a second passes.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
