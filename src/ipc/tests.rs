use super::*;
use crate::bus::{Notification, NotificationBus};
use crate::catalog::CrosshairCatalog;
use crate::config::Config;
use crate::prefs::{FieldUpdate, HexColor, Preferences, PreferencesFile, Reticle};
use crate::shutdown::ShutdownCoordinator;
use crate::store::{PreferenceState, Store};
use crate::surface::SurfaceRole;
use crate::window::{HeadlessWindows, SurfaceId, WindowOwner};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Running {
    client: CommandClient,
    state: PreferenceState,
    bus: NotificationBus,
    shutdown: ShutdownCoordinator,
    server_task: tokio::task::JoinHandle<()>,
    _dir: TempDir,
}

fn start(prefs: Preferences) -> Running {
    let dir = TempDir::new().expect("tempdir");
    let config = Config::default();
    let bus = NotificationBus::new(32);
    let state = PreferenceState::new(prefs);
    let windows = Arc::new(HeadlessWindows::single_display());
    windows
        .open(&SurfaceId::main(), SurfaceRole::Primary, None)
        .expect("main window");
    let shutdown = ShutdownCoordinator::new();
    let store = Store::new(
        &config,
        state.clone(),
        bus.clone(),
        windows,
        PreferencesFile::new(dir.path().join("prefs.json")),
        shutdown.handle(),
    )
    .with_catalog(CrosshairCatalog::new(None, dir.path().join("custom")));

    let (client, server) = IpcLayer::new(&config.ipc);
    let server_task = tokio::spawn(server.run(store, shutdown.handle()));
    Running {
        client,
        state,
        bus,
        shutdown,
        server_task,
        _dir: dir,
    }
}

#[tokio::test]
async fn ipc_reads_writes_and_broadcasts() {
    let running = start(Preferences::default());
    let mut rx = running.bus.subscribe();
    let client = &running.client;

    assert_eq!(client.get_size().await.expect("size"), 100);
    assert_eq!(client.get_reticle().await.expect("reticle"), Reticle::Dot);

    let red = HexColor::parse("#ff0000").expect("color");
    client.set_color(red.clone()).await.expect("set color");
    assert_eq!(client.get_color().await.expect("color"), red);

    match rx.recv().await.expect("notification") {
        Notification::Field(FieldUpdate::Color(color)) => assert_eq!(color, red),
        other => panic!("unexpected notification: {other:?}"),
    }

    assert_eq!(running.state.request_count("get_size"), 1);
    assert_eq!(running.state.request_count("set_color"), 1);

    drop(running.client);
    let _ = running.server_task.await;
}

#[tokio::test]
async fn ipc_rejected_write_surfaces_store_error() {
    let running = start(Preferences::default());

    let result = running.client.set_size(0).await;
    assert!(matches!(result, Err(IpcError::Rejected(_))));
    assert_eq!(running.client.get_size().await.expect("size"), 100);

    running.shutdown.signal();
    let _ = running.server_task.await;
}

#[tokio::test]
async fn ipc_server_stops_on_shutdown() {
    let running = start(Preferences::default());
    running.shutdown.signal();
    tokio::time::timeout(Duration::from_secs(1), running.server_task)
        .await
        .expect("server did not stop")
        .expect("server panicked");

    let result = running.client.is_locked().await;
    assert!(matches!(result, Err(IpcError::Disconnected)));
}

#[tokio::test]
async fn ipc_disconnect_returns_error() {
    let (client, server) = IpcLayer::new(&Config::default().ipc);
    drop(server);
    let result = client.get_preferences().await;
    assert!(matches!(result, Err(IpcError::Disconnected)));
}

#[tokio::test]
async fn ipc_timeout_returns_error() {
    let mut config = Config::default().ipc;
    config.timeout_ms = 50;
    let (client, mut server) = IpcLayer::new(&config);

    // Receives but never answers.
    let server_task = tokio::spawn(async move {
        if let Some(_command) = server.receiver.recv().await {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
    });

    let result = client.get_preferences().await;
    assert!(matches!(result, Err(IpcError::Timeout)));

    server_task.abort();
}
