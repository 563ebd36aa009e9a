mod common;

use common::eventually;
use crossover::config::Config;
use crossover::prefs::{Preferences, PreferencesFile};
use crossover::session::Session;
use crossover::store::ExternalAction;
use crossover::surface::{SurfaceEvent, SurfaceRole};
use crossover::window::{SurfaceId, WindowOwner};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    let mut config = common::test_config();
    config.catalog.custom_dir = Some(dir.path().join("custom"));
    config
}

#[tokio::test]
async fn session_runs_surfaces_end_to_end() {
    let dir = TempDir::new().unwrap();
    let file = PreferencesFile::new(dir.path().join("prefs.json"));
    let session = Session::start(&config_in(&dir), file.clone()).unwrap();
    let primary = session.primary().unwrap();

    primary.send(SurfaceEvent::SizeInput(150)).await.unwrap();
    primary.send(SurfaceEvent::SliderRelease).await.unwrap();
    primary.send(SurfaceEvent::Duplicate).await.unwrap();
    session.settle().await;

    let shadow = SurfaceId::shadow(1);
    let shadow_handle = session.surface(&shadow).expect("shadow running");
    let shadow_state = shadow_handle.snapshot().await.unwrap();
    let primary_state = primary.snapshot().await.unwrap();
    assert_eq!(shadow_state.role, SurfaceRole::Shadow);
    assert_eq!(shadow_state.view(), primary_state.view());
    assert_eq!(primary_state.prefs.size, 150);

    session.dispatch(ExternalAction::ToggleLock).await.unwrap();
    session.settle().await;
    let main_bindings = session.bindings(&SurfaceId::main()).unwrap();
    assert!(eventually(|| {
        let bindings = main_bindings.clone();
        async move { bindings.record().sounds == vec!["lock".to_string()] }
    })
    .await);
    assert!(session.windows().record(&shadow).unwrap().click_through);

    let summary = session.summary();
    assert_eq!(summary.surfaces.len(), 2);
    assert!(summary.prefs.locked);
    assert!(summary.to_string().contains("locked:       true"));

    session.shutdown().await.unwrap();
    let saved = file.load().unwrap().expect("committed on shutdown");
    assert!(saved.locked);
    assert_eq!(saved.size, 150);
}

#[tokio::test]
async fn session_restores_position_and_lock() {
    let dir = TempDir::new().unwrap();
    let file = PreferencesFile::new(dir.path().join("prefs.json"));
    file.save(&Preferences {
        locked: true,
        position_x: Some(300),
        position_y: Some(200),
        ..Preferences::default()
    })
    .unwrap();

    let session = Session::start(&config_in(&dir), file).unwrap();
    let record = session.windows().record(&SurfaceId::main()).unwrap();
    assert_eq!(record.position, (300, 200));
    assert!(record.click_through);

    session.settle().await;
    let state = session.primary().unwrap().snapshot().await.unwrap();
    assert!(state.hydrated);
    assert!(state.gate.is_locked());
    assert!(!state.lock_ack);
    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn quit_skips_the_second_commit() {
    let dir = TempDir::new().unwrap();
    let file = PreferencesFile::new(dir.path().join("prefs.json"));
    let session = Session::start(&config_in(&dir), file).unwrap();

    session.dispatch(ExternalAction::Quit).await.unwrap();
    assert!(session.shutdown_handle().is_shutting_down());
    let state = session.state().clone();

    session.shutdown().await.unwrap();
    assert_eq!(state.commit_count(), 1);
}

#[tokio::test]
async fn closing_a_window_stops_its_surface() {
    let dir = TempDir::new().unwrap();
    let file = PreferencesFile::new(dir.path().join("prefs.json"));
    let session = Session::start(&config_in(&dir), file).unwrap();

    let shadow = session.client().create_shadow_window().await.unwrap();
    let handle = session.surface(&shadow).unwrap();
    session.client().close_shadow_window(shadow.clone()).await.unwrap();

    assert!(!session.windows().contains(&shadow));
    assert!(eventually(|| {
        let handle = handle.clone();
        async move { handle.is_closed() }
    })
    .await);
    session.shutdown().await.unwrap();
}
