mod common;

use common::{quiesce, Harness};
use crossover::prefs::{Preferences, PreferencesFile};
use crossover::surface::SurfaceRole;
use crossover::window::SurfaceId;

#[tokio::test]
async fn writes_persist_only_on_commit() {
    let harness = Harness::new(Preferences::default());
    let file = PreferencesFile::new(harness.prefs_path());

    harness.client.set_size(42).await.unwrap();
    harness.client.set_follow_mouse(true).await.unwrap();
    assert!(file.load().unwrap().is_none());

    harness.client.save_preferences().await.unwrap();
    let saved = file.load().unwrap().expect("committed");
    assert_eq!(saved.size, 42);
    assert!(saved.follow_mouse);
    harness.stop().await;
}

#[tokio::test]
async fn visibility_toggle_is_optimistic_and_committed() {
    let harness = Harness::new(Preferences::default());
    let (mut primary, bindings) = harness
        .hydrated(SurfaceId::main(), SurfaceRole::Primary)
        .await;

    primary.toggle_visibility();
    assert!(!bindings.last_view().unwrap().visible, "rendered before the store answered");

    quiesce(&mut [&mut primary]).await;
    assert!(!harness.state.snapshot().visible);
    assert!(!harness.windows.record(&SurfaceId::main()).unwrap().visible);

    let saved = PreferencesFile::new(harness.prefs_path())
        .load()
        .unwrap()
        .expect("committed");
    assert!(!saved.visible);
    harness.stop().await;
}

#[tokio::test]
async fn malformed_file_starts_from_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, r##"{"size": 42, "color": "green"}"##).unwrap();

    let prefs = PreferencesFile::new(path).load_or_default();
    assert_eq!(prefs, Preferences::default());
}
