mod common;

use common::{quiesce, test_config, Harness};
use crossover::prefs::{HexColor, Preferences, Reticle};
use crossover::surface::SurfaceRole;
use crossover::window::SurfaceId;

fn customized() -> Preferences {
    Preferences {
        size: 300,
        opacity: 0.4,
        color: HexColor::parse("#abcdef").unwrap(),
        reticle: Reticle::Dot,
        hide_on_ads: true,
        ..Preferences::default()
    }
}

#[tokio::test]
async fn reset_rehydrates_initiator_and_converges_others() {
    let harness = Harness::new(customized());
    let (mut settings, _settings_bindings) = harness
        .hydrated(SurfaceId::settings(), SurfaceRole::Settings)
        .await;
    let (mut primary, _bindings) = harness
        .hydrated(SurfaceId::main(), SurfaceRole::Primary)
        .await;

    settings.reset().await.unwrap();
    quiesce(&mut [&mut settings, &mut primary]).await;

    let defaults = Preferences::default();
    assert_eq!(harness.state.snapshot(), defaults);
    assert_eq!(settings.preferences(), &defaults);
    assert_eq!(primary.preferences(), &defaults);

    assert_eq!(harness.state.request_count("reset_preferences"), 1);
    // Initial hydration of both surfaces plus the post-reset read.
    assert_eq!(harness.state.request_count("get_reticle"), 3);
    harness.stop().await;
}

#[tokio::test]
async fn lagging_surface_resyncs_from_the_aggregate() {
    let mut config = test_config();
    config.bus.capacity = 2;
    let harness = Harness::with_config(Preferences::default(), config);
    let (mut primary, _bindings) = harness
        .hydrated(SurfaceId::main(), SurfaceRole::Primary)
        .await;

    for size in 11..=30 {
        harness.client.set_size(size).await.unwrap();
    }
    harness.client.set_follow_mouse(true).await.unwrap();

    primary.pump_pending().await;

    assert_eq!(harness.state.request_count("get_preferences"), 1);
    assert_eq!(primary.preferences(), &harness.state.snapshot());
    assert_eq!(primary.view().size, 30);
    assert!(primary.view().follow_mouse);
    harness.stop().await;
}
