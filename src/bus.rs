//! Notification bus.
//!
//! A tokio broadcast channel that fans every store notification out to all
//! open surfaces, the originator included. Delivery is ordered per sender,
//! which covers the per-topic ordering surfaces rely on. A receiver that
//! falls more than `capacity` notifications behind observes
//! `RecvError::Lagged` and is expected to re-read the whole aggregate.

use std::fmt;

use tokio::sync::broadcast;

use crate::prefs::{FieldUpdate, PrefField, Preferences};
use crate::window::SurfaceId;

pub use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Named topics. The string forms are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    LockChanged,
    CrosshairChanged,
    OpacityChanged,
    SizeChanged,
    ColorChanged,
    ReticleChanged,
    VisibilityChanged,
    FollowMouseChanged,
    HideOnAdsChanged,
    SyncSettings,
    PlaySound,
    ShowAbout,
    OpenSettings,
    OpenChooser,
    CreateShadow,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::LockChanged => "lock-changed",
            Topic::CrosshairChanged => "crosshair-changed",
            Topic::OpacityChanged => "opacity-changed",
            Topic::SizeChanged => "size-changed",
            Topic::ColorChanged => "color-changed",
            Topic::ReticleChanged => "reticle-changed",
            Topic::VisibilityChanged => "visibility-changed",
            Topic::FollowMouseChanged => "follow-mouse-changed",
            Topic::HideOnAdsChanged => "hide-on-ads-changed",
            Topic::SyncSettings => "sync-settings",
            Topic::PlaySound => "play-sound",
            Topic::ShowAbout => "show-about",
            Topic::OpenSettings => "open-settings",
            Topic::OpenChooser => "open-chooser",
            Topic::CreateShadow => "create-shadow",
        }
    }

    /// The topic that carries changes of `field`.
    pub fn for_field(field: PrefField) -> Topic {
        match field {
            PrefField::Crosshair => Topic::CrosshairChanged,
            PrefField::Size => Topic::SizeChanged,
            PrefField::Opacity => Topic::OpacityChanged,
            PrefField::Color => Topic::ColorChanged,
            PrefField::Reticle => Topic::ReticleChanged,
            PrefField::Locked => Topic::LockChanged,
            PrefField::Visible => Topic::VisibilityChanged,
            PrefField::FollowMouse => Topic::FollowMouseChanged,
            PrefField::HideOnAds => Topic::HideOnAdsChanged,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification and its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// One persisted field changed.
    Field(FieldUpdate),
    /// Full aggregate for a single freshly created surface.
    SyncSettings {
        target: SurfaceId,
        prefs: Preferences,
    },
    PlaySound(String),
    ShowAbout,
    OpenSettings,
    OpenChooser,
    CreateShadow,
}

impl Notification {
    pub fn topic(&self) -> Topic {
        match self {
            Notification::Field(update) => Topic::for_field(update.field()),
            Notification::SyncSettings { .. } => Topic::SyncSettings,
            Notification::PlaySound(_) => Topic::PlaySound,
            Notification::ShowAbout => Topic::ShowAbout,
            Notification::OpenSettings => Topic::OpenSettings,
            Notification::OpenChooser => Topic::OpenChooser,
            Notification::CreateShadow => Topic::CreateShadow,
        }
    }

    /// Whether this is a request only the primary surface acts on.
    pub fn is_ui_signal(&self) -> bool {
        matches!(
            self,
            Notification::PlaySound(_)
                | Notification::ShowAbout
                | Notification::OpenSettings
                | Notification::OpenChooser
                | Notification::CreateShadow
        )
    }
}

pub type BusReceiver = broadcast::Receiver<Notification>;

#[derive(Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> BusReceiver {
        self.sender.subscribe()
    }

    /// Publish to every current subscriber. Returns how many received it.
    pub fn publish(&self, notification: Notification) -> usize {
        let topic = notification.topic();
        match self.sender.send(notification) {
            Ok(receivers) => {
                tracing::debug!(%topic, receivers, "Published notification");
                receivers
            }
            Err(_) => {
                tracing::trace!(%topic, "Notification dropped (no subscribers)");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::Reticle;

    #[test]
    fn field_topics_match_wire_names() {
        let lock = Notification::Field(FieldUpdate::Locked(true));
        assert_eq!(lock.topic().as_str(), "lock-changed");

        let reticle = Notification::Field(FieldUpdate::Reticle(Reticle::Circle));
        assert_eq!(reticle.topic().as_str(), "reticle-changed");

        let visible = Notification::Field(FieldUpdate::Visible(false));
        assert_eq!(visible.topic().as_str(), "visibility-changed");
    }

    #[tokio::test]
    async fn publish_fans_out_to_every_subscriber() {
        let bus = NotificationBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(Notification::Field(FieldUpdate::Size(42))), 2);

        assert_eq!(
            first.recv().await.unwrap(),
            Notification::Field(FieldUpdate::Size(42))
        );
        assert_eq!(
            second.recv().await.unwrap(),
            Notification::Field(FieldUpdate::Size(42))
        );
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = NotificationBus::new(8);
        assert_eq!(bus.publish(Notification::ShowAbout), 0);
    }

    #[tokio::test]
    async fn slow_receiver_observes_lag() {
        let bus = NotificationBus::new(2);
        let mut receiver = bus.subscribe();
        for size in 10..15 {
            bus.publish(Notification::Field(FieldUpdate::Size(size)));
        }
        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(_))));
    }
}
