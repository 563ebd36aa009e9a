use serde::{Deserialize, Serialize};

use super::{FieldUpdate, HexColor, Reticle};

/// Crosshair selected on first start and after a reset.
pub const DEFAULT_CROSSHAIR: &str = "target-dot.png";

/// Substituted at render time when the selected crosshair is not in the catalog.
pub const FALLBACK_CROSSHAIR: &str = "crosshair-default.png";

pub const DEFAULT_SIZE: u32 = 100;
pub const MIN_SIZE: u32 = 10;
pub const MAX_SIZE: u32 = 500;

pub const DEFAULT_OPACITY: f64 = 1.0;

pub const DEFAULT_COLOR: &str = "#00FF00";

/// The full set of replicated preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Catalog identifier (file name) of the crosshair image.
    pub crosshair: String,
    /// Crosshair size in pixels.
    pub size: u32,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    pub color: HexColor,
    /// Suppresses drag and configuration on every surface.
    pub locked: bool,
    pub visible: bool,
    pub follow_mouse: bool,
    /// Hide while aiming down sights.
    pub hide_on_ads: bool,
    pub reticle: Reticle,
    pub position_x: Option<i32>,
    pub position_y: Option<i32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            crosshair: DEFAULT_CROSSHAIR.to_string(),
            size: DEFAULT_SIZE,
            opacity: DEFAULT_OPACITY,
            color: HexColor::default(),
            locked: false,
            visible: true,
            follow_mouse: false,
            hide_on_ads: false,
            reticle: Reticle::default(),
            position_x: None,
            position_y: None,
        }
    }
}

impl Preferences {
    /// Every replicated field as an update, in broadcast order.
    ///
    /// Used when the whole aggregate changes at once (reset) and passive
    /// surfaces must converge through field-level notifications.
    pub fn field_updates(&self) -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::Crosshair(self.crosshair.clone()),
            FieldUpdate::Opacity(self.opacity),
            FieldUpdate::Size(self.size),
            FieldUpdate::Color(self.color.clone()),
            FieldUpdate::Reticle(self.reticle),
            FieldUpdate::FollowMouse(self.follow_mouse),
            FieldUpdate::HideOnAds(self.hide_on_ads),
            FieldUpdate::Visible(self.visible),
            FieldUpdate::Locked(self.locked),
        ]
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position_x.zip(self.position_y)
    }
}

/// Clamp a requested size into the slider range.
pub fn clamp_size(size: u32) -> u32 {
    size.clamp(MIN_SIZE, MAX_SIZE)
}

/// Slider percent (0..=100) to opacity. Out-of-range percents saturate.
pub fn opacity_from_percent(percent: u8) -> f64 {
    f64::from(percent.min(100)) / 100.0
}

pub fn opacity_to_percent(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_start() {
        let prefs = Preferences::default();
        assert_eq!(prefs.crosshair, "target-dot.png");
        assert_eq!(prefs.size, 100);
        assert_eq!(prefs.opacity, 1.0);
        assert_eq!(prefs.color.as_str(), "#00FF00");
        assert!(!prefs.locked);
        assert!(prefs.visible);
        assert_eq!(prefs.reticle, Reticle::Dot);
        assert_eq!(prefs.position(), None);
    }

    #[test]
    fn opacity_percent_conversion() {
        assert_eq!(opacity_from_percent(80), 0.8);
        assert_eq!(opacity_from_percent(250), 1.0);
        assert_eq!(opacity_to_percent(0.8), 80);
        assert_eq!(opacity_to_percent(1.7), 100);
    }

    #[test]
    fn size_is_clamped_to_slider_range() {
        assert_eq!(clamp_size(0), MIN_SIZE);
        assert_eq!(clamp_size(20), 20);
        assert_eq!(clamp_size(9000), MAX_SIZE);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let prefs: Preferences =
            serde_json::from_str(r##"{"size": 42, "color": "#123456"}"##).unwrap();
        assert_eq!(prefs.size, 42);
        assert_eq!(prefs.color.as_str(), "#123456");
        assert_eq!(prefs.crosshair, DEFAULT_CROSSHAIR);
    }

    #[test]
    fn field_updates_cover_every_replicated_field() {
        let updates = Preferences::default().field_updates();
        assert_eq!(updates.len(), super::super::PrefField::all().len());
    }
}
