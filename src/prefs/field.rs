use std::fmt;

use super::{HexColor, Preferences, Reticle};

/// Names of the replicated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefField {
    Crosshair,
    Size,
    Opacity,
    Color,
    Reticle,
    Locked,
    Visible,
    FollowMouse,
    HideOnAds,
}

impl PrefField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefField::Crosshair => "crosshair",
            PrefField::Size => "size",
            PrefField::Opacity => "opacity",
            PrefField::Color => "color",
            PrefField::Reticle => "reticle",
            PrefField::Locked => "locked",
            PrefField::Visible => "visible",
            PrefField::FollowMouse => "follow_mouse",
            PrefField::HideOnAds => "hide_on_ads",
        }
    }

    pub fn all() -> &'static [PrefField] {
        &[
            PrefField::Crosshair,
            PrefField::Size,
            PrefField::Opacity,
            PrefField::Color,
            PrefField::Reticle,
            PrefField::Locked,
            PrefField::Visible,
            PrefField::FollowMouse,
            PrefField::HideOnAds,
        ]
    }
}

impl fmt::Display for PrefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-field change. The unit of replication.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Crosshair(String),
    Size(u32),
    Opacity(f64),
    Color(HexColor),
    Reticle(Reticle),
    Locked(bool),
    Visible(bool),
    FollowMouse(bool),
    HideOnAds(bool),
}

impl FieldUpdate {
    pub fn field(&self) -> PrefField {
        match self {
            FieldUpdate::Crosshair(_) => PrefField::Crosshair,
            FieldUpdate::Size(_) => PrefField::Size,
            FieldUpdate::Opacity(_) => PrefField::Opacity,
            FieldUpdate::Color(_) => PrefField::Color,
            FieldUpdate::Reticle(_) => PrefField::Reticle,
            FieldUpdate::Locked(_) => PrefField::Locked,
            FieldUpdate::Visible(_) => PrefField::Visible,
            FieldUpdate::FollowMouse(_) => PrefField::FollowMouse,
            FieldUpdate::HideOnAds(_) => PrefField::HideOnAds,
        }
    }

    /// Write this value into `prefs`. Returns whether anything changed.
    ///
    /// Touches exactly one field, so applying updates for different fields
    /// commutes.
    pub fn apply_to(&self, prefs: &mut Preferences) -> bool {
        fn replace<T: PartialEq + Clone>(slot: &mut T, value: &T) -> bool {
            if slot == value {
                return false;
            }
            *slot = value.clone();
            true
        }

        match self {
            FieldUpdate::Crosshair(value) => replace(&mut prefs.crosshair, value),
            FieldUpdate::Size(value) => replace(&mut prefs.size, value),
            FieldUpdate::Opacity(value) => replace(&mut prefs.opacity, value),
            FieldUpdate::Color(value) => replace(&mut prefs.color, value),
            FieldUpdate::Reticle(value) => replace(&mut prefs.reticle, value),
            FieldUpdate::Locked(value) => replace(&mut prefs.locked, value),
            FieldUpdate::Visible(value) => replace(&mut prefs.visible, value),
            FieldUpdate::FollowMouse(value) => replace(&mut prefs.follow_mouse, value),
            FieldUpdate::HideOnAds(value) => replace(&mut prefs.hide_on_ads, value),
        }
    }

    /// Read the current value of `field` out of `prefs`.
    pub fn read(field: PrefField, prefs: &Preferences) -> FieldUpdate {
        match field {
            PrefField::Crosshair => FieldUpdate::Crosshair(prefs.crosshair.clone()),
            PrefField::Size => FieldUpdate::Size(prefs.size),
            PrefField::Opacity => FieldUpdate::Opacity(prefs.opacity),
            PrefField::Color => FieldUpdate::Color(prefs.color.clone()),
            PrefField::Reticle => FieldUpdate::Reticle(prefs.reticle),
            PrefField::Locked => FieldUpdate::Locked(prefs.locked),
            PrefField::Visible => FieldUpdate::Visible(prefs.visible),
            PrefField::FollowMouse => FieldUpdate::FollowMouse(prefs.follow_mouse),
            PrefField::HideOnAds => FieldUpdate::HideOnAds(prefs.hide_on_ads),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reports_change_only_when_value_differs() {
        let mut prefs = Preferences::default();
        assert!(FieldUpdate::Size(20).apply_to(&mut prefs));
        assert!(!FieldUpdate::Size(20).apply_to(&mut prefs));
        assert_eq!(prefs.size, 20);
    }

    #[test]
    fn apply_touches_only_its_field() {
        let mut prefs = Preferences::default();
        let before = prefs.clone();
        FieldUpdate::Locked(true).apply_to(&mut prefs);

        assert!(prefs.locked);
        assert_eq!(prefs.size, before.size);
        assert_eq!(prefs.color, before.color);
        assert_eq!(prefs.visible, before.visible);
    }

    #[test]
    fn read_matches_field() {
        let prefs = Preferences::default();
        for field in PrefField::all() {
            assert_eq!(FieldUpdate::read(*field, &prefs).field(), *field);
        }
    }
}
