use crate::catalog::resolve_crosshair;
use crate::prefs::{clamp_size, HexColor, Preferences, Reticle};
use crate::ui::mvi::UiState;

use super::{LockGate, SurfaceRole};

/// Everything one surface knows. A disposable cache of the store's
/// aggregate plus local presentation state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceState {
    pub role: SurfaceRole,
    pub prefs: Preferences,
    pub catalog: Vec<String>,
    pub hydrated: bool,
    pub gate: LockGate,
    /// Transient acknowledgment shown after entering the locked state.
    pub lock_ack: bool,
}

impl UiState for SurfaceState {}

impl SurfaceState {
    pub fn new(role: SurfaceRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    pub fn accepts_drag(&self) -> bool {
        self.role.is_draggable() && self.gate.allows_position_change()
    }

    /// The settings panel stays usable while locked; overlays hide their
    /// configuration affordances.
    pub fn accepts_configuration(&self) -> bool {
        self.role == SurfaceRole::Settings || self.gate.shows_configuration()
    }

    pub fn view(&self) -> SurfaceView {
        SurfaceView {
            crosshair: resolve_crosshair(&self.prefs.crosshair, &self.catalog).to_string(),
            size: clamp_size(self.prefs.size),
            opacity: self.prefs.opacity.clamp(0.0, 1.0),
            color: self.prefs.color.clone(),
            reticle: self.prefs.reticle,
            visible: self.prefs.visible,
            locked: self.gate.is_locked(),
            follow_mouse: self.prefs.follow_mouse,
            hide_on_ads: self.prefs.hide_on_ads,
            draggable: self.accepts_drag(),
            settings_affordance_visible: self.role.is_draggable()
                && self.gate.shows_configuration(),
            lock_ack: self.lock_ack,
        }
    }
}

/// What a surface renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceView {
    /// Catalog-resolved crosshair identifier.
    pub crosshair: String,
    pub size: u32,
    pub opacity: f64,
    pub color: HexColor,
    pub reticle: Reticle,
    pub visible: bool,
    pub locked: bool,
    pub follow_mouse: bool,
    pub hide_on_ads: bool,
    pub draggable: bool,
    pub settings_affordance_visible: bool,
    pub lock_ack: bool,
}
