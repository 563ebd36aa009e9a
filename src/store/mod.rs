//! Reference preference store.
//!
//! Owns the authoritative [`Preferences`], validates writes, broadcasts
//! field changes on the [`NotificationBus`], drives the window owner and
//! commits to the preference file on request. Runs behind
//! [`crate::ipc::StoreServer`], one command at a time.

mod actions;
mod state;

pub use actions::{ActionParseError, ExternalAction};
pub use state::{PreferenceState, RequestRecord};

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::bus::{Notification, NotificationBus};
use crate::catalog::{CatalogError, CrosshairCatalog};
use crate::config::{Config, ShadowConfig};
use crate::prefs::{
    FieldUpdate, PersistError, PrefField, Preferences, PreferencesFile, ValidationError,
};
use crate::shutdown::ShutdownHandle;
use crate::surface::SurfaceRole;
use crate::window::{SurfaceId, WindowError, WindowOwner};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: PrefField, reason: String },

    #[error("Cannot {operation} while locked")]
    Locked { operation: &'static str },

    #[error("Maximum shadow windows reached ({max})")]
    ShadowLimit { max: usize },

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub struct Store {
    state: PreferenceState,
    bus: NotificationBus,
    windows: Arc<dyn WindowOwner>,
    catalog: CrosshairCatalog,
    file: PreferencesFile,
    shadows: ShadowConfig,
    shutdown: ShutdownHandle,
}

impl Store {
    pub fn new(
        config: &Config,
        state: PreferenceState,
        bus: NotificationBus,
        windows: Arc<dyn WindowOwner>,
        file: PreferencesFile,
        shutdown: ShutdownHandle,
    ) -> Self {
        Self {
            state,
            bus,
            windows,
            catalog: CrosshairCatalog::from_config(config),
            file,
            shadows: config.shadows.clone(),
            shutdown,
        }
    }

    pub fn with_catalog(mut self, catalog: CrosshairCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn record(&self, name: &'static str, update: Option<FieldUpdate>) {
        self.state.record(name, update);
    }

    pub fn get(&self, field: PrefField) -> FieldUpdate {
        self.state.read(field)
    }

    pub fn preferences(&self) -> Preferences {
        self.state.snapshot()
    }

    pub fn crosshair_list(&self) -> Vec<String> {
        self.catalog.list()
    }

    /// Validate and apply a field write.
    pub fn set(&mut self, update: FieldUpdate) -> Result<(), StoreError> {
        let update = normalize(update)?;
        self.apply_update(update);
        Ok(())
    }

    pub fn toggle_lock(&mut self) -> bool {
        let locked = !self.state.is_locked();
        self.apply_update(FieldUpdate::Locked(locked));
        locked
    }

    pub fn toggle_visibility(&mut self) -> bool {
        let visible = !self.state.snapshot().visible;
        self.apply_update(FieldUpdate::Visible(visible));
        visible
    }

    /// Remember the primary placement. Not broadcast.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.state.set_position(x, y);
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        self.file.save(&self.state.snapshot())?;
        self.state.record_commit();
        tracing::info!(path = %self.file.path().display(), "Preferences saved");
        Ok(())
    }

    /// Reload defaults and broadcast every field, changed or not.
    pub fn reset(&mut self) {
        let defaults = Preferences::default();
        self.state.replace(defaults.clone());
        for update in defaults.field_updates() {
            self.apply_window_effects(&update);
            self.bus.publish(Notification::Field(update));
        }
        tracing::info!("Preferences reset to defaults");
    }

    pub fn window_position(&self, id: &SurfaceId) -> Result<(i32, i32), StoreError> {
        Ok(self.windows.position(id)?)
    }

    pub fn center_window(&mut self, id: &SurfaceId) -> Result<(i32, i32), StoreError> {
        Ok(self.windows.center(id)?)
    }

    pub fn move_to_next_display(&mut self, id: &SurfaceId) -> Result<(i32, i32), StoreError> {
        Ok(self.windows.move_to_next_display(id)?)
    }

    pub fn move_window_by(
        &mut self,
        id: &SurfaceId,
        dx: i32,
        dy: i32,
    ) -> Result<(i32, i32), StoreError> {
        if self.state.is_locked() {
            return Err(StoreError::Locked {
                operation: "move window",
            });
        }
        Ok(self.windows.move_by(id, dx, dy)?)
    }

    /// Open a shadow offset from the primary and send it the live aggregate.
    pub fn create_shadow_window(&mut self) -> Result<SurfaceId, StoreError> {
        if self.state.is_locked() {
            return Err(StoreError::Locked {
                operation: "create shadow window",
            });
        }

        let count = self.state.shadow_count();
        if count >= self.shadows.max {
            return Err(StoreError::ShadowLimit {
                max: self.shadows.max,
            });
        }

        let (x, y) = self.windows.position(&SurfaceId::main())?;
        let offset = (count as i32 + 1) * self.shadows.offset_px;
        let id = self.state.next_shadow_id();

        self.windows
            .open(&id, SurfaceRole::Shadow, Some((x + offset, y + offset)))?;
        self.state.add_shadow(id.clone());

        self.bus.publish(Notification::SyncSettings {
            target: id.clone(),
            prefs: self.state.snapshot(),
        });
        tracing::info!(surface = %id, "Created shadow window");
        Ok(id)
    }

    pub fn close_shadow_window(&mut self, id: &SurfaceId) -> Result<(), StoreError> {
        self.state.remove_shadow(id);
        self.windows.close(id)?;
        Ok(())
    }

    pub fn close_all_shadow_windows(&mut self) {
        for id in self.state.take_shadows() {
            if let Err(e) = self.windows.close(&id) {
                tracing::warn!(surface = %id, error = %e, "Failed to close shadow window");
            }
        }
    }

    pub fn open_settings(&mut self) -> Result<SurfaceId, StoreError> {
        let id = SurfaceId::settings();
        if !self.windows.contains(&id) {
            self.windows.open(&id, SurfaceRole::Settings, None)?;
        }
        self.windows.focus(&id)?;
        Ok(id)
    }

    pub fn import_crosshair(&mut self, path: &Path) -> Result<String, StoreError> {
        Ok(self.catalog.import(path)?)
    }

    /// Apply a write and broadcast it if anything changed.
    fn apply_update(&mut self, update: FieldUpdate) {
        if !self.state.apply(&update) {
            tracing::debug!(field = %update.field(), "Write is a no-op");
            return;
        }
        self.apply_window_effects(&update);
        self.bus.publish(Notification::Field(update));
    }

    /// Lock and visibility apply to every overlay window.
    fn apply_window_effects(&self, update: &FieldUpdate) {
        if !matches!(update, FieldUpdate::Locked(_) | FieldUpdate::Visible(_)) {
            return;
        }

        let overlays = self
            .windows
            .surfaces()
            .into_iter()
            .filter(|id| *id != SurfaceId::settings());

        for id in overlays {
            let result = match update {
                FieldUpdate::Locked(locked) => self.windows.set_click_through(&id, *locked),
                FieldUpdate::Visible(visible) => self.windows.set_visible(&id, *visible),
                _ => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(surface = %id, error = %e, "Failed to update window");
            }
        }
    }
}

/// Clamp or reject values the store will not hold.
fn normalize(update: FieldUpdate) -> Result<FieldUpdate, StoreError> {
    match update {
        FieldUpdate::Crosshair(crosshair) if crosshair.trim().is_empty() => {
            Err(ValidationError::EmptyCrosshair.into())
        }
        FieldUpdate::Size(0) => Err(StoreError::InvalidValue {
            field: PrefField::Size,
            reason: "must be positive".to_string(),
        }),
        FieldUpdate::Opacity(opacity) if !opacity.is_finite() => Err(StoreError::InvalidValue {
            field: PrefField::Opacity,
            reason: format!("{opacity} is not a number"),
        }),
        FieldUpdate::Opacity(opacity) => Ok(FieldUpdate::Opacity(opacity.clamp(0.0, 1.0))),
        other => Ok(other),
    }
}
