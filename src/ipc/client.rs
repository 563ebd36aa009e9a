use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::prefs::{FieldUpdate, HexColor, PrefField, Preferences, Reticle};
use crate::store::ExternalAction;
use crate::window::SurfaceId;

use super::types::{IpcError, StoreCommand, StoreResult};

/// Request/response handle to the preference store.
///
/// Cheap to clone; every surface holds its own. Each request waits for its
/// answer at most `timeout`.
#[derive(Clone)]
pub struct CommandClient {
    sender: mpsc::Sender<StoreCommand>,
    timeout: Duration,
}

impl CommandClient {
    pub fn new(sender: mpsc::Sender<StoreCommand>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> StoreCommand,
    ) -> Result<T, IpcError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(command(respond_to))
            .await
            .map_err(|_| IpcError::Disconnected)?;

        recv_with_timeout(receiver, self.timeout).await
    }

    async fn fallible<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<StoreResult<T>>) -> StoreCommand,
    ) -> Result<T, IpcError> {
        Ok(self.request(command).await??)
    }

    // Reads

    pub async fn get(&self, field: PrefField) -> Result<FieldUpdate, IpcError> {
        self.request(|respond_to| StoreCommand::Get { field, respond_to })
            .await
    }

    pub async fn get_crosshair(&self) -> Result<String, IpcError> {
        match self.get(PrefField::Crosshair).await? {
            FieldUpdate::Crosshair(value) => Ok(value),
            other => Err(unexpected(PrefField::Crosshair, other)),
        }
    }

    pub async fn get_size(&self) -> Result<u32, IpcError> {
        match self.get(PrefField::Size).await? {
            FieldUpdate::Size(value) => Ok(value),
            other => Err(unexpected(PrefField::Size, other)),
        }
    }

    pub async fn get_opacity(&self) -> Result<f64, IpcError> {
        match self.get(PrefField::Opacity).await? {
            FieldUpdate::Opacity(value) => Ok(value),
            other => Err(unexpected(PrefField::Opacity, other)),
        }
    }

    pub async fn get_color(&self) -> Result<HexColor, IpcError> {
        match self.get(PrefField::Color).await? {
            FieldUpdate::Color(value) => Ok(value),
            other => Err(unexpected(PrefField::Color, other)),
        }
    }

    pub async fn get_reticle(&self) -> Result<Reticle, IpcError> {
        match self.get(PrefField::Reticle).await? {
            FieldUpdate::Reticle(value) => Ok(value),
            other => Err(unexpected(PrefField::Reticle, other)),
        }
    }

    pub async fn is_locked(&self) -> Result<bool, IpcError> {
        match self.get(PrefField::Locked).await? {
            FieldUpdate::Locked(value) => Ok(value),
            other => Err(unexpected(PrefField::Locked, other)),
        }
    }

    pub async fn is_visible(&self) -> Result<bool, IpcError> {
        match self.get(PrefField::Visible).await? {
            FieldUpdate::Visible(value) => Ok(value),
            other => Err(unexpected(PrefField::Visible, other)),
        }
    }

    pub async fn get_follow_mouse(&self) -> Result<bool, IpcError> {
        match self.get(PrefField::FollowMouse).await? {
            FieldUpdate::FollowMouse(value) => Ok(value),
            other => Err(unexpected(PrefField::FollowMouse, other)),
        }
    }

    pub async fn get_hide_on_ads(&self) -> Result<bool, IpcError> {
        match self.get(PrefField::HideOnAds).await? {
            FieldUpdate::HideOnAds(value) => Ok(value),
            other => Err(unexpected(PrefField::HideOnAds, other)),
        }
    }

    pub async fn get_preferences(&self) -> Result<Preferences, IpcError> {
        self.request(|respond_to| StoreCommand::GetPreferences { respond_to })
            .await
    }

    pub async fn get_crosshair_list(&self) -> Result<Vec<String>, IpcError> {
        self.request(|respond_to| StoreCommand::GetCrosshairList { respond_to })
            .await
    }

    // Writes

    pub async fn set(&self, update: FieldUpdate) -> Result<(), IpcError> {
        self.fallible(|respond_to| StoreCommand::Set { update, respond_to })
            .await
    }

    pub async fn set_crosshair(&self, crosshair: String) -> Result<(), IpcError> {
        self.set(FieldUpdate::Crosshair(crosshair)).await
    }

    pub async fn set_size(&self, size: u32) -> Result<(), IpcError> {
        self.set(FieldUpdate::Size(size)).await
    }

    pub async fn set_opacity(&self, opacity: f64) -> Result<(), IpcError> {
        self.set(FieldUpdate::Opacity(opacity)).await
    }

    pub async fn set_color(&self, color: HexColor) -> Result<(), IpcError> {
        self.set(FieldUpdate::Color(color)).await
    }

    pub async fn set_reticle(&self, reticle: Reticle) -> Result<(), IpcError> {
        self.set(FieldUpdate::Reticle(reticle)).await
    }

    pub async fn set_follow_mouse(&self, follow: bool) -> Result<(), IpcError> {
        self.set(FieldUpdate::FollowMouse(follow)).await
    }

    pub async fn set_hide_on_ads(&self, hide: bool) -> Result<(), IpcError> {
        self.set(FieldUpdate::HideOnAds(hide)).await
    }

    /// Idempotent lock write. Used to force an unlock.
    pub async fn set_locked(&self, locked: bool) -> Result<(), IpcError> {
        self.set(FieldUpdate::Locked(locked)).await
    }

    pub async fn toggle_lock(&self) -> Result<bool, IpcError> {
        self.request(|respond_to| StoreCommand::ToggleLock { respond_to })
            .await
    }

    pub async fn toggle_visibility(&self) -> Result<bool, IpcError> {
        self.request(|respond_to| StoreCommand::ToggleVisibility { respond_to })
            .await
    }

    pub async fn set_position(&self, x: i32, y: i32) -> Result<(), IpcError> {
        self.request(|respond_to| StoreCommand::SetPosition { x, y, respond_to })
            .await
    }

    /// Commit the current aggregate to disk.
    pub async fn save_preferences(&self) -> Result<(), IpcError> {
        self.fallible(|respond_to| StoreCommand::Save { respond_to })
            .await
    }

    pub async fn reset_preferences(&self) -> Result<(), IpcError> {
        self.request(|respond_to| StoreCommand::Reset { respond_to })
            .await
    }

    // Window lifecycle

    pub async fn window_position(&self, id: SurfaceId) -> Result<(i32, i32), IpcError> {
        self.fallible(|respond_to| StoreCommand::WindowPosition { id, respond_to })
            .await
    }

    pub async fn center_window(&self, id: SurfaceId) -> Result<(i32, i32), IpcError> {
        self.fallible(|respond_to| StoreCommand::CenterWindow { id, respond_to })
            .await
    }

    pub async fn move_to_next_display(&self, id: SurfaceId) -> Result<(i32, i32), IpcError> {
        self.fallible(|respond_to| StoreCommand::MoveToNextDisplay { id, respond_to })
            .await
    }

    pub async fn move_window_by(
        &self,
        id: SurfaceId,
        dx: i32,
        dy: i32,
    ) -> Result<(i32, i32), IpcError> {
        self.fallible(|respond_to| StoreCommand::MoveWindowBy {
            id,
            dx,
            dy,
            respond_to,
        })
        .await
    }

    pub async fn create_shadow_window(&self) -> Result<SurfaceId, IpcError> {
        self.fallible(|respond_to| StoreCommand::CreateShadowWindow { respond_to })
            .await
    }

    pub async fn close_shadow_window(&self, id: SurfaceId) -> Result<(), IpcError> {
        self.fallible(|respond_to| StoreCommand::CloseShadowWindow { id, respond_to })
            .await
    }

    pub async fn close_all_shadow_windows(&self) -> Result<(), IpcError> {
        self.request(|respond_to| StoreCommand::CloseAllShadowWindows { respond_to })
            .await
    }

    /// Open the settings surface, or focus it if already open.
    pub async fn open_settings(&self) -> Result<SurfaceId, IpcError> {
        self.fallible(|respond_to| StoreCommand::OpenSettings { respond_to })
            .await
    }

    pub async fn import_crosshair(&self, path: PathBuf) -> Result<String, IpcError> {
        self.fallible(|respond_to| StoreCommand::ImportCrosshair { path, respond_to })
            .await
    }

    /// Run a tray or hotkey action in the store.
    pub async fn dispatch(&self, action: ExternalAction) -> Result<(), IpcError> {
        self.fallible(|respond_to| StoreCommand::Dispatch { action, respond_to })
            .await
    }
}

fn unexpected(field: PrefField, got: FieldUpdate) -> IpcError {
    IpcError::Rejected(format!(
        "expected {} value, got {}",
        field,
        got.field()
    ))
}

async fn recv_with_timeout<T>(
    receiver: oneshot::Receiver<T>,
    timeout: Duration,
) -> Result<T, IpcError> {
    match tokio::time::timeout(timeout, receiver).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(IpcError::Disconnected),
        Err(_) => Err(IpcError::Timeout),
    }
}
