use std::path::PathBuf;

use tokio::sync::oneshot;

use crate::prefs::{FieldUpdate, PrefField, Preferences};
use crate::store::{ExternalAction, StoreError};
use crate::window::SurfaceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcError {
    Disconnected,
    Timeout,
    /// The store answered but refused the request.
    Rejected(String),
}

impl std::fmt::Display for IpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpcError::Disconnected => write!(f, "IPC channel disconnected"),
            IpcError::Timeout => write!(f, "IPC request timed out"),
            IpcError::Rejected(reason) => write!(f, "Request rejected: {}", reason),
        }
    }
}

impl std::error::Error for IpcError {}

impl From<StoreError> for IpcError {
    fn from(error: StoreError) -> Self {
        IpcError::Rejected(error.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub enum StoreCommand {
    Get {
        field: PrefField,
        respond_to: oneshot::Sender<FieldUpdate>,
    },
    GetPreferences {
        respond_to: oneshot::Sender<Preferences>,
    },
    GetCrosshairList {
        respond_to: oneshot::Sender<Vec<String>>,
    },
    Set {
        update: FieldUpdate,
        respond_to: oneshot::Sender<StoreResult<()>>,
    },
    ToggleLock {
        respond_to: oneshot::Sender<bool>,
    },
    ToggleVisibility {
        respond_to: oneshot::Sender<bool>,
    },
    SetPosition {
        x: i32,
        y: i32,
        respond_to: oneshot::Sender<()>,
    },
    Save {
        respond_to: oneshot::Sender<StoreResult<()>>,
    },
    Reset {
        respond_to: oneshot::Sender<()>,
    },
    WindowPosition {
        id: SurfaceId,
        respond_to: oneshot::Sender<StoreResult<(i32, i32)>>,
    },
    CenterWindow {
        id: SurfaceId,
        respond_to: oneshot::Sender<StoreResult<(i32, i32)>>,
    },
    MoveToNextDisplay {
        id: SurfaceId,
        respond_to: oneshot::Sender<StoreResult<(i32, i32)>>,
    },
    MoveWindowBy {
        id: SurfaceId,
        dx: i32,
        dy: i32,
        respond_to: oneshot::Sender<StoreResult<(i32, i32)>>,
    },
    CreateShadowWindow {
        respond_to: oneshot::Sender<StoreResult<SurfaceId>>,
    },
    CloseShadowWindow {
        id: SurfaceId,
        respond_to: oneshot::Sender<StoreResult<()>>,
    },
    CloseAllShadowWindows {
        respond_to: oneshot::Sender<()>,
    },
    OpenSettings {
        respond_to: oneshot::Sender<StoreResult<SurfaceId>>,
    },
    ImportCrosshair {
        path: PathBuf,
        respond_to: oneshot::Sender<StoreResult<String>>,
    },
    Dispatch {
        action: ExternalAction,
        respond_to: oneshot::Sender<StoreResult<()>>,
    },
}

impl StoreCommand {
    /// Operation name as recorded in the store's request log.
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::Get { field, .. } => match field {
                PrefField::Crosshair => "get_crosshair",
                PrefField::Size => "get_size",
                PrefField::Opacity => "get_opacity",
                PrefField::Color => "get_color",
                PrefField::Reticle => "get_reticle",
                PrefField::Locked => "is_locked",
                PrefField::Visible => "is_visible",
                PrefField::FollowMouse => "get_follow_mouse",
                PrefField::HideOnAds => "get_hide_on_ads",
            },
            StoreCommand::GetPreferences { .. } => "get_preferences",
            StoreCommand::GetCrosshairList { .. } => "get_crosshair_list",
            StoreCommand::Set { update, .. } => match update.field() {
                PrefField::Crosshair => "set_crosshair",
                PrefField::Size => "set_size",
                PrefField::Opacity => "set_opacity",
                PrefField::Color => "set_color",
                PrefField::Reticle => "set_reticle",
                PrefField::Locked => "set_locked",
                PrefField::Visible => "set_visible",
                PrefField::FollowMouse => "set_follow_mouse",
                PrefField::HideOnAds => "set_hide_on_ads",
            },
            StoreCommand::ToggleLock { .. } => "toggle_lock",
            StoreCommand::ToggleVisibility { .. } => "toggle_visibility",
            StoreCommand::SetPosition { .. } => "set_position",
            StoreCommand::Save { .. } => "save_preferences",
            StoreCommand::Reset { .. } => "reset_preferences",
            StoreCommand::WindowPosition { .. } => "window_position",
            StoreCommand::CenterWindow { .. } => "center_window",
            StoreCommand::MoveToNextDisplay { .. } => "move_to_next_display",
            StoreCommand::MoveWindowBy { .. } => "move_window_by",
            StoreCommand::CreateShadowWindow { .. } => "create_shadow_window",
            StoreCommand::CloseShadowWindow { .. } => "close_shadow_window",
            StoreCommand::CloseAllShadowWindows { .. } => "close_all_shadow_windows",
            StoreCommand::OpenSettings { .. } => "open_settings",
            StoreCommand::ImportCrosshair { .. } => "import_crosshair",
            StoreCommand::Dispatch { .. } => "dispatch",
        }
    }

    /// The field value carried by a write, for the request log.
    pub fn update(&self) -> Option<FieldUpdate> {
        match self {
            StoreCommand::Set { update, .. } => Some(update.clone()),
            _ => None,
        }
    }
}
