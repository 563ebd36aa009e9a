use thiserror::Error;

use crate::ipc::IpcError;
use crate::prefs::ValidationError;

use super::SurfaceRole;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ipc(#[from] IpcError),

    #[error("Cannot {action} while locked")]
    Locked { action: &'static str },

    #[error("A {role} surface cannot {action}")]
    Unsupported {
        role: SurfaceRole,
        action: &'static str,
    },

    #[error("Unlock was not observed in time (store reports locked: {still_locked})")]
    UnlockTimeout { still_locked: bool },

    #[error("Surface is closed")]
    Closed,
}
