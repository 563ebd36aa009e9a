use crate::prefs::{FieldUpdate, Preferences};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceIntent {
    /// Result of the per-field read batch.
    Hydrated {
        prefs: Preferences,
        catalog: Vec<String>,
    },
    /// Whole-aggregate replacement: bulk sync or lag recovery.
    Synced { prefs: Preferences },
    /// A field notification from the store.
    FieldChanged(FieldUpdate),
    /// Local optimistic value ahead of the store's answer.
    Optimistic(FieldUpdate),
    CatalogLoaded(Vec<String>),
    LockAckExpired,
}

impl Intent for SurfaceIntent {}
