//! The replicated preference aggregate.
//!
//! Everything a surface renders is derived from [`Preferences`]. The store
//! owns the authoritative copy; surfaces hold disposable caches that are
//! updated one [`FieldUpdate`] at a time.

mod color;
mod field;
mod model;
mod persist;
mod reticle;

pub use color::HexColor;
pub use field::{FieldUpdate, PrefField};
pub use model::{
    clamp_size, opacity_from_percent, opacity_to_percent, Preferences, DEFAULT_COLOR,
    DEFAULT_CROSSHAIR, DEFAULT_OPACITY, DEFAULT_SIZE, FALLBACK_CROSSHAIR, MAX_SIZE, MIN_SIZE,
};
pub use persist::{PersistError, PreferencesFile};
pub use reticle::Reticle;

use thiserror::Error;

/// Input rejected locally, before any request reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid color '{value}': expected #RRGGBB")]
    Color { value: String },

    #[error("Unknown reticle '{value}'")]
    Reticle { value: String },

    #[error("Crosshair identifier must not be empty")]
    EmptyCrosshair,
}
