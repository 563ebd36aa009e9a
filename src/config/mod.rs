//! Application configuration.
//!
//! Tunables for the sync protocol (timeouts, channel sizes, lock timing)
//! and the locations of the crosshair catalog and the preference file.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    BusConfig, CatalogConfig, Config, IpcConfig, LockConfig, PreferencesConfig, ShadowConfig,
};
