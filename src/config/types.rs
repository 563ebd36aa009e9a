use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ipc: IpcConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub shadows: ShadowConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Command channel between surfaces and the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcConfig {
    /// How long a surface waits for the store to answer (default: 1000).
    #[serde(default = "default_ipc_timeout_ms")]
    pub timeout_ms: u64,
    /// Pending commands before senders wait (default: 16).
    #[serde(default = "default_ipc_buffer")]
    pub buffer: usize,
}

/// Broadcast channel carrying notifications to every surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Notifications retained per slow receiver before it lags (default: 64).
    #[serde(default = "default_bus_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Duration of the lock acknowledgment flash (default: 1000).
    #[serde(default = "default_ack_ms")]
    pub ack_ms: u64,
    /// Upper bound on waiting for a forced unlock to be observed (default: 2000).
    #[serde(default = "default_unlock_wait_ms")]
    pub unlock_wait_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Maximum number of duplicate overlays (default: 14).
    #[serde(default = "default_max_shadows")]
    pub max: usize,
    /// Cascade offset between duplicates in pixels (default: 20).
    #[serde(default = "default_shadow_offset")]
    pub offset_px: i32,
}

/// Where crosshair images are looked up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Bundled crosshairs. Unset means no bundled directory.
    #[serde(default)]
    pub builtin_dir: Option<PathBuf>,
    /// User-imported crosshairs. Unset means `<data dir>/crossover/crosshairs`.
    #[serde(default)]
    pub custom_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Preference file. Unset means `<data dir>/crossover/crossover-settings.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_ipc_timeout_ms() -> u64 {
    1000
}

fn default_ipc_buffer() -> usize {
    16
}

fn default_bus_capacity() -> usize {
    64
}

fn default_ack_ms() -> u64 {
    1000
}

fn default_unlock_wait_ms() -> u64 {
    2000
}

fn default_max_shadows() -> usize {
    14
}

fn default_shadow_offset() -> i32 {
    20
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_ipc_timeout_ms(),
            buffer: default_ipc_buffer(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: default_bus_capacity(),
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ack_ms: default_ack_ms(),
            unlock_wait_ms: default_unlock_wait_ms(),
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            max: default_max_shadows(),
            offset_px: default_shadow_offset(),
        }
    }
}

impl IpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LockConfig {
    pub fn ack_duration(&self) -> Duration {
        Duration::from_millis(self.ack_ms)
    }

    pub fn unlock_wait(&self) -> Duration {
        Duration::from_millis(self.unlock_wait_ms)
    }
}
