//! Tray menu and global hotkey actions.
//!
//! These originate outside any surface and are executed by the store.
//! Actions that need a surface (settings, chooser, duplicate, about) are
//! forwarded to the primary surface as UI signals on the bus.

use std::str::FromStr;

use thiserror::Error;

use crate::bus::Notification;
use crate::window::SurfaceId;

use super::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalAction {
    ToggleLock,
    Center,
    /// Toggle visibility. Only acts while locked.
    Hide,
    Reset,
    NextDisplay,
    Duplicate,
    OpenSettings,
    OpenChooser,
    About,
    Nudge { dx: i32, dy: i32 },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown action '{0}'")]
pub struct ActionParseError(String);

impl FromStr for ExternalAction {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "toggle_lock" | "lock" => ExternalAction::ToggleLock,
            "center" => ExternalAction::Center,
            "hide" => ExternalAction::Hide,
            "reset" => ExternalAction::Reset,
            "change_display" | "next_display" => ExternalAction::NextDisplay,
            "duplicate" => ExternalAction::Duplicate,
            "settings" | "open_settings" => ExternalAction::OpenSettings,
            "choose_crosshair" | "open_chooser" => ExternalAction::OpenChooser,
            "about" => ExternalAction::About,
            "move_up" => ExternalAction::Nudge { dx: 0, dy: -1 },
            "move_down" => ExternalAction::Nudge { dx: 0, dy: 1 },
            "move_left" => ExternalAction::Nudge { dx: -1, dy: 0 },
            "move_right" => ExternalAction::Nudge { dx: 1, dy: 0 },
            "quit" => ExternalAction::Quit,
            _ => return Err(ActionParseError(s.to_string())),
        };
        Ok(action)
    }
}

impl Store {
    pub fn dispatch(&mut self, action: ExternalAction) -> Result<(), StoreError> {
        tracing::info!(?action, "External action");
        let main = SurfaceId::main();

        match action {
            ExternalAction::ToggleLock => {
                let locked = self.toggle_lock();
                let sound = if locked { "lock" } else { "unlock" };
                self.bus.publish(Notification::PlaySound(sound.to_string()));
            }
            ExternalAction::Center => {
                self.center_window(&main)?;
                self.bus.publish(Notification::PlaySound("center".to_string()));
            }
            ExternalAction::Hide => {
                if !self.state.is_locked() {
                    tracing::debug!("Hide ignored - not locked");
                    return Ok(());
                }
                self.toggle_visibility();
            }
            ExternalAction::Reset => {
                self.reset();
                self.center_window(&main)?;
                self.bus.publish(Notification::PlaySound("center".to_string()));
            }
            ExternalAction::NextDisplay => {
                self.move_to_next_display(&main)?;
            }
            ExternalAction::Duplicate => {
                if self.state.is_locked() {
                    tracing::debug!("Duplicate ignored - locked");
                    return Ok(());
                }
                if self.state.shadow_count() >= self.shadows.max {
                    tracing::warn!(max = self.shadows.max, "Maximum shadow windows reached");
                    return Ok(());
                }
                self.bus.publish(Notification::CreateShadow);
            }
            ExternalAction::OpenSettings => {
                self.bus.publish(Notification::OpenSettings);
            }
            ExternalAction::OpenChooser => {
                self.bus.publish(Notification::OpenChooser);
            }
            ExternalAction::About => {
                self.bus.publish(Notification::ShowAbout);
            }
            ExternalAction::Nudge { dx, dy } => {
                if self.state.is_locked() {
                    tracing::debug!("Move ignored - locked");
                    return Ok(());
                }
                self.windows.move_by(&main, dx, dy)?;
            }
            ExternalAction::Quit => {
                if let Err(e) = self.save() {
                    tracing::error!(error = %e, "Failed to save preferences on quit");
                }
                self.shutdown.signal();
            }
        }
        Ok(())
    }
}
