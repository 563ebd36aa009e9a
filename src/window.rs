//! Window ownership.
//!
//! [`WindowOwner`] is the boundary to whatever places physical windows.
//! [`HeadlessWindows`] is the in-process implementation: it tracks each
//! surface's placement, visibility and click-through flag over a fixed
//! display layout, and starts a surface controller for every window it opens.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;

use crate::surface::{SurfaceHandle, SurfaceRole};

/// Stable label of an open surface: `main`, `settings` or `shadow-N`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn main() -> Self {
        Self("main".to_string())
    }

    pub fn settings() -> Self {
        Self("settings".to_string())
    }

    pub fn shadow(index: u32) -> Self {
        Self(format!("shadow-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_shadow(&self) -> bool {
        self.0.starts_with("shadow-")
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Window '{id}' not found")]
    NotFound { id: SurfaceId },

    #[error("Window '{id}' is already open")]
    AlreadyOpen { id: SurfaceId },

    #[error("No displays available")]
    NoDisplays,
}

/// Boundary to the component that owns physical windows.
pub trait WindowOwner: Send + Sync {
    /// Open a window. `None` places it centered on the first display.
    fn open(
        &self,
        id: &SurfaceId,
        role: SurfaceRole,
        position: Option<(i32, i32)>,
    ) -> Result<(), WindowError>;

    fn close(&self, id: &SurfaceId) -> Result<(), WindowError>;

    fn focus(&self, id: &SurfaceId) -> Result<(), WindowError>;

    fn contains(&self, id: &SurfaceId) -> bool;

    fn position(&self, id: &SurfaceId) -> Result<(i32, i32), WindowError>;

    fn move_by(&self, id: &SurfaceId, dx: i32, dy: i32) -> Result<(i32, i32), WindowError>;

    fn center(&self, id: &SurfaceId) -> Result<(i32, i32), WindowError>;

    /// Center the window on the display after the one it is on, wrapping.
    fn move_to_next_display(&self, id: &SurfaceId) -> Result<(i32, i32), WindowError>;

    fn set_click_through(&self, id: &SurfaceId, enabled: bool) -> Result<(), WindowError>;

    fn set_visible(&self, id: &SurfaceId, visible: bool) -> Result<(), WindowError>;

    fn surfaces(&self) -> Vec<SurfaceId>;
}

/// A display rectangle in virtual screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Display {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn contains(&self, (px, py): (i32, i32)) -> bool {
        px >= self.x
            && py >= self.y
            && i64::from(px) < i64::from(self.x) + i64::from(self.width)
            && i64::from(py) < i64::from(self.y) + i64::from(self.height)
    }

    fn centered(&self, (width, height): (u32, u32)) -> (i32, i32) {
        let dx = (i64::from(self.width) - i64::from(width)) / 2;
        let dy = (i64::from(self.height) - i64::from(height)) / 2;
        (saturate(i64::from(self.x) + dx), saturate(i64::from(self.y) + dy))
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Starts the controller for a newly opened window.
///
/// Called synchronously from [`WindowOwner::open`]; the controller must be
/// subscribed to the bus before this returns.
pub type SurfaceSpawner = Box<dyn Fn(&SurfaceId, SurfaceRole) -> SurfaceHandle + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub role: SurfaceRole,
    pub position: (i32, i32),
    pub visible: bool,
    pub click_through: bool,
    pub focused: bool,
}

struct OpenWindow {
    record: WindowRecord,
    handle: Option<SurfaceHandle>,
}

impl OpenWindow {
    fn stop(&self) {
        if let Some(handle) = &self.handle {
            handle.close();
        }
    }
}

pub struct HeadlessWindows {
    displays: Vec<Display>,
    window_size: (u32, u32),
    windows: Mutex<BTreeMap<SurfaceId, OpenWindow>>,
    spawner: Option<SurfaceSpawner>,
}

impl HeadlessWindows {
    pub fn new(displays: Vec<Display>, window_size: (u32, u32)) -> Self {
        Self {
            displays,
            window_size,
            windows: Mutex::new(BTreeMap::new()),
            spawner: None,
        }
    }

    /// Single 1920x1080 display with a 200x200 overlay window.
    pub fn single_display() -> Self {
        Self::new(vec![Display::new(0, 0, 1920, 1080)], (200, 200))
    }

    pub fn with_spawner(mut self, spawner: SurfaceSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn record(&self, id: &SurfaceId) -> Option<WindowRecord> {
        self.windows.lock().get(id).map(|window| window.record.clone())
    }

    /// Controller handle of an open window, if a spawner started one.
    pub fn handle(&self, id: &SurfaceId) -> Option<SurfaceHandle> {
        self.windows
            .lock()
            .get(id)
            .and_then(|window| window.handle.clone())
    }

    /// Close every window and stop its controller.
    pub fn close_all(&self) {
        let closed = std::mem::take(&mut *self.windows.lock());
        for window in closed.values() {
            window.stop();
        }
        tracing::debug!(count = closed.len(), "Closed all windows");
    }

    fn display_index(&self, position: (i32, i32)) -> usize {
        self.displays
            .iter()
            .position(|display| display.contains(position))
            .unwrap_or(0)
    }

    fn with_window<T>(
        &self,
        id: &SurfaceId,
        f: impl FnOnce(&mut WindowRecord) -> T,
    ) -> Result<T, WindowError> {
        let mut windows = self.windows.lock();
        let window = windows
            .get_mut(id)
            .ok_or_else(|| WindowError::NotFound { id: id.clone() })?;
        Ok(f(&mut window.record))
    }
}

impl WindowOwner for HeadlessWindows {
    fn open(
        &self,
        id: &SurfaceId,
        role: SurfaceRole,
        position: Option<(i32, i32)>,
    ) -> Result<(), WindowError> {
        if self.contains(id) {
            return Err(WindowError::AlreadyOpen { id: id.clone() });
        }

        let position = match position {
            Some(position) => position,
            None => self
                .displays
                .first()
                .ok_or(WindowError::NoDisplays)?
                .centered(self.window_size),
        };

        // The spawner may call back into the owner, so it runs unlocked.
        let handle = self.spawner.as_ref().map(|spawn| spawn(id, role));

        self.windows.lock().insert(
            id.clone(),
            OpenWindow {
                record: WindowRecord {
                    role,
                    position,
                    visible: true,
                    click_through: false,
                    focused: false,
                },
                handle,
            },
        );
        tracing::info!(surface = %id, ?role, x = position.0, y = position.1, "Opened window");
        Ok(())
    }

    fn close(&self, id: &SurfaceId) -> Result<(), WindowError> {
        let window = self
            .windows
            .lock()
            .remove(id)
            .ok_or_else(|| WindowError::NotFound { id: id.clone() })?;
        window.stop();
        tracing::info!(surface = %id, "Closed window");
        Ok(())
    }

    fn focus(&self, id: &SurfaceId) -> Result<(), WindowError> {
        let mut windows = self.windows.lock();
        if !windows.contains_key(id) {
            return Err(WindowError::NotFound { id: id.clone() });
        }
        for (window_id, window) in windows.iter_mut() {
            window.record.focused = window_id == id;
        }
        Ok(())
    }

    fn contains(&self, id: &SurfaceId) -> bool {
        self.windows.lock().contains_key(id)
    }

    fn position(&self, id: &SurfaceId) -> Result<(i32, i32), WindowError> {
        self.with_window(id, |record| record.position)
    }

    fn move_by(&self, id: &SurfaceId, dx: i32, dy: i32) -> Result<(i32, i32), WindowError> {
        self.with_window(id, |record| {
            record.position = (
                record.position.0.saturating_add(dx),
                record.position.1.saturating_add(dy),
            );
            record.position
        })
    }

    fn center(&self, id: &SurfaceId) -> Result<(i32, i32), WindowError> {
        let current = self.position(id)?;
        let display = self
            .displays
            .get(self.display_index(current))
            .ok_or(WindowError::NoDisplays)?;
        let target = display.centered(self.window_size);
        self.with_window(id, |record| {
            record.position = target;
            target
        })
    }

    fn move_to_next_display(&self, id: &SurfaceId) -> Result<(i32, i32), WindowError> {
        if self.displays.is_empty() {
            return Err(WindowError::NoDisplays);
        }
        let current = self.display_index(self.position(id)?);
        let next = &self.displays[(current + 1) % self.displays.len()];
        let target = next.centered(self.window_size);
        self.with_window(id, |record| {
            record.position = target;
            target
        })
    }

    fn set_click_through(&self, id: &SurfaceId, enabled: bool) -> Result<(), WindowError> {
        self.with_window(id, |record| record.click_through = enabled)
    }

    fn set_visible(&self, id: &SurfaceId, visible: bool) -> Result<(), WindowError> {
        self.with_window(id, |record| record.visible = visible)
    }

    fn surfaces(&self) -> Vec<SurfaceId> {
        self.windows.lock().keys().cloned().collect()
    }
}
