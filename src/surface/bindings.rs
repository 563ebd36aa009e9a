use parking_lot::Mutex;

use crate::window::SurfaceId;

use super::SurfaceView;

/// The presentation side of one surface.
pub trait SurfaceBindings: Send + Sync {
    fn render(&self, view: &SurfaceView);

    fn play_sound(&self, name: &str);

    fn show_about(&self);

    /// Present the crosshair chooser over `catalog`.
    fn show_chooser(&self, catalog: &[String]);
}

/// Bindings for a surface with no display. Logs and remembers what it was
/// asked to show.
#[derive(Debug)]
pub struct HeadlessBindings {
    surface: SurfaceId,
    inner: Mutex<HeadlessRecord>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct HeadlessRecord {
    pub last_view: Option<SurfaceView>,
    pub renders: usize,
    pub sounds: Vec<String>,
    pub about_shown: usize,
    pub chooser_shown: usize,
}

impl HeadlessBindings {
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            inner: Mutex::new(HeadlessRecord::default()),
        }
    }

    pub fn record(&self) -> HeadlessRecord {
        self.inner.lock().clone()
    }
}

impl SurfaceBindings for HeadlessBindings {
    fn render(&self, view: &SurfaceView) {
        tracing::debug!(
            surface = %self.surface,
            crosshair = %view.crosshair,
            size = view.size,
            color = %view.color,
            locked = view.locked,
            "Render"
        );
        let mut inner = self.inner.lock();
        inner.last_view = Some(view.clone());
        inner.renders += 1;
    }

    fn play_sound(&self, name: &str) {
        tracing::debug!(surface = %self.surface, sound = name, "Play sound");
        self.inner.lock().sounds.push(name.to_string());
    }

    fn show_about(&self) {
        tracing::debug!(surface = %self.surface, "Show about");
        self.inner.lock().about_shown += 1;
    }

    fn show_chooser(&self, catalog: &[String]) {
        tracing::debug!(surface = %self.surface, entries = catalog.len(), "Show chooser");
        self.inner.lock().chooser_shown += 1;
    }
}
