use std::fmt;

/// What a surface is for. Decides which interactions it offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceRole {
    #[default]
    Primary,
    Settings,
    Shadow,
}

impl SurfaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Primary => "primary",
            SurfaceRole::Settings => "settings",
            SurfaceRole::Shadow => "shadow",
        }
    }

    /// Overlays can be dragged; the settings panel cannot.
    pub fn is_draggable(&self) -> bool {
        matches!(self, SurfaceRole::Primary | SurfaceRole::Shadow)
    }

    /// Only the primary surface plays sounds and opens dialogs on request.
    pub fn handles_ui_signals(&self) -> bool {
        matches!(self, SurfaceRole::Primary)
    }

    /// Shadows take their first state from a bulk sync instead of reads.
    pub fn hydrates_from_sync(&self) -> bool {
        matches!(self, SurfaceRole::Shadow)
    }

    /// Only the primary placement is remembered across runs.
    pub fn persists_position(&self) -> bool {
        matches!(self, SurfaceRole::Primary)
    }
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
