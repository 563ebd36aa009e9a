//! The single sink every surface reports failures to.

use std::fmt;

use parking_lot::Mutex;

use crate::window::SurfaceId;

use super::SurfaceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub source: SurfaceId,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, source: SurfaceId, message: impl Into<String>) -> Self {
        Self {
            level,
            source,
            message: message.into(),
        }
    }

    pub fn from_error(source: SurfaceId, error: &SurfaceError) -> Self {
        let level = match error {
            SurfaceError::Locked { .. } | SurfaceError::Unsupported { .. } => NoticeLevel::Info,
            SurfaceError::Validation(_) | SurfaceError::UnlockTimeout { .. } => {
                NoticeLevel::Warning
            }
            SurfaceError::Ipc(_) | SurfaceError::Closed => NoticeLevel::Error,
        };
        Self::new(level, source, error.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}: {}", self.source, self.level, self.message)
    }
}

pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotices;

impl NoticeSink for TracingNotices {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => {
                tracing::info!(surface = %notice.source, "{}", notice.message)
            }
            NoticeLevel::Warning => {
                tracing::warn!(surface = %notice.source, "{}", notice.message)
            }
            NoticeLevel::Error => {
                tracing::error!(surface = %notice.source, "{}", notice.message)
            }
        }
    }
}

/// Logs and keeps every notice.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notice> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl NoticeSink for NoticeLog {
    fn notify(&self, notice: Notice) {
        TracingNotices.notify(notice.clone());
        self.entries.lock().push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::IpcError;

    #[test]
    fn levels_follow_error_kind() {
        let source = SurfaceId::main();
        let locked = Notice::from_error(
            source.clone(),
            &SurfaceError::Locked { action: "drag" },
        );
        assert_eq!(locked.level, NoticeLevel::Info);

        let timeout = Notice::from_error(
            source.clone(),
            &SurfaceError::UnlockTimeout { still_locked: true },
        );
        assert_eq!(timeout.level, NoticeLevel::Warning);

        let transport = Notice::from_error(source, &SurfaceError::Ipc(IpcError::Timeout));
        assert_eq!(transport.level, NoticeLevel::Error);
        assert_eq!(transport.message, "IPC request timed out");
    }

    #[test]
    fn log_keeps_notices_in_order() {
        let log = NoticeLog::new();
        assert!(log.is_empty());

        log.notify(Notice::new(NoticeLevel::Info, SurfaceId::main(), "first"));
        log.notify(Notice::new(NoticeLevel::Error, SurfaceId::settings(), "second"));

        let messages: Vec<_> = log.entries().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, ["first", "second"]);
        assert_eq!(log.len(), 2);
    }
}
