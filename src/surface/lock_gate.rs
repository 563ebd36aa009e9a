//! Replicated interaction lock.
//!
//! Every surface holds its own gate. The gate only moves when a lock value
//! arrives from the store (hydration, bulk sync or `lock-changed`); a
//! surface's own toggle request never moves it directly.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

/// The edge crossed by [`LockGate::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockGate {
    state: LockState,
}

impl LockGate {
    pub fn new(locked: bool) -> Self {
        Self {
            state: if locked {
                LockState::Locked
            } else {
                LockState::Unlocked
            },
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// Record an observed lock value. Repeats return `None`.
    pub fn observe(&mut self, locked: bool) -> Option<LockTransition> {
        match (self.state, locked) {
            (LockState::Unlocked, true) => {
                self.state = LockState::Locked;
                Some(LockTransition::Locked)
            }
            (LockState::Locked, false) => {
                self.state = LockState::Unlocked;
                Some(LockTransition::Unlocked)
            }
            _ => None,
        }
    }

    /// Position changes (drag, nudge, center) are allowed.
    pub fn allows_position_change(&self) -> bool {
        !self.is_locked()
    }

    /// The settings entry point is shown.
    pub fn shows_configuration(&self) -> bool {
        !self.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_reports_edges_only() {
        let mut gate = LockGate::new(false);
        assert_eq!(gate.observe(false), None);
        assert_eq!(gate.observe(true), Some(LockTransition::Locked));
        assert_eq!(gate.observe(true), None);
        assert!(!gate.allows_position_change());
        assert!(!gate.shows_configuration());
        assert_eq!(gate.observe(false), Some(LockTransition::Unlocked));
        assert!(gate.allows_position_change());
    }
}
