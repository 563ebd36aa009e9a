use crate::prefs::FieldUpdate;
use crate::ui::mvi::Reducer;

use super::lock_gate::LockTransition;
use super::{LockGate, SurfaceIntent, SurfaceState};

pub struct SurfaceReducer;

impl Reducer for SurfaceReducer {
    type State = SurfaceState;
    type Intent = SurfaceIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SurfaceIntent::Hydrated { prefs, catalog } => SurfaceState {
                gate: LockGate::new(prefs.locked),
                prefs,
                catalog,
                hydrated: true,
                lock_ack: false,
                ..state
            },
            SurfaceIntent::Synced { prefs } => {
                let mut gate = state.gate;
                let lock_ack = match gate.observe(prefs.locked) {
                    Some(LockTransition::Locked) => true,
                    Some(LockTransition::Unlocked) => false,
                    None => state.lock_ack,
                };
                SurfaceState {
                    prefs,
                    gate,
                    hydrated: true,
                    lock_ack,
                    ..state
                }
            }
            SurfaceIntent::FieldChanged(update) => {
                let mut state = state;
                update.apply_to(&mut state.prefs);
                if let FieldUpdate::Locked(locked) = update {
                    match state.gate.observe(locked) {
                        Some(LockTransition::Locked) => state.lock_ack = true,
                        Some(LockTransition::Unlocked) => state.lock_ack = false,
                        None => {}
                    }
                }
                state
            }
            // The lock only moves on the store's word.
            SurfaceIntent::Optimistic(FieldUpdate::Locked(_)) => state,
            SurfaceIntent::Optimistic(update) => {
                let mut state = state;
                update.apply_to(&mut state.prefs);
                state
            }
            SurfaceIntent::CatalogLoaded(catalog) => SurfaceState { catalog, ..state },
            SurfaceIntent::LockAckExpired => SurfaceState {
                lock_ack: false,
                ..state
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{HexColor, Preferences};
    use crate::surface::SurfaceRole;

    fn hydrated(prefs: Preferences) -> SurfaceState {
        SurfaceReducer::reduce(
            SurfaceState::new(SurfaceRole::Primary),
            SurfaceIntent::Hydrated {
                prefs,
                catalog: vec!["dot.png".to_string()],
            },
        )
    }

    #[test]
    fn hydration_sets_gate_without_acknowledgment() {
        let state = hydrated(Preferences {
            locked: true,
            ..Preferences::default()
        });
        assert!(state.hydrated);
        assert!(state.gate.is_locked());
        assert!(!state.lock_ack);
    }

    #[test]
    fn lock_notification_starts_acknowledgment() {
        let state = hydrated(Preferences::default());
        let state = SurfaceReducer::reduce(
            state,
            SurfaceIntent::FieldChanged(FieldUpdate::Locked(true)),
        );
        assert!(state.gate.is_locked());
        assert!(state.lock_ack);
        assert!(!state.view().draggable);

        let state = SurfaceReducer::reduce(state, SurfaceIntent::LockAckExpired);
        assert!(!state.lock_ack);
        assert!(state.gate.is_locked());
    }

    #[test]
    fn optimistic_lock_is_ignored() {
        let state = hydrated(Preferences::default());
        let next = SurfaceReducer::reduce(
            state.clone(),
            SurfaceIntent::Optimistic(FieldUpdate::Locked(true)),
        );
        assert_eq!(next, state);
    }

    #[test]
    fn field_change_leaves_other_optimistic_fields() {
        let state = hydrated(Preferences::default());
        let color = HexColor::parse("#123456").unwrap();
        let state = SurfaceReducer::reduce(
            state,
            SurfaceIntent::Optimistic(FieldUpdate::Color(color.clone())),
        );
        let state = SurfaceReducer::reduce(
            state,
            SurfaceIntent::FieldChanged(FieldUpdate::Size(33)),
        );
        assert_eq!(state.prefs.color, color);
        assert_eq!(state.prefs.size, 33);
    }

    #[test]
    fn sync_replaces_whole_cache() {
        let state = hydrated(Preferences::default());
        let state = SurfaceReducer::reduce(
            state,
            SurfaceIntent::Optimistic(FieldUpdate::Size(42)),
        );
        let state = SurfaceReducer::reduce(
            state,
            SurfaceIntent::Synced {
                prefs: Preferences::default(),
            },
        );
        assert_eq!(state.prefs, Preferences::default());
    }

    #[test]
    fn unknown_crosshair_renders_fallback() {
        let state = hydrated(Preferences {
            crosshair: "missing.png".to_string(),
            ..Preferences::default()
        });
        assert_eq!(state.view().crosshair, crate::prefs::FALLBACK_CROSSHAIR);
        assert_eq!(state.prefs.crosshair, "missing.png");
    }
}
