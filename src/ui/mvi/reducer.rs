use super::intent::Intent;
use super::state::UiState;

/// Pure transition function `(State, Intent) -> State`.
///
/// Side effects (rendering, store requests, timers) belong to the caller.
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
