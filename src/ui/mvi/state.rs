/// Surface state. `PartialEq` lets the caller skip renders when a
/// transition changed nothing visible.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
