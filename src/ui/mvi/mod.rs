//! Unidirectional state flow for surfaces.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```
//!
//! Store notifications and local gestures both arrive as intents. A
//! reducer is the only place a surface's state changes; the controller
//! renders whatever comes out.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
