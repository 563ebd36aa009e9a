//! Overlay and settings surfaces.
//!
//! A surface never owns preference state. It hydrates a cache from the
//! store, renders it, and keeps it in step with the notification bus.

mod bindings;
mod controller;
mod error;
mod handle;
mod intent;
mod lock_gate;
mod mutations;
mod notice;
mod reducer;
mod role;
mod state;

pub use bindings::{HeadlessBindings, HeadlessRecord, SurfaceBindings};
pub use controller::{Nudge, SurfaceContext, SurfaceController, FAST_NUDGE_STEP, NUDGE_STEP};
pub use error::SurfaceError;
pub use handle::{spawn_surface, SurfaceEvent, SurfaceHandle};
pub use intent::SurfaceIntent;
pub use lock_gate::{LockGate, LockState, LockTransition};
pub use mutations::{Mutation, MutationQueue};
pub use notice::{Notice, NoticeLevel, NoticeLog, NoticeSink, TracingNotices};
pub use reducer::SurfaceReducer;
pub use role::SurfaceRole;
pub use state::{SurfaceState, SurfaceView};
