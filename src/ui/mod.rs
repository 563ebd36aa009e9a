//! Presentation-side building blocks shared by every surface.

pub mod mvi;
