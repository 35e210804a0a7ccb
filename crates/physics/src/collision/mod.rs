//! Collision detection for character locomotion.
//!
//! This module provides world collision testing using capsule, sphere, box
//! and point shapes backed by parry3d.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: The collision environment containing all geometry
//! - [`TraceResult`]: Output from a collision trace
//! - [`TraceShape`]: Shape used for tracing
//! - [`QueryFilter`]: Content mask plus an optional brush to ignore
//!
//! # Queries
//!
//! - [`CollisionWorld::trace`]: first blocking hit of a swept shape
//! - [`CollisionWorld::sweep_multi`]: every surface a swept shape touches
//! - [`CollisionWorld::line_trace`] / [`CollisionWorld::raycast`]: rays

pub mod debug;
mod flags;
mod trace;
mod world;

pub use debug::{DebugDrawBuffer, DebugShape};
pub use flags::{ContentFlags, SurfaceFlags};
pub use trace::{BrushId, QueryFilter, TraceResult, TraceShape};
pub use world::CollisionWorld;
