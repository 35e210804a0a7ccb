//! Ascend Physics
//!
//! Collision queries and character locomotion for a third-person action
//! game: walking, falling, flying, climbing and wall running.
//!
//! # Architecture
//!
//! The crate is split into two main systems:
//!
//! - **Collision**: Traces capsules, spheres, boxes and rays through the
//!   world and returns hit information
//! - **Movement**: Uses collision traces to implement the movement modes
//!
//! World space is Y-up and measured in meters. A character's forward axis is
//! its local X, up is local Y and right is local Z.

pub mod collision;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    BrushId, CollisionWorld, ContentFlags, DebugDrawBuffer, QueryFilter, SurfaceFlags, TraceResult, TraceShape,
};
pub use movement::{
    CharacterBody, CharacterMovement, ClimbConfig, ClimbExitReason, ClimbStateMachine, LocomotionHost,
    MovementConfig, MovementDirectionType, MovementEvent, MovementMode, SurfaceScanner, WallHit, WallRunConfig,
    WallRunEndReason, WallRunEvent, WallRunState, WallRunTask,
};
