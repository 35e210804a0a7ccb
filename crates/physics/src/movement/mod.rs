//! Character locomotion.
//!
//! This module implements third-person character movement with:
//!
//! - Ground and air movement with Quake-style friction and acceleration
//! - Gravity-free flying, optionally locked to a plane
//! - Surface-relative climbing with a ledge mount
//! - Wall running along side walls
//! - Multi-plane collision sliding and stair stepping
//!
//! # Design
//!
//! Movement logic drives a [`LocomotionHost`]: the body being moved.
//! [`CharacterMovement`] owns the movement mode and runs the per-mode
//! physics in sub-steps. Climbing lives in [`ClimbStateMachine`], fed by the
//! wall hits of a [`SurfaceScanner`]. Wall running is a separate
//! [`WallRunTask`] owned by whoever starts it.

mod climb;
mod config;
mod controller;
pub(crate) mod host;
mod kinematics;
mod scanner;
mod slide_move;
mod state;
mod wall_run;

pub use climb::{ClimbStateMachine, ClimbStep, SurfaceState};
pub use config::{ClimbConfig, LedgeClimbMontage, MovementConfig, WallRunConfig};
pub use controller::CharacterMovement;
pub use host::{CharacterBody, LocomotionHost, RootMotionPlayback};
pub use kinematics::{
    apply_velocity_braking, calc_velocity, interp_rotation, is_parallel, rotate_toward, rotation_from_forward,
    rotation_from_yaw, safe_normal_2d, yaw_only,
};
pub use scanner::{SurfaceScanner, WallHit};
pub use slide_move::{clip_velocity, slide_move, step_slide_move, SlideOutcome};
pub use state::{
    CapsuleShape, ClimbExitReason, CustomMovementMode, MovementDirectionType, MovementEvent, MovementMode,
    PlaneConstraint,
};
pub use wall_run::{WallRunEndReason, WallRunEvent, WallRunState, WallRunTask};
