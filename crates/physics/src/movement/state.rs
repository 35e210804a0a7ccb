//! Movement modes, capsule geometry and movement events.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::TraceShape;

/// Custom movement modes layered on top of the built-in ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomMovementMode {
    /// Surface-relative movement along a wall.
    Climbing,
}

/// The physics mode a character is simulated in.
///
/// Exactly one is active at a time; climbing is `Custom(Climbing)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// On walkable ground.
    Walking,
    /// Airborne under gravity.
    #[default]
    Falling,
    /// Gravity-free movement (used by wall running).
    Flying,
    /// A custom mode.
    Custom(CustomMovementMode),
}

impl MovementMode {
    /// The climbing mode.
    pub const CLIMBING: Self = Self::Custom(CustomMovementMode::Climbing);

    /// Check if this is the climbing mode.
    #[inline]
    pub fn is_climbing(self) -> bool {
        self == Self::CLIMBING
    }

    /// Check if the character is on the ground.
    #[inline]
    pub fn is_moving_on_ground(self) -> bool {
        self == Self::Walking
    }

    /// Check if the character is airborne under gravity.
    #[inline]
    pub fn is_falling(self) -> bool {
        self == Self::Falling
    }
}

/// How the character's facing follows input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementDirectionType {
    /// Facing is left alone.
    None,
    /// Face the direction of travel.
    #[default]
    OrientToMovement,
    /// Face the control yaw while moving in any direction.
    Strafe,
}

/// A plane movement is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneConstraint {
    /// Any point on the plane.
    pub origin: Vec3,
    /// Unit plane normal.
    pub normal: Vec3,
}

impl PlaneConstraint {
    /// Create a constraint; the normal is normalized.
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: normal.normalize_or(Vec3::Y),
        }
    }

    /// Remove the component of a direction along the plane normal.
    #[inline]
    pub fn constrain_direction(&self, direction: Vec3) -> Vec3 {
        direction - self.normal * direction.dot(self.normal)
    }
}

/// Collision capsule of a character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    /// Capsule radius.
    pub radius: f32,
    /// Distance from centre to either tip.
    pub half_height: f32,
}

impl CapsuleShape {
    /// Create a capsule.
    pub const fn new(radius: f32, half_height: f32) -> Self {
        Self { radius, half_height }
    }

    /// The capsule as a trace shape.
    #[inline]
    pub fn trace_shape(&self) -> TraceShape {
        TraceShape::capsule(self.radius, self.half_height)
    }
}

/// Why a climbing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimbExitReason {
    /// The climb intent was cleared.
    IntentCleared,
    /// No climbable surface was found around the character.
    SurfaceLost,
    /// The aggregate surface normal points straight up or down.
    Ceiling,
    /// Walkable ground was reached below the character.
    ReachedFloor,
    /// Another movement mode was set directly.
    ModeChanged,
}

/// Notifications emitted by a character's movement, drained by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementEvent {
    /// The character entered climbing mode.
    ClimbStarted,
    /// The character left climbing mode.
    ClimbEnded { reason: ClimbExitReason },
    /// The ledge mount started playing.
    LedgeClimbStarted,
    /// The character landed on walkable ground.
    Landed,
}
