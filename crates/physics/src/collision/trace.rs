//! Trace results, shapes and query filters for collision queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::{ContentFlags, SurfaceFlags};

/// Identifier of a brush in a [`super::CollisionWorld`].
pub type BrushId = u32;

/// Result of a collision trace through the world.
///
/// Traces sweep a shape from a start position to an end position and
/// report what was hit along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// How far along the trace path we got before hitting something.
    ///
    /// - `1.0` = traveled the full distance (no collision)
    /// - `0.0` = hit something immediately at start
    /// - `0.5` = hit something halfway through
    pub fraction: f32,

    /// Centre of the shape at the end of the trace.
    ///
    /// If `fraction < 1.0`, this is slightly backed off from the contact
    /// to prevent floating-point precision issues.
    pub end_position: Vec3,

    /// Surface normal at the impact point.
    ///
    /// Points away from the surface that was hit. `None` if no collision
    /// occurred.
    pub hit_normal: Option<Vec3>,

    /// Point of contact on the surface that was hit.
    pub impact_point: Option<Vec3>,

    /// Content flags of what was hit.
    pub hit_contents: ContentFlags,

    /// Surface flags of the hit surface.
    pub hit_surface: SurfaceFlags,

    /// Whether the trace started overlapping the geometry it reports.
    pub started_in_solid: bool,

    /// Brush that was hit (if any).
    pub hit_brush: Option<BrushId>,
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::no_hit(Vec3::ZERO)
    }
}

impl TraceResult {
    /// Create a trace result indicating no collision occurred.
    pub fn no_hit(end_position: Vec3) -> Self {
        Self {
            fraction: 1.0,
            end_position,
            hit_normal: None,
            impact_point: None,
            hit_contents: ContentFlags::EMPTY,
            hit_surface: SurfaceFlags::NONE,
            started_in_solid: false,
            hit_brush: None,
        }
    }

    /// Create a trace result indicating a collision occurred.
    pub fn hit(fraction: f32, end_position: Vec3, normal: Vec3, impact_point: Vec3) -> Self {
        Self {
            fraction,
            end_position,
            hit_normal: Some(normal),
            impact_point: Some(impact_point),
            hit_contents: ContentFlags::SOLID,
            hit_surface: SurfaceFlags::NONE,
            started_in_solid: false,
            hit_brush: None,
        }
    }

    /// Check if this trace hit something.
    #[inline]
    pub fn hit_something(&self) -> bool {
        self.hit_normal.is_some()
    }

    /// Whether the trace was blocked before covering its full distance.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.hit_something() && self.fraction < 1.0
    }

    /// Get the hit normal, defaulting to up if none.
    #[inline]
    pub fn normal_or_up(&self) -> Vec3 {
        self.hit_normal.unwrap_or(Vec3::Y)
    }
}

/// Shape used for collision traces.
///
/// Every shape is positioned by its centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TraceShape {
    /// A vertical capsule (pill shape).
    Capsule {
        /// Radius of the capsule cylinder and end caps.
        radius: f32,
        /// Distance from the centre to the tip of either cap.
        half_height: f32,
    },

    /// A sphere.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },

    /// An axis-aligned bounding box.
    Box {
        /// Half-size in each axis (x, y, z).
        half_extents: Vec3,
    },

    /// A single point (infinitely small). Traced as a ray.
    Point,
}

impl TraceShape {
    /// Capsule with the given radius and half-height.
    pub const fn capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule { radius, half_height }
    }

    /// Get the effective horizontal radius of this shape.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Capsule { radius, .. } | Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.x.max(half_extents.z),
            Self::Point => 0.0,
        }
    }

    /// Get the vertical half-height of this shape.
    pub fn half_height(&self) -> f32 {
        match self {
            Self::Capsule { half_height, .. } => *half_height,
            Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.y,
            Self::Point => 0.0,
        }
    }

    /// Get a bounding box relative to the centre that fully contains this shape.
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        let extents = Vec3::new(self.radius(), self.half_height(), self.radius());
        match self {
            Self::Box { half_extents } => (-*half_extents, *half_extents),
            _ => (-extents, extents),
        }
    }

    /// Check if this is a point trace (raycast).
    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point)
    }
}

/// Which geometry a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Content flags to collide with.
    pub mask: ContentFlags,
    /// Brush to skip, typically the querying body itself.
    pub ignore: Option<BrushId>,
}

impl QueryFilter {
    /// Filter that collides with everything in `mask`.
    pub const fn new(mask: ContentFlags) -> Self {
        Self { mask, ignore: None }
    }

    /// Filter for character movement.
    pub const fn player_solid() -> Self {
        Self::new(ContentFlags::MASK_PLAYER_SOLID)
    }

    /// Filter for static world probes.
    pub const fn world_static() -> Self {
        Self::new(ContentFlags::MASK_WORLD_STATIC)
    }

    /// Skip the given brush.
    pub fn ignoring(mut self, brush: BrushId) -> Self {
        self.ignore = Some(brush);
        self
    }

    /// Whether a brush with the given id and contents takes part in the query.
    #[inline]
    pub fn accepts(&self, brush: BrushId, contents: ContentFlags) -> bool {
        self.mask.intersects(contents) && self.ignore != Some(brush)
    }
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::player_solid()
    }
}
