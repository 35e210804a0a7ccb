//! Content and surface flags for collision filtering.
//!
//! Content flags decide what a trace collides with; surface flags carry
//! traversal properties of the geometry that was hit.

use serde::{Deserialize, Serialize};

/// Content flags describe what type of volume something is.
///
/// Traces carry a mask of these and only collide with brushes whose
/// contents intersect it (the "trace filter types" of a query).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Empty space - nothing here.
    pub const EMPTY: Self = Self(0);

    /// Solid static world geometry - walls, floors, ledges.
    pub const SOLID: Self = Self(1 << 0);

    /// Trigger volume - never blocks movement.
    pub const TRIGGER: Self = Self(1 << 2);

    /// Dynamic props that block movement but are not scanned for walls.
    pub const DYNAMIC: Self = Self(1 << 3);

    /// Standard mask for character movement traces.
    pub const MASK_PLAYER_SOLID: Self = Self(Self::SOLID.0 | Self::DYNAMIC.0);

    /// Static world geometry only. Wall scans and traversal probes use this.
    pub const MASK_WORLD_STATIC: Self = Self(Self::SOLID.0);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ContentFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// Surface flags describe traversal properties of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceFlags(pub u32);

impl SurfaceFlags {
    /// No special properties.
    pub const NONE: Self = Self(0);

    /// Wall scans ignore this surface, so climbing can never start on it.
    pub const NO_CLIMB: Self = Self(1 << 0);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for SurfaceFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
