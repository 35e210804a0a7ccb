//! Debug drawing for traversal queries.
//!
//! The wall scanner and wall-run task each own a [`DebugDrawBuffer`]. When it
//! is enabled they record the geometric queries they issue. Recording is
//! purely observational.

use glam::Vec3;

use super::trace::TraceShape;

/// A recorded query.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugShape {
    /// A ray, with its impact point if it hit.
    Line { start: Vec3, end: Vec3, hit: Option<Vec3> },
    /// A swept shape.
    Sweep { start: Vec3, end: Vec3, shape: TraceShape },
    /// An impact point and its surface normal.
    Impact { point: Vec3, normal: Vec3 },
}

/// Queries recorded during the last update of their owner.
#[derive(Debug, Clone, Default)]
pub struct DebugDrawBuffer {
    enabled: bool,
    shapes: Vec<DebugShape>,
}

impl DebugDrawBuffer {
    /// Turn recording on or off. Turning it off drops what was recorded.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.shapes.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Record a ray.
    pub fn line(&mut self, start: Vec3, end: Vec3, hit: Option<Vec3>) {
        if self.enabled {
            self.shapes.push(DebugShape::Line { start, end, hit });
        }
    }

    /// Record a swept shape.
    pub fn sweep(&mut self, start: Vec3, end: Vec3, shape: TraceShape) {
        if self.enabled {
            self.shapes.push(DebugShape::Sweep { start, end, shape });
        }
    }

    /// Record an impact point.
    pub fn impact(&mut self, point: Vec3, normal: Vec3) {
        if self.enabled {
            self.shapes.push(DebugShape::Impact { point, normal });
        }
    }

    /// Recorded shapes, oldest first.
    pub fn shapes(&self) -> &[DebugShape] {
        &self.shapes
    }
}
