//! Wall scanning ahead of the character.
//!
//! Every update the [`SurfaceScanner`] sweeps a capsule a short distance
//! forward from just ahead of the character and keeps every surface it
//! touches. Climbing consults these hits to decide whether it may start and,
//! while climbing, which surfaces to stick to.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{BrushId, CollisionWorld, DebugDrawBuffer, QueryFilter, SurfaceFlags, TraceResult, TraceShape};

use super::config::ClimbConfig;

/// One surface touched by the wall scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallHit {
    /// Contact point on the surface.
    pub impact_point: Vec3,
    /// Unit normal pointing away from the surface.
    pub impact_normal: Vec3,
    /// Brush that was touched.
    pub brush: Option<BrushId>,
    /// Surface flags of the touched brush.
    pub surface: SurfaceFlags,
    /// The scan capsule already overlapped the surface at its start.
    pub started_in_solid: bool,
}

impl WallHit {
    /// A hit at `impact_point` with the given normal.
    pub fn new(impact_point: Vec3, impact_normal: Vec3) -> Self {
        Self {
            impact_point,
            impact_normal: impact_normal.normalize_or_zero(),
            brush: None,
            surface: SurfaceFlags::NONE,
            started_in_solid: false,
        }
    }

    pub(crate) fn from_trace(trace: &TraceResult) -> Option<Self> {
        let normal = trace.hit_normal?;
        Some(Self {
            impact_point: trace.impact_point.unwrap_or(trace.end_position),
            impact_normal: normal,
            brush: trace.hit_brush,
            surface: trace.hit_surface,
            started_in_solid: trace.started_in_solid,
        })
    }
}

/// Per-update capsule sweep that finds candidate climbing surfaces.
#[derive(Debug, Clone)]
pub struct SurfaceScanner {
    shape: TraceShape,
    start_offset: f32,
    length: f32,
    filter: QueryFilter,
    hits: Vec<WallHit>,
    debug: DebugDrawBuffer,
}

impl SurfaceScanner {
    /// Create a scanner using the climb tuning's scan capsule.
    ///
    /// `filter` should ignore the scanning character's own body.
    pub fn new(config: &ClimbConfig, filter: QueryFilter) -> Self {
        Self {
            shape: TraceShape::capsule(config.scan_capsule_radius, config.scan_capsule_half_height),
            start_offset: config.scan_start_offset,
            // A zero-length sweep misses some geometry; always move a little
            length: config.scan_length.max(1.0e-3),
            filter,
            hits: Vec::new(),
            debug: DebugDrawBuffer::default(),
        }
    }

    /// Sweep ahead of `position` along `forward` and replace the stored hits.
    pub fn scan(&mut self, position: Vec3, forward: Vec3, world: &CollisionWorld) -> &[WallHit] {
        let forward = forward.normalize_or_zero();
        let start = position + forward * self.start_offset;
        let end = start + forward * self.length;

        self.hits.clear();
        self.hits.extend(
            world
                .sweep_multi(start, end, self.shape, self.filter)
                .iter()
                .filter_map(WallHit::from_trace)
                .filter(|hit| !hit.surface.contains(SurfaceFlags::NO_CLIMB)),
        );

        self.debug.clear();
        self.debug.sweep(start, end, self.shape);
        for hit in &self.hits {
            self.debug.impact(hit.impact_point, hit.impact_normal);
        }

        log::trace!("wall scan from {:?}: {} hit(s)", start, self.hits.len());
        &self.hits
    }

    /// Hits stored by the last scan.
    pub fn hits(&self) -> &[WallHit] {
        &self.hits
    }

    /// Forget the stored hits.
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    /// Record each scan's probes for debug drawing.
    pub fn set_debug_draw(&mut self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    /// Probes recorded by the last scan while debug drawing was enabled.
    pub fn debug_draw(&self) -> &DebugDrawBuffer {
        &self.debug
    }
}
