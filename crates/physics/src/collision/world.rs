//! Collision world containing all static geometry.
//!
//! The collision world stores all collidable geometry and answers the
//! swept-shape, multi-hit and ray queries the locomotion code issues.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{self, Ray, RayCast, ShapeCastOptions};
use parry3d::shape::SharedShape;

use super::flags::{ContentFlags, SurfaceFlags};
use super::trace::{BrushId, QueryFilter, TraceResult, TraceShape};

/// Traces shorter than this are treated as overlap tests.
const MIN_TRACE_DISTANCE: f32 = 1.0e-4;

/// Distance a blocked trace is backed off from the contact.
const SURFACE_EPSILON: f32 = 0.005;

/// Passes used to push a shape out of overlapping geometry.
const PENETRATION_PASSES: usize = 4;

/// A piece of collision geometry in the world.
#[derive(Clone)]
struct CollisionBrush {
    id: BrushId,
    shape: SharedShape,
    /// Position and orientation in world space.
    transform: Isometry<Real>,
    /// Content flags used for query filtering.
    contents: ContentFlags,
    surface: SurfaceFlags,
}

impl std::fmt::Debug for CollisionBrush {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionBrush")
            .field("id", &self.id)
            .field("translation", &self.transform.translation.vector)
            .field("contents", &self.contents)
            .field("surface", &self.surface)
            .finish()
    }
}

/// One brush touched by a swept shape.
#[derive(Debug, Clone, Copy)]
struct BrushContact {
    index: usize,
    time: f32,
    normal: Vec3,
    impact_point: Vec3,
    penetrating: bool,
}

/// The collision world containing all geometry.
///
/// Geometry is a set of axis-aligned boxes. The world is immutable
/// during a simulation tick; every query borrows it shared.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    /// Static world brushes (walls, floors, ledges).
    brushes: Vec<CollisionBrush>,
    /// Next brush ID to assign.
    next_id: BrushId,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `contents` - Content flags for collision filtering
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, contents: ContentFlags) -> BrushId {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::translation(center.x, center.y, center.z);
        self.push_brush(shape, transform, contents)
    }

    /// Set the surface flags of a brush. Returns `false` for unknown ids.
    pub fn set_surface_flags(&mut self, id: BrushId, surface: SurfaceFlags) -> bool {
        match self.brushes.iter_mut().find(|b| b.id == id) {
            Some(brush) => {
                brush.surface = surface;
                true
            }
            None => false,
        }
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.brushes.clear();
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Sweep a shape through the world and report the first blocking hit.
    ///
    /// `start` and `end` are shape centres. Geometry the shape already
    /// overlaps only blocks when the sweep moves further into it, so a body
    /// resting against a wall can always move away from it.
    pub fn trace(&self, start: Vec3, end: Vec3, shape: TraceShape, filter: QueryFilter) -> TraceResult {
        if shape.is_point() {
            return self.line_trace(start, end, filter);
        }

        let delta = end - start;
        let distance = delta.length();

        // No movement - just check if position is valid
        if distance < MIN_TRACE_DISTANCE {
            return match self.overlaps(start, shape, filter).into_iter().next() {
                Some(contact) => self.contact_result(&contact, 0.0, start),
                None => TraceResult::no_hit(start),
            };
        }

        match self.cast_brushes(start, delta, shape, filter, false).into_iter().next() {
            Some(contact) => {
                let fraction = if contact.penetrating {
                    0.0
                } else {
                    (contact.time - SURFACE_EPSILON / distance).max(0.0)
                };
                self.contact_result(&contact, fraction, start + delta * fraction)
            }
            None => TraceResult::no_hit(end),
        }
    }

    /// Sweep a shape and report every brush it touches, ordered by time of
    /// impact.
    ///
    /// Brushes overlapping the shape at `start` are reported first with
    /// `fraction == 0.0` and `started_in_solid` set; their normal and impact
    /// point come from the penetration contact.
    pub fn sweep_multi(&self, start: Vec3, end: Vec3, shape: TraceShape, filter: QueryFilter) -> Vec<TraceResult> {
        if shape.is_point() {
            let hit = self.line_trace(start, end, filter);
            return if hit.hit_something() { vec![hit] } else { Vec::new() };
        }

        let delta = end - start;
        let contacts = if delta.length() < MIN_TRACE_DISTANCE {
            self.overlaps(start, shape, filter)
        } else {
            self.cast_brushes(start, delta, shape, filter, true)
        };

        contacts
            .iter()
            .map(|contact| self.contact_result(contact, contact.time, start + delta * contact.time))
            .collect()
    }

    /// Ray trace between two points.
    pub fn line_trace(&self, start: Vec3, end: Vec3, filter: QueryFilter) -> TraceResult {
        let delta = end - start;
        let distance = delta.length();
        if distance < MIN_TRACE_DISTANCE {
            return TraceResult::no_hit(start);
        }
        self.raycast(start, delta / distance, distance, filter)
    }

    /// Perform a raycast (point trace) through the world.
    ///
    /// # Arguments
    ///
    /// * `origin` - Ray starting position
    /// * `direction` - Ray direction (will be normalized)
    /// * `max_distance` - Maximum trace distance
    /// * `filter` - Which geometry to consider
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, filter: QueryFilter) -> TraceResult {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return TraceResult::no_hit(origin);
        }

        let ray = Ray::new(Point::new(origin.x, origin.y, origin.z), to_vector(dir));

        let mut closest_hit: Option<(f32, Vec3, &CollisionBrush)> = None;

        for brush in &self.brushes {
            if !filter.accepts(brush.id, brush.contents) {
                continue;
            }

            if let Some(hit) = brush
                .shape
                .cast_ray_and_get_normal(&brush.transform, &ray, max_distance, true)
            {
                let is_closer = closest_hit
                    .as_ref()
                    .map_or(true, |(toi, _, _)| hit.time_of_impact < *toi);
                if is_closer {
                    closest_hit = Some((hit.time_of_impact, to_vec3(&hit.normal), brush));
                }
            }
        }

        match closest_hit {
            Some((distance, normal, brush)) => {
                let impact = origin + dir * distance;
                // Rays starting inside a solid have no meaningful normal.
                let started_in_solid = distance <= 0.0;
                let normal = if normal.length_squared() > 0.5 { normal } else { -dir };
                TraceResult {
                    fraction: distance / max_distance,
                    end_position: impact,
                    hit_normal: Some(normal),
                    impact_point: Some(impact),
                    hit_contents: brush.contents,
                    hit_surface: brush.surface,
                    started_in_solid,
                    hit_brush: Some(brush.id),
                }
            }
            None => TraceResult::no_hit(origin + dir * max_distance),
        }
    }

    /// Check if a shape centred at `position` overlaps solid geometry.
    pub fn point_in_solid(&self, position: Vec3, shape: TraceShape, filter: QueryFilter) -> bool {
        !self.overlaps(position, shape, filter).is_empty()
    }

    /// Push a shape out of any geometry it overlaps.
    ///
    /// Returns the corrected centre position.
    pub fn resolve_penetration(&self, position: Vec3, shape: TraceShape, filter: QueryFilter) -> Vec3 {
        let test_shape = create_parry_shape(shape);
        let mut corrected = position;

        for _ in 0..PENETRATION_PASSES {
            let transform = shape_transform(corrected);
            let mut correction = Vec3::ZERO;

            for brush in &self.brushes {
                if !filter.accepts(brush.id, brush.contents) {
                    continue;
                }

                if let Ok(Some(contact)) =
                    query::contact(&transform, test_shape.as_ref(), &brush.transform, brush.shape.as_ref(), 0.0)
                {
                    let depth = -contact.dist;
                    if depth > 0.0 {
                        correction += to_vec3(&contact.normal2) * (depth + 0.001);
                    }
                }
            }

            if correction == Vec3::ZERO {
                break;
            }
            corrected += correction;
        }

        corrected
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn push_brush(&mut self, shape: SharedShape, transform: Isometry<Real>, contents: ContentFlags) -> BrushId {
        let id = self.next_id;
        self.next_id += 1;

        self.brushes.push(CollisionBrush {
            id,
            shape,
            transform,
            contents,
            surface: SurfaceFlags::NONE,
        });

        id
    }

    /// Brushes the shape overlaps at `position`, deepest first.
    fn overlaps(&self, position: Vec3, shape: TraceShape, filter: QueryFilter) -> Vec<BrushContact> {
        let test_shape = create_parry_shape(shape);
        let transform = shape_transform(position);

        let mut contacts: Vec<(f32, BrushContact)> = Vec::new();
        for (index, brush) in self.brushes.iter().enumerate() {
            if !filter.accepts(brush.id, brush.contents) {
                continue;
            }
            if let Ok(Some(contact)) =
                query::contact(&transform, test_shape.as_ref(), &brush.transform, brush.shape.as_ref(), 0.0)
            {
                if contact.dist < 0.0 {
                    contacts.push((
                        contact.dist,
                        BrushContact {
                            index,
                            time: 0.0,
                            normal: to_vec3(&contact.normal2),
                            impact_point: point_to_vec3(&contact.point2),
                            penetrating: true,
                        },
                    ));
                }
            }
        }

        contacts.sort_by(|a, b| a.0.total_cmp(&b.0));
        contacts.into_iter().map(|(_, contact)| contact).collect()
    }

    /// Cast the shape along `delta` against every accepted brush.
    ///
    /// With `include_receding` unset, brushes the shape starts inside of are
    /// skipped unless the sweep moves deeper into them.
    fn cast_brushes(
        &self,
        start: Vec3,
        delta: Vec3,
        shape: TraceShape,
        filter: QueryFilter,
        include_receding: bool,
    ) -> Vec<BrushContact> {
        let mover = create_parry_shape(shape);
        let mover_transform = shape_transform(start);
        let velocity = to_vector(delta);
        let at_rest = Vector::zeros();
        let options = ShapeCastOptions {
            max_time_of_impact: 1.0,
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: true,
        };

        let mut contacts = Vec::new();

        for (index, brush) in self.brushes.iter().enumerate() {
            if !filter.accepts(brush.id, brush.contents) {
                continue;
            }

            if let Ok(Some(contact)) =
                query::contact(&mover_transform, mover.as_ref(), &brush.transform, brush.shape.as_ref(), 0.0)
            {
                if contact.dist < 0.0 {
                    let normal = to_vec3(&contact.normal2);
                    if include_receding || delta.dot(normal) < 0.0 {
                        contacts.push(BrushContact {
                            index,
                            time: 0.0,
                            normal,
                            impact_point: point_to_vec3(&contact.point2),
                            penetrating: true,
                        });
                    }
                    continue;
                }
            }

            let cast = query::cast_shapes(
                &mover_transform,
                &velocity,
                mover.as_ref(),
                &brush.transform,
                &at_rest,
                brush.shape.as_ref(),
                options,
            );

            if let Ok(Some(hit)) = cast {
                let normal = brush.transform.rotation * hit.normal2.into_inner();
                let impact = brush.transform * hit.witness2;
                contacts.push(BrushContact {
                    index,
                    time: hit.time_of_impact,
                    normal: to_vec3(&normal),
                    impact_point: point_to_vec3(&impact),
                    penetrating: false,
                });
            }
        }

        contacts.sort_by(|a, b| a.time.total_cmp(&b.time));
        contacts
    }

    fn contact_result(&self, contact: &BrushContact, fraction: f32, end_position: Vec3) -> TraceResult {
        let brush = &self.brushes[contact.index];
        TraceResult {
            fraction,
            end_position,
            hit_normal: Some(contact.normal.normalize_or(Vec3::Y)),
            impact_point: Some(contact.impact_point),
            hit_contents: brush.contents,
            hit_surface: brush.surface,
            started_in_solid: contact.penetrating,
            hit_brush: Some(brush.id),
        }
    }
}

/// Create a parry3d shape from our TraceShape.
fn create_parry_shape(shape: TraceShape) -> SharedShape {
    match shape {
        TraceShape::Capsule { radius, half_height } => {
            // Parry capsules are defined by the half-length of the segment
            let segment_half = (half_height - radius).max(0.0);
            SharedShape::capsule_y(segment_half, radius)
        }
        TraceShape::Sphere { radius } => SharedShape::ball(radius),
        TraceShape::Box { half_extents } => SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
        // Use a tiny sphere for point overlap tests
        TraceShape::Point => SharedShape::ball(0.001),
    }
}

/// Shapes are centred on their trace origin.
fn shape_transform(position: Vec3) -> Isometry<Real> {
    Isometry::translation(position.x, position.y, position.z)
}

#[inline]
fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

#[inline]
fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
fn point_to_vec3(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_world() -> (CollisionWorld, BrushId, BrushId) {
        let mut world = CollisionWorld::new();

        // Floor with its top at y=0
        let floor = world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::SOLID,
        );

        // Wall with its face at x=9.5
        let wall = world.add_box(
            Vec3::new(10.0, 2.5, 0.0),
            Vec3::new(0.5, 2.5, 10.0),
            ContentFlags::SOLID,
        );

        (world, floor, wall)
    }

    #[test]
    fn test_raycast_hit() {
        let (world, _, wall) = create_test_world();

        let result = world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0, QueryFilter::world_static());

        assert!(result.hit_something());
        assert!(result.fraction < 1.0);
        assert_eq!(result.hit_brush, Some(wall));
        assert!((result.end_position.x - 9.5).abs() < 0.01);
        assert!(result.normal_or_up().dot(-Vec3::X) > 0.99);
    }

    #[test]
    fn test_raycast_miss() {
        let (world, _, _) = create_test_world();

        let result = world.raycast(Vec3::new(0.0, 1.0, 0.0), -Vec3::X, 100.0, QueryFilter::world_static());

        assert!(!result.hit_something());
        assert_eq!(result.fraction, 1.0);
    }

    #[test]
    fn test_line_trace_reports_impact_point() {
        let (world, floor, _) = create_test_world();

        let result = world.line_trace(Vec3::new(2.0, 3.0, 1.0), Vec3::new(2.0, -3.0, 1.0), QueryFilter::world_static());

        assert_eq!(result.hit_brush, Some(floor));
        let impact = result.impact_point.unwrap();
        assert!(impact.y.abs() < 0.01);
        assert!(result.normal_or_up().y > 0.99);
    }

    #[test]
    fn test_trace_capsule_stops_before_wall() {
        let (world, _, _) = create_test_world();
        let shape = TraceShape::capsule(0.4, 0.9);

        let result = world.trace(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(15.0, 1.0, 0.0),
            shape,
            QueryFilter::player_solid(),
        );

        assert!(result.is_blocked());
        assert!(result.end_position.x < 9.1, "x={}", result.end_position.x);
        assert!(result.end_position.x > 9.0, "x={}", result.end_position.x);
        assert!(result.normal_or_up().dot(-Vec3::X) > 0.99);
        assert!((result.impact_point.unwrap().x - 9.5).abs() < 0.01);
    }

    #[test]
    fn test_trace_moving_away_from_overlap_is_free() {
        let (world, _, _) = create_test_world();
        let shape = TraceShape::capsule(0.4, 0.9);

        // Overlapping the wall face by 0.1
        let start = Vec3::new(9.2, 1.0, 0.0);
        assert!(world.point_in_solid(start, shape, QueryFilter::player_solid()));

        let away = world.trace(start, start - Vec3::X, shape, QueryFilter::player_solid());
        assert!(!away.hit_something());

        let into = world.trace(start, start + Vec3::X, shape, QueryFilter::player_solid());
        assert!(into.started_in_solid);
        assert_eq!(into.fraction, 0.0);
    }

    #[test]
    fn test_trace_ignores_filtered_brush() {
        let (world, _, wall) = create_test_world();
        let shape = TraceShape::Sphere { radius: 0.2 };

        let result = world.trace(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(15.0, 1.0, 0.0),
            shape,
            QueryFilter::world_static().ignoring(wall),
        );

        assert!(!result.hit_something());
        assert_eq!(result.end_position, Vec3::new(15.0, 1.0, 0.0));
    }

    #[test]
    fn test_sweep_multi_reports_overlaps() {
        let (world, floor, wall) = create_test_world();
        let shape = TraceShape::capsule(0.4, 0.9);

        // Overlaps the floor and the wall face
        let start = Vec3::new(9.3, 0.6, 0.0);
        let hits = world.sweep_multi(start, start + Vec3::X * 0.01, shape, QueryFilter::world_static());

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.started_in_solid));
        let wall_hit = hits.iter().find(|h| h.hit_brush == Some(wall)).unwrap();
        assert!(wall_hit.normal_or_up().dot(-Vec3::X) > 0.99);
        let floor_hit = hits.iter().find(|h| h.hit_brush == Some(floor)).unwrap();
        assert!(floor_hit.normal_or_up().y > 0.99);
    }

    #[test]
    fn test_sweep_multi_empty_in_open_space() {
        let (world, _, _) = create_test_world();
        let shape = TraceShape::capsule(0.5, 0.72);

        let start = Vec3::new(0.0, 2.0, 0.0);
        let hits = world.sweep_multi(start, start + Vec3::X * 0.01, shape, QueryFilter::world_static());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_point_in_solid() {
        let (world, _, _) = create_test_world();

        assert!(world.point_in_solid(Vec3::new(0.0, -0.25, 0.0), TraceShape::Point, QueryFilter::world_static()));
        assert!(!world.point_in_solid(Vec3::new(0.0, 1.0, 0.0), TraceShape::Point, QueryFilter::world_static()));
    }

    #[test]
    fn test_resolve_penetration_pushes_out() {
        let (world, _, _) = create_test_world();
        let shape = TraceShape::capsule(0.4, 0.9);

        let resolved = world.resolve_penetration(Vec3::new(0.0, 0.7, 0.0), shape, QueryFilter::player_solid());

        assert!(resolved.y >= 0.9, "y={}", resolved.y);
        assert!(!world.point_in_solid(resolved, shape, QueryFilter::player_solid()));
    }

    #[test]
    fn test_content_mask_filtering() {
        let mut world = CollisionWorld::new();

        world.add_box(Vec3::new(5.0, 1.0, 0.0), Vec3::new(0.5, 1.0, 5.0), ContentFlags::SOLID);
        world.add_box(Vec3::new(3.0, 1.0, 0.0), Vec3::new(0.5, 1.0, 5.0), ContentFlags::TRIGGER);

        let result = world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0, QueryFilter::world_static());

        assert!(result.hit_something());
        // Should hit wall at x=4.5, not trigger at x=2.5
        assert!((result.end_position.x - 4.5).abs() < 0.01);
    }

    #[test]
    fn test_surface_flags() {
        let (mut world, _, wall) = create_test_world();
        assert!(world.set_surface_flags(wall, SurfaceFlags::NO_CLIMB));
        assert!(!world.set_surface_flags(99, SurfaceFlags::NO_CLIMB));

        let result = world.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0, QueryFilter::world_static());
        assert!(result.hit_surface.contains(SurfaceFlags::NO_CLIMB));
    }
}
