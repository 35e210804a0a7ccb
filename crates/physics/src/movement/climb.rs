//! Climbing movement mode.
//!
//! [`ClimbStateMachine`] decides when climbing may start and runs the
//! climbing physics each sub-step while the character is in
//! [`MovementMode::CLIMBING`](super::MovementMode::CLIMBING):
//!
//! 1. Rebuild the aggregate surface normal and anchor from the wall hits
//! 2. Check exit conditions (intent cleared, surface lost, ceiling, floor)
//! 3. Integrate velocity with the climbing speed limits
//! 4. Move along the surface, sliding when blocked
//! 5. Try the ledge mount
//! 6. Snap back toward the configured standoff from the surface
//!
//! The state machine never changes the movement mode itself. It reports an
//! exit through [`ClimbStep::Exit`] and the mode owner calls
//! [`ClimbStateMachine::exit`] from its mode-change hook.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionWorld, QueryFilter, TraceShape};

use super::config::{ClimbConfig, MovementConfig};
use super::host::LocomotionHost;
use super::kinematics::{calc_velocity, interp_rotation, is_parallel, rotation_from_forward, safe_normal_2d, yaw_only};
use super::scanner::WallHit;
use super::state::ClimbExitReason;

/// Vertical dots closer to zero than this mark a surface as a ceiling.
const CEILING_DOT_TOLERANCE: f32 = 1.0e-8;

/// Aggregate surface the character is climbing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    /// Unit normal pointing away from the surface, or zero when there is no
    /// surface.
    pub normal: Vec3,
    /// Averaged anchor position near the surface.
    pub position: Vec3,
}

impl SurfaceState {
    /// Whether no surface was found.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.normal == Vec3::ZERO
    }
}

/// Host state captured on entering climbing and restored on exit.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClimbSession {
    standing_half_height: f32,
    gravity_scale: f32,
    orient_rotation_to_movement: bool,
}

/// Outcome of one climbing sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbStep {
    /// Still climbing.
    Continue,
    /// Still climbing; the ledge mount just started.
    LedgeMount,
    /// Climbing must end. Nothing was moved this sub-step.
    Exit(ClimbExitReason),
}

/// The climbing mode: entry checks, per-sub-step physics and exit hooks.
#[derive(Debug, Clone)]
pub struct ClimbStateMachine {
    config: ClimbConfig,
    walkable_floor_y: f32,
    filter: QueryFilter,
    wants_to_climb: bool,
    surface: SurfaceState,
    session: Option<ClimbSession>,
}

impl ClimbStateMachine {
    /// Create a state machine using `config.climb`.
    ///
    /// `filter` is used for every climbing probe and should ignore the
    /// climbing character's own body.
    pub fn new(config: &MovementConfig, filter: QueryFilter) -> Self {
        Self {
            config: config.climb.clone(),
            walkable_floor_y: config.min_ground_normal,
            filter,
            wants_to_climb: false,
            surface: SurfaceState::default(),
            session: None,
        }
    }

    pub fn config(&self) -> &ClimbConfig {
        &self.config
    }

    // ========================================================================
    // Intent
    // ========================================================================

    /// Request climbing. The intent is only set if climbing could start
    /// right now; the mode switch happens on the next movement update.
    pub fn try_climbing(&mut self, host: &impl LocomotionHost, world: &CollisionWorld, hits: &[WallHit]) -> bool {
        if self.can_start_climbing(host, world, hits) {
            self.wants_to_climb = true;
        }
        self.wants_to_climb
    }

    /// Clear the climbing intent.
    pub fn cancel_climbing(&mut self) {
        self.wants_to_climb = false;
    }

    /// Whether climbing is requested.
    pub fn wants_to_climb(&self) -> bool {
        self.wants_to_climb
    }

    /// Whether a climbing session is in progress.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current aggregate surface. Empty when not climbing.
    pub fn surface(&self) -> SurfaceState {
        self.surface
    }

    // ========================================================================
    // Entry
    // ========================================================================

    /// Whether any of the wall hits is a climbable surface the character
    /// faces closely enough.
    pub fn can_start_climbing(&self, host: &impl LocomotionHost, world: &CollisionWorld, hits: &[WallHit]) -> bool {
        let forward = host.forward();
        let max_degrees = self.config.min_horizontal_degrees_to_start_climbing;

        hits.iter().any(|hit| {
            let horizontal_normal = safe_normal_2d(hit.impact_normal);

            let horizontal_dot = forward.dot(-horizontal_normal);
            let vertical_dot = hit.impact_normal.dot(horizontal_normal);

            let horizontal_degrees = horizontal_dot.clamp(-1.0, 1.0).acos().to_degrees();
            let is_ceiling = vertical_dot.abs() < CEILING_DOT_TOLERANCE;

            horizontal_degrees <= max_degrees && !is_ceiling && self.is_facing_surface(host, world, vertical_dot)
        })
    }

    /// Eye-height probe whose length grows as the surface gets shallower.
    pub fn is_facing_surface(&self, host: &impl LocomotionHost, world: &CollisionWorld, steepness: f32) -> bool {
        let steepness_multiplier = 1.0 + (1.0 - steepness) * 5.0;
        self.eye_height_trace(host, world, self.config.facing_trace_length * steepness_multiplier)
    }

    /// Ray forward from eye height. True if it hits anything.
    pub fn eye_height_trace(&self, host: &impl LocomotionHost, world: &CollisionWorld, distance: f32) -> bool {
        let start = host.position() + host.up() * host.eye_height();
        let end = start + host.forward() * distance;
        world.line_trace(start, end, self.filter).hit_something()
    }

    // ========================================================================
    // Mode hooks
    // ========================================================================

    /// Enter climbing. Called by the mode owner after switching the mode.
    ///
    /// Shrinks the capsule and stops the body. Does nothing if a session is
    /// already running.
    pub fn enter(&mut self, host: &mut impl LocomotionHost) {
        if self.session.is_some() {
            return;
        }

        let capsule = host.capsule();
        self.session = Some(ClimbSession {
            standing_half_height: capsule.half_height,
            gravity_scale: host.gravity_scale(),
            orient_rotation_to_movement: host.orient_rotation_to_movement(),
        });

        host.set_orient_rotation_to_movement(false);
        host.set_capsule_half_height(capsule.half_height - self.config.collision_shrink_amount);
        host.stop_movement_immediately();

        log::debug!("climbing started at {:?}", host.position());
    }

    /// Leave climbing. Called by the mode owner after switching away.
    ///
    /// Restores everything [`enter`](Self::enter) changed. Returns `false` if
    /// no session was running.
    pub fn exit(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };

        self.wants_to_climb = false;
        self.surface = SurfaceState::default();

        host.set_orient_rotation_to_movement(session.orient_rotation_to_movement);
        host.set_rotation(yaw_only(host.rotation()));
        host.set_capsule_half_height(session.standing_half_height);
        host.fix_penetration(world);
        host.set_gravity_scale(session.gravity_scale);
        if host.plane_constraint().is_some() {
            host.set_plane_constraint(None);
        }
        host.stop_movement_immediately();

        log::debug!("climbing ended at {:?}", host.position());
        true
    }

    // ========================================================================
    // Physics
    // ========================================================================

    /// Run one climbing sub-step.
    pub fn phys_climbing(
        &mut self,
        host: &mut impl LocomotionHost,
        world: &CollisionWorld,
        hits: &[WallHit],
        delta_time: f32,
    ) -> ClimbStep {
        if delta_time < self.config.min_tick_time {
            return ClimbStep::Continue;
        }

        self.compute_surface_info(host, world, hits);

        if let Some(reason) = self.should_stop_climbing() {
            return ClimbStep::Exit(reason);
        }
        if self.climb_down_to_floor(host, world) {
            return ClimbStep::Exit(ClimbExitReason::ReachedFloor);
        }

        self.compute_climbing_velocity(host, delta_time);

        let old_position = host.position();
        self.move_along_climbing_surface(host, world, delta_time);

        let mounted = self.try_climb_up_ledge(host, world);

        if !host.has_root_motion() {
            host.set_velocity((host.position() - old_position) / delta_time);
        }

        self.snap_to_climbing_surface(host, world, delta_time);

        if mounted {
            ClimbStep::LedgeMount
        } else {
            ClimbStep::Continue
        }
    }

    /// Rebuild the aggregate surface from assist sweeps toward every hit.
    pub fn compute_surface_info(&mut self, host: &impl LocomotionHost, world: &CollisionWorld, hits: &[WallHit]) {
        self.surface = SurfaceState::default();
        if hits.is_empty() {
            return;
        }

        let start = host.position();
        let sphere = TraceShape::Sphere {
            radius: self.config.assist_sphere_radius,
        };

        let mut position_sum = Vec3::ZERO;
        let mut normal_sum = Vec3::ZERO;
        let mut count = 0;

        for hit in hits {
            let direction = (hit.impact_point - start).normalize_or_zero();
            if direction == Vec3::ZERO {
                continue;
            }

            let end = start + direction * self.config.assist_trace_length;
            let assist = world.trace(start, end, sphere, self.filter);
            if let Some(normal) = assist.hit_normal {
                position_sum += assist.end_position;
                normal_sum += normal;
                count += 1;
            }
        }

        if count > 0 {
            self.surface = SurfaceState {
                normal: normal_sum.normalize_or_zero(),
                position: position_sum / count as f32,
            };
        }
    }

    /// Exit reason from the intent and the aggregate surface, if any.
    pub fn should_stop_climbing(&self) -> Option<ClimbExitReason> {
        if !self.wants_to_climb {
            Some(ClimbExitReason::IntentCleared)
        } else if self.surface.is_empty() {
            Some(ClimbExitReason::SurfaceLost)
        } else if is_parallel(self.surface.normal, Vec3::Y) {
            Some(ClimbExitReason::Ceiling)
        } else {
            None
        }
    }

    /// Whether walkable ground close below should end the climb.
    ///
    /// True when moving down toward it fast enough, or when the climbed
    /// surface is itself nearly flat.
    pub fn climb_down_to_floor(&self, host: &impl LocomotionHost, world: &CollisionWorld) -> bool {
        let start = host.position();
        let floor = world.line_trace(start, start - Vec3::Y * self.config.floor_check_distance, self.filter);
        let Some(floor_normal) = floor.hit_normal else {
            return false;
        };

        let on_walkable_floor = floor_normal.y > self.walkable_floor_y;

        let down_speed = host.velocity().dot(-floor_normal);
        let moving_toward_floor = down_speed >= self.config.max_climbing_speed / 3.0 && on_walkable_floor;

        let climbing_floor = self.surface.normal.y > self.walkable_floor_y;

        moving_toward_floor || (climbing_floor && on_walkable_floor)
    }

    /// Integrate velocity with the climbing limits. Root motion overrides it.
    pub fn compute_climbing_velocity(&self, host: &mut impl LocomotionHost, delta_time: f32) {
        let velocity = match host.root_motion_velocity() {
            Some(root_motion) => root_motion,
            None => calc_velocity(
                host.velocity(),
                host.acceleration(),
                delta_time,
                self.config.max_climbing_speed,
                0.0,
                self.config.braking_deceleration_climbing,
            ),
        };
        host.set_velocity(velocity);
    }

    /// Move by velocity, turning toward the surface and sliding if blocked.
    pub fn move_along_climbing_surface(&self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        let delta = host.velocity() * delta_time;
        let rotation = self.climbing_rotation(host, delta_time);

        let hit = host.move_with_collision(world, delta, rotation);
        if let (true, Some(normal)) = (hit.is_blocked(), hit.hit_normal) {
            host.slide_along_surface(world, delta, 1.0 - hit.fraction, normal);
        }
    }

    /// Pull toward or push away from the surface to keep the standoff.
    pub fn snap_to_climbing_surface(&self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        let forward = host.forward();
        let forward_difference = (self.surface.position - host.position()).project_onto(forward);
        let offset = -self.surface.normal * (forward_difference.length() - self.config.distance_from_surface);

        let rotation = host.rotation();
        host.move_with_collision(world, offset * self.config.climbing_snap_speed * delta_time, rotation);
    }

    /// Rotation this sub-step: turning toward facing into the surface.
    pub fn climbing_rotation(&self, host: &impl LocomotionHost, delta_time: f32) -> Quat {
        let current = host.rotation();
        if host.has_root_motion() {
            return current;
        }

        let target = rotation_from_forward(-self.surface.normal);
        interp_rotation(current, target, delta_time, self.config.climbing_rotation_speed)
    }

    // ========================================================================
    // Ledge mount
    // ========================================================================

    /// Start the ledge mount if climbing upward past the top of the surface
    /// onto walkable ground. Returns `false` while a mount is playing.
    pub fn try_climb_up_ledge(&self, host: &mut impl LocomotionHost, world: &CollisionWorld) -> bool {
        if host.is_ledge_climb_playing() {
            return false;
        }

        let up_speed = host.velocity().dot(host.up());
        let moving_up = up_speed >= self.config.max_climbing_speed / 3.0;

        if moving_up && self.has_reached_edge(host, world) && self.can_move_to_ledge_climb_location(host, world) {
            host.set_rotation(yaw_only(host.rotation()));
            host.play_ledge_climb(&self.config.ledge_climb);
            log::debug!("ledge mount from {:?}", host.position());
            return true;
        }

        false
    }

    /// Nothing ahead at eye height any more.
    pub fn has_reached_edge(&self, host: &impl LocomotionHost, world: &CollisionWorld) -> bool {
        let distance = host.capsule().radius * self.config.ledge_edge_trace_radius_scale;
        !self.eye_height_trace(host, world, distance)
    }

    /// Walkable ground within reach below `location`.
    pub fn is_location_walkable(&self, world: &CollisionWorld, location: Vec3) -> bool {
        let end = location - Vec3::Y * self.config.ledge_walkable_trace_depth;
        let hit = world.line_trace(location, end, self.filter);
        hit.hit_normal.is_some_and(|normal| normal.y >= self.walkable_floor_y)
    }

    /// Whether the mount target is walkable and the capsule fits on the way.
    pub fn can_move_to_ledge_climb_location(&self, host: &impl LocomotionHost, world: &CollisionWorld) -> bool {
        let vertical_offset = Vec3::Y * self.config.ledge_check_up;
        let horizontal_offset = host.forward() * self.config.ledge_check_forward;

        let check_location = host.position() + horizontal_offset + vertical_offset;
        if !self.is_location_walkable(world, check_location) {
            return false;
        }

        let capsule_start = check_location - horizontal_offset;
        let shape = host.capsule().trace_shape();
        world.sweep_multi(capsule_start, check_location, shape, self.filter).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ContentFlags;
    use crate::movement::host::test_support::RecordingHost;
    use crate::movement::host::CharacterBody;
    use crate::movement::kinematics::rotation_from_yaw;
    use crate::movement::scanner::SurfaceScanner;
    use crate::movement::state::PlaneConstraint;

    fn config() -> MovementConfig {
        MovementConfig::default()
    }

    /// Floor with its top at y=0 and a tall wall whose face is at x=0.6.
    fn wall_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0), ContentFlags::SOLID);
        world.add_box(Vec3::new(1.1, 4.0, 0.0), Vec3::new(0.5, 4.0, 10.0), ContentFlags::SOLID);
        world
    }

    fn host_at(position: Vec3, yaw: f32) -> RecordingHost {
        let mut body = CharacterBody::new(position, &config());
        body.rotation = rotation_from_yaw(yaw);
        RecordingHost::new(body)
    }

    fn scan(host: &RecordingHost, world: &CollisionWorld) -> Vec<WallHit> {
        let mut scanner = SurfaceScanner::new(&config().climb, QueryFilter::world_static());
        scanner.scan(host.position(), host.forward(), world).to_vec()
    }

    fn climbing(world: &CollisionWorld, host: &mut RecordingHost) -> ClimbStateMachine {
        let mut climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());
        let hits = scan(host, world);
        assert!(climb.try_climbing(host, world, &hits));
        climb.enter(host);
        climb
    }

    #[test]
    fn test_can_start_climbing_within_angle() {
        let world = wall_world();
        let climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());

        let facing = host_at(Vec3::new(0.0, 0.96, 0.0), 10.0_f32.to_radians());
        let hits = scan(&facing, &world);
        assert!(!hits.is_empty());
        assert!(climb.can_start_climbing(&facing, &world, &hits));

        let oblique = host_at(Vec3::new(0.0, 0.96, 0.0), 40.0_f32.to_radians());
        let hits = scan(&oblique, &world);
        assert!(!hits.is_empty());
        assert!(!climb.can_start_climbing(&oblique, &world, &hits));
    }

    #[test]
    fn test_horizontal_surfaces_are_not_climbable() {
        let world = wall_world();
        let climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());
        let host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);

        let floor_hit = WallHit::new(Vec3::new(0.5, 0.0, 0.0), Vec3::Y);
        assert!(!climb.can_start_climbing(&host, &world, &[floor_hit]));
    }

    #[test]
    fn test_ceiling_check_only_rejects_flat_normals() {
        let world = wall_world();
        let climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());
        let host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);

        // Barely tilted toward the character: the vertical dot is tiny but not zero
        let tilted_hit = WallHit::new(Vec3::new(0.6, 1.0, 0.0), Vec3::new(-5.0e-5, 1.0, 0.0));
        assert!(climb.can_start_climbing(&host, &world, &[tilted_hit]));
    }

    #[test]
    fn test_intent_is_last_write_wins() {
        let world = wall_world();
        let host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);
        let hits = scan(&host, &world);
        let mut climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());

        assert!(climb.try_climbing(&host, &world, &hits));
        climb.cancel_climbing();
        assert!(!climb.wants_to_climb());

        // Nothing to climb: the request is ignored
        assert!(!climb.try_climbing(&host, &world, &[]));
        assert!(!climb.wants_to_climb());
    }

    #[test]
    fn test_enter_and_exit_are_paired() {
        let world = wall_world();
        let mut host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);
        host.set_gravity_scale(1.75);
        host.set_velocity(Vec3::new(1.0, 2.0, 0.0));

        let mut climb = climbing(&world, &mut host);
        climb.enter(&mut host);

        assert_eq!(host.capsule_shrinks, 1);
        assert!((host.capsule().half_height - 0.66).abs() < 1.0e-5);
        assert!(!host.orient_rotation_to_movement());
        assert_eq!(host.velocity(), Vec3::ZERO);

        host.set_gravity_scale(0.0);
        assert!(climb.exit(&mut host, &world));
        assert!(!climb.exit(&mut host, &world));

        assert_eq!(host.capsule_restores, 1);
        assert!((host.capsule().half_height - 0.96).abs() < 1.0e-5);
        assert_eq!(host.gravity_scale(), 1.75);
        assert!(host.orient_rotation_to_movement());
        assert!(!climb.wants_to_climb());
        assert_eq!(host.plane_clears, 0);
    }

    #[test]
    fn test_exit_clears_plane_constraint() {
        let world = wall_world();
        let mut host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);
        let mut climb = climbing(&world, &mut host);

        host.set_plane_constraint(Some(PlaneConstraint::new(Vec3::ZERO, Vec3::X)));
        climb.exit(&mut host, &world);

        assert_eq!(host.plane_clears, 1);
        assert!(host.plane_constraint().is_none());
    }

    #[test]
    fn test_exit_when_surface_lost() {
        let world = wall_world();
        let mut host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);
        let mut climb = climbing(&world, &mut host);

        let step = climb.phys_climbing(&mut host, &world, &[], 1.0 / 60.0);
        assert_eq!(step, ClimbStep::Exit(ClimbExitReason::SurfaceLost));
        assert_eq!(climb.surface().normal, Vec3::ZERO);
    }

    #[test]
    fn test_exit_when_intent_cleared() {
        let world = wall_world();
        let mut host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);
        let mut climb = climbing(&world, &mut host);
        let hits = scan(&host, &world);

        climb.cancel_climbing();
        let step = climb.phys_climbing(&mut host, &world, &hits, 1.0 / 60.0);
        assert_eq!(step, ClimbStep::Exit(ClimbExitReason::IntentCleared));
    }

    #[test]
    fn test_exit_on_ceiling_normal() {
        let world = wall_world();
        let mut host = host_at(Vec3::new(0.0, 0.96, 0.0), 0.0);
        let mut climb = climbing(&world, &mut host);

        // Only surface is the floor straight below: aggregate normal is up
        let below = WallHit::new(Vec3::new(0.0, 0.0, 0.0), Vec3::Y);
        let step = climb.phys_climbing(&mut host, &world, &[below], 1.0 / 60.0);

        assert_eq!(step, ClimbStep::Exit(ClimbExitReason::Ceiling));
        assert!(climb.surface().normal.dot(Vec3::Y) > 0.999);
    }

    #[test]
    fn test_exit_when_climbing_down_onto_floor() {
        let world = wall_world();
        let mut host = host_at(Vec3::new(0.0, 0.9, 0.0), 0.0);
        let mut climb = climbing(&world, &mut host);
        let hits = scan(&host, &world);

        host.set_velocity(Vec3::new(0.0, -0.6, 0.0));
        let step = climb.phys_climbing(&mut host, &world, &hits, 1.0 / 60.0);
        assert_eq!(step, ClimbStep::Exit(ClimbExitReason::ReachedFloor));
    }

    #[test]
    fn test_climbing_moves_up_the_wall() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(1.1, 4.0, 0.0), Vec3::new(0.5, 4.0, 10.0), ContentFlags::SOLID);
        let mut host = host_at(Vec3::new(0.09, 1.5, 0.0), 0.0);
        let mut climb = climbing(&world, &mut host);

        for _ in 0..30 {
            host.set_acceleration(Vec3::Y * climb.config().max_climbing_acceleration);
            let hits = scan(&host, &world);
            let step = climb.phys_climbing(&mut host, &world, &hits, 1.0 / 60.0);
            assert_eq!(step, ClimbStep::Continue);
        }

        let surface = climb.surface();
        assert!(surface.normal.dot(-Vec3::X) > 0.99);
        assert!((surface.normal.length() - 1.0).abs() < 1.0e-4);
        assert!(host.position().y > 1.6, "y={}", host.position().y);
        assert!(host.position().x > 0.0 && host.position().x < 0.18, "x={}", host.position().x);
        assert!(host.velocity().y > 0.0);
    }

    #[test]
    fn test_ledge_mount_is_idempotent() {
        let mut world = CollisionWorld::new();
        // Ledge block: face at x=1, top at y=1.5
        world.add_box(Vec3::new(2.5, 0.75, 0.0), Vec3::new(1.5, 0.75, 5.0), ContentFlags::SOLID);

        let mut host = host_at(Vec3::new(0.49, 1.2, 0.0), 0.0);
        host.set_velocity(Vec3::new(0.0, 1.0, 0.0));
        let climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());

        assert!(climb.has_reached_edge(&host, &world));
        assert!(climb.can_move_to_ledge_climb_location(&host, &world));

        assert!(climb.try_climb_up_ledge(&mut host, &world));
        assert!(host.is_ledge_climb_playing());

        assert!(!climb.try_climb_up_ledge(&mut host, &world));
    }

    #[test]
    fn test_ledge_mount_needs_upward_speed() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(2.5, 0.75, 0.0), Vec3::new(1.5, 0.75, 5.0), ContentFlags::SOLID);

        let mut host = host_at(Vec3::new(0.49, 1.2, 0.0), 0.0);
        host.set_velocity(Vec3::new(0.0, 0.2, 0.0));
        let climb = ClimbStateMachine::new(&config(), QueryFilter::world_static());

        assert!(!climb.try_climb_up_ledge(&mut host, &world));
        assert!(!host.is_ledge_climb_playing());
    }
}
