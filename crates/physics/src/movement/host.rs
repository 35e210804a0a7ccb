//! The locomotion host: the body that movement modes drive.
//!
//! [`LocomotionHost`] is the seam between movement logic (climbing, wall
//! running, walking) and the thing being moved. [`CharacterBody`] is the
//! concrete host used by the game: plain state plus collision-checked moves
//! through a [`CollisionWorld`].

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionWorld, QueryFilter, TraceResult};

use super::config::{LedgeClimbMontage, MovementConfig};
use super::kinematics::{safe_normal_2d, yaw_only};
use super::slide_move::clip_velocity;
use super::state::{CapsuleShape, MovementMode, PlaneConstraint};

/// Everything movement logic needs from the body it moves.
///
/// Local axes: forward is `rotation * X`, up is `rotation * Y`, right is
/// `rotation * Z`.
pub trait LocomotionHost {
    /// Capsule centre in world space.
    fn position(&self) -> Vec3;
    /// Teleport without collision.
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    /// Input acceleration requested for this update.
    fn acceleration(&self) -> Vec3;
    fn set_acceleration(&mut self, acceleration: Vec3);

    fn capsule(&self) -> CapsuleShape;
    fn set_capsule_half_height(&mut self, half_height: f32);

    /// Current mode. Only the movement component changes it.
    fn movement_mode(&self) -> MovementMode;
    fn set_movement_mode(&mut self, mode: MovementMode);

    fn gravity_scale(&self) -> f32;
    fn set_gravity_scale(&mut self, scale: f32);
    fn plane_constraint(&self) -> Option<PlaneConstraint>;
    fn set_plane_constraint(&mut self, constraint: Option<PlaneConstraint>);

    fn orient_rotation_to_movement(&self) -> bool;
    fn set_orient_rotation_to_movement(&mut self, enabled: bool);
    fn use_controller_desired_rotation(&self) -> bool;
    fn set_use_controller_desired_rotation(&mut self, enabled: bool);

    /// Eye height above the capsule centre, unaffected by capsule changes.
    fn eye_height(&self) -> f32;

    /// Velocity dictated by a playing root-motion animation.
    fn root_motion_velocity(&self) -> Option<Vec3>;
    /// Advance root-motion playback.
    fn advance_root_motion(&mut self, delta_time: f32);
    fn is_ledge_climb_playing(&self) -> bool;
    fn play_ledge_climb(&mut self, montage: &LedgeClimbMontage);

    /// Sweep the capsule by `delta`, stopping at the first blocking hit, and
    /// apply `rotation`.
    fn move_with_collision(&mut self, world: &CollisionWorld, delta: Vec3, rotation: Quat) -> TraceResult;

    /// Filter used for this body's movement sweeps.
    fn query_filter(&self) -> QueryFilter {
        QueryFilter::player_solid()
    }

    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    fn has_root_motion(&self) -> bool {
        self.root_motion_velocity().is_some()
    }

    fn is_climbing(&self) -> bool {
        self.movement_mode().is_climbing()
    }

    /// Zero velocity and input acceleration.
    fn stop_movement_immediately(&mut self) {
        self.set_velocity(Vec3::ZERO);
        self.set_acceleration(Vec3::ZERO);
    }

    /// Push the capsule out of anything it overlaps.
    fn fix_penetration(&mut self, world: &CollisionWorld) {
        let resolved = world.resolve_penetration(self.position(), self.capsule().trace_shape(), self.query_filter());
        self.set_position(resolved);
    }

    /// Continue a blocked move along the blocking surface.
    ///
    /// `delta` is the original move, `time` the unused fraction of it and
    /// `normal` the blocking normal. Returns the fraction of `time` applied.
    fn slide_along_surface(&mut self, world: &CollisionWorld, delta: Vec3, time: f32, normal: Vec3) -> f32 {
        let slide = clip_velocity(delta, normal, 1.0) * time;
        if slide.dot(delta) <= 0.0 {
            return 0.0;
        }

        let rotation = self.rotation();
        let hit = self.move_with_collision(world, slide, rotation);
        let mut applied = hit.fraction;

        if let (true, Some(second_normal)) = (hit.is_blocked(), hit.hit_normal) {
            // Second wall: follow the crease if the two normals pinch
            let remaining = slide * (1.0 - hit.fraction);
            let mut adjusted = clip_velocity(remaining, second_normal, 1.0);
            if adjusted.dot(normal) < 0.0 {
                let crease = normal.cross(second_normal).normalize_or_zero();
                adjusted = crease * remaining.dot(crease);
            }

            if adjusted.length_squared() > 1.0e-6 && adjusted.dot(delta) > 0.0 {
                let second = self.move_with_collision(world, adjusted, rotation);
                applied += (1.0 - applied) * second.fraction;
            }
        }

        applied.clamp(0.0, 1.0)
    }
}

/// Root-motion playback of the ledge mount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMotionPlayback {
    elapsed: f32,
    duration: f32,
    rise_until: f32,
    rise_velocity: Vec3,
    advance_velocity: Vec3,
}

impl RootMotionPlayback {
    /// Start the ledge mount facing `forward`.
    pub fn ledge_climb(montage: &LedgeClimbMontage, forward: Vec3) -> Self {
        let duration = montage.duration.max(1.0e-3);
        let rise_time = duration * montage.rise_fraction.clamp(0.05, 0.95);
        let advance_time = duration - rise_time;
        let heading = safe_normal_2d(forward);

        Self {
            elapsed: 0.0,
            duration,
            rise_until: rise_time,
            rise_velocity: Vec3::Y * (montage.rise / rise_time),
            advance_velocity: heading * (montage.advance / advance_time),
        }
    }

    /// Velocity at the current playback time.
    pub fn velocity(&self) -> Vec3 {
        if self.elapsed < self.rise_until {
            self.rise_velocity
        } else {
            self.advance_velocity
        }
    }

    /// Whether playback has reached the end.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn advance(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
    }
}

/// Concrete character body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterBody {
    /// Capsule centre in world space.
    pub position: Vec3,
    pub rotation: Quat,
    /// Velocity in world space (meters/second).
    pub velocity: Vec3,
    /// Input acceleration (meters/second²).
    pub acceleration: Vec3,
    capsule: CapsuleShape,
    mode: MovementMode,
    gravity_scale: f32,
    plane_constraint: Option<PlaneConstraint>,
    orient_rotation_to_movement: bool,
    use_controller_desired_rotation: bool,
    eye_height: f32,
    root_motion: Option<RootMotionPlayback>,
    filter: QueryFilter,
}

impl CharacterBody {
    /// Create a body centred at `position` with the configured capsule.
    pub fn new(position: Vec3, config: &MovementConfig) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            capsule: CapsuleShape::new(config.capsule_radius, config.capsule_half_height),
            mode: MovementMode::Falling,
            gravity_scale: 1.0,
            plane_constraint: None,
            orient_rotation_to_movement: true,
            use_controller_desired_rotation: false,
            eye_height: config.eye_height,
            root_motion: None,
            filter: QueryFilter::player_solid(),
        }
    }

    /// Eye position in world space.
    pub fn eye_position(&self) -> Vec3 {
        self.position + self.up() * self.eye_height
    }

    /// Bottom of the capsule.
    pub fn feet_position(&self) -> Vec3 {
        self.position - Vec3::Y * self.capsule.half_height
    }
}

impl LocomotionHost for CharacterBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    fn capsule(&self) -> CapsuleShape {
        self.capsule
    }

    fn set_capsule_half_height(&mut self, half_height: f32) {
        self.capsule.half_height = half_height.max(self.capsule.radius);
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) {
        self.mode = mode;
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    fn plane_constraint(&self) -> Option<PlaneConstraint> {
        self.plane_constraint
    }

    fn set_plane_constraint(&mut self, constraint: Option<PlaneConstraint>) {
        self.plane_constraint = constraint;
    }

    fn orient_rotation_to_movement(&self) -> bool {
        self.orient_rotation_to_movement
    }

    fn set_orient_rotation_to_movement(&mut self, enabled: bool) {
        self.orient_rotation_to_movement = enabled;
    }

    fn use_controller_desired_rotation(&self) -> bool {
        self.use_controller_desired_rotation
    }

    fn set_use_controller_desired_rotation(&mut self, enabled: bool) {
        self.use_controller_desired_rotation = enabled;
    }

    fn eye_height(&self) -> f32 {
        self.eye_height
    }

    fn root_motion_velocity(&self) -> Option<Vec3> {
        self.root_motion.as_ref().map(RootMotionPlayback::velocity)
    }

    fn advance_root_motion(&mut self, delta_time: f32) {
        if let Some(playback) = self.root_motion.as_mut() {
            playback.advance(delta_time);
            if playback.is_finished() {
                log::debug!("ledge climb finished at {:?}", self.position);
                self.root_motion = None;
            }
        }
    }

    fn is_ledge_climb_playing(&self) -> bool {
        self.root_motion.is_some()
    }

    fn play_ledge_climb(&mut self, montage: &LedgeClimbMontage) {
        self.root_motion = Some(RootMotionPlayback::ledge_climb(montage, yaw_only(self.rotation) * Vec3::X));
    }

    fn move_with_collision(&mut self, world: &CollisionWorld, delta: Vec3, rotation: Quat) -> TraceResult {
        self.set_rotation(rotation);
        if delta.length_squared() < 1.0e-12 {
            return TraceResult::no_hit(self.position);
        }

        let shape = self.capsule.trace_shape();
        let mut trace = world.trace(self.position, self.position + delta, shape, self.filter);

        // Stuck inside something we are moving into: depenetrate and retry once
        if trace.started_in_solid && trace.fraction <= 0.0 {
            let resolved = world.resolve_penetration(self.position, shape, self.filter);
            if resolved != self.position {
                self.position = resolved;
                trace = world.trace(self.position, self.position + delta, shape, self.filter);
            }
        }

        self.position = trace.end_position;
        trace
    }

    fn query_filter(&self) -> QueryFilter {
        self.filter
    }
}
