//! Character movement component.
//!
//! [`CharacterMovement`] owns the movement mode of one character. Each
//! update it splits the frame into physics sub-steps, runs the physics of
//! the current mode, turns the character and switches into climbing when it
//! was requested. Wall hits for climbing are refreshed once at the end of
//! the update.

use glam::Vec3;

use crate::collision::{CollisionWorld, QueryFilter};

use super::climb::{ClimbStateMachine, ClimbStep};
use super::config::MovementConfig;
use super::host::LocomotionHost;
use super::kinematics::{calc_velocity, rotate_toward, rotation_from_forward, rotation_from_yaw, safe_normal_2d, MIN_TICK_TIME};
use super::scanner::{SurfaceScanner, WallHit};
use super::slide_move::{clip_velocity, slide_move, step_slide_move};
use super::state::{ClimbExitReason, MovementDirectionType, MovementEvent, MovementMode};

/// Length of the downward ground probe (meters).
const GROUND_TRACE_DISTANCE: f32 = 0.1;

/// Upward speed above which the character never counts as grounded.
const LIFTOFF_SPEED: f32 = 0.1;

/// Movement component for one character.
///
/// # Example
///
/// ```ignore
/// let mut movement = CharacterMovement::new(MovementConfig::default());
/// let mut body = CharacterBody::new(spawn, &movement.config);
/// movement.spawn_at(&mut body, spawn, &world);
///
/// // Each frame:
/// movement.apply_input(&mut body, direction);
/// movement.tick(&mut body, &world, delta_time);
/// for event in movement.drain_events() { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub struct CharacterMovement {
    /// Movement configuration.
    pub config: MovementConfig,
    scanner: SurfaceScanner,
    climb: ClimbStateMachine,
    events: Vec<MovementEvent>,
    ground_normal: Vec3,
    crouching: bool,
    sprinting: bool,
    direction_type: MovementDirectionType,
    control_yaw: f32,
    show_debug_traversal: bool,
}

impl CharacterMovement {
    /// Create a movement component probing static world geometry.
    pub fn new(config: MovementConfig) -> Self {
        Self::with_query_filter(config, QueryFilter::world_static())
    }

    /// Create a movement component whose climbing probes use `filter`.
    pub fn with_query_filter(config: MovementConfig, filter: QueryFilter) -> Self {
        Self {
            scanner: SurfaceScanner::new(&config.climb, filter),
            climb: ClimbStateMachine::new(&config, filter),
            config,
            events: Vec::new(),
            ground_normal: Vec3::Y,
            crouching: false,
            sprinting: false,
            direction_type: MovementDirectionType::OrientToMovement,
            control_yaw: 0.0,
            show_debug_traversal: false,
        }
    }

    /// Create a component with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(MovementConfig::default())
    }

    /// Place the character on the ground below `spawn_pos`.
    ///
    /// Traces down from slightly above the spawn point. Without ground the
    /// character is placed at `spawn_pos` and starts falling.
    pub fn spawn_at(&mut self, host: &mut impl LocomotionHost, spawn_pos: Vec3, world: &CollisionWorld) {
        let shape = host.capsule().trace_shape();
        let trace_start = spawn_pos + Vec3::Y * (1.0 + shape.half_height());
        let trace_end = spawn_pos - Vec3::Y * 2.0;

        let trace = world.trace(trace_start, trace_end, shape, host.query_filter());
        host.stop_movement_immediately();

        match trace.hit_normal {
            Some(normal) if normal.y >= self.config.min_ground_normal => {
                host.set_position(trace.end_position);
                self.ground_normal = normal;
                self.set_movement_mode(host, world, MovementMode::Walking);
            }
            _ => {
                host.set_position(spawn_pos);
                self.set_movement_mode(host, world, MovementMode::Falling);
            }
        }

        self.refresh_wall_hits(host, world);
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Advance movement by `delta_time` seconds.
    pub fn tick(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        self.sync_climb_session(host, world);

        let max_step = self.config.max_simulation_time_step.max(MIN_TICK_TIME);
        let max_iterations = self.config.max_simulation_iterations.max(1);

        let mut remaining = delta_time.max(0.0);
        let mut iterations = 0;

        while remaining >= MIN_TICK_TIME && iterations < max_iterations {
            iterations += 1;

            let step = if remaining > max_step && iterations < max_iterations {
                // Split evenly rather than leave a sliver for the last step
                if remaining < 2.0 * max_step {
                    remaining * 0.5
                } else {
                    max_step
                }
            } else {
                remaining
            };
            remaining -= step;

            self.start_new_physics(host, world, step);
            host.advance_root_motion(step);
            self.physics_rotation(host, step);
            self.on_movement_updated(host, world);
        }

        self.refresh_wall_hits(host, world);
    }

    /// Re-run the wall scan from the host's current pose.
    pub fn refresh_wall_hits(&mut self, host: &impl LocomotionHost, world: &CollisionWorld) -> &[WallHit] {
        self.scanner.scan(host.position(), host.forward(), world)
    }

    fn start_new_physics(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        let mode = host.movement_mode();

        if !mode.is_climbing() {
            if let Some(root_motion) = host.root_motion_velocity() {
                self.phys_root_motion(host, world, root_motion, delta_time);
                return;
            }
        }

        match mode {
            MovementMode::Walking => self.phys_walking(host, world, delta_time),
            MovementMode::Falling => self.phys_falling(host, world, delta_time),
            MovementMode::Flying => self.phys_flying(host, world, delta_time),
            MovementMode::Custom(_) => self.phys_custom(host, world, delta_time),
        }
    }

    fn on_movement_updated(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld) {
        if self.climb.wants_to_climb() {
            self.set_movement_mode(host, world, MovementMode::CLIMBING);
        }
    }

    /// Catch mode changes made directly on the host.
    fn sync_climb_session(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld) {
        let climbing = host.is_climbing();
        if self.climb.is_active() && !climbing {
            self.finish_climb(host, world, ClimbExitReason::ModeChanged);
        } else if !self.climb.is_active() && climbing {
            self.climb.enter(host);
            self.events.push(MovementEvent::ClimbStarted);
        }
    }

    // ========================================================================
    // Mode Changes
    // ========================================================================

    /// Switch movement mode, running the climbing enter and exit hooks.
    pub fn set_movement_mode(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, mode: MovementMode) {
        self.change_mode(host, world, mode, ClimbExitReason::ModeChanged);
    }

    fn change_mode(
        &mut self,
        host: &mut impl LocomotionHost,
        world: &CollisionWorld,
        mode: MovementMode,
        exit_reason: ClimbExitReason,
    ) {
        let previous = host.movement_mode();
        if previous == mode {
            return;
        }

        host.set_movement_mode(mode);
        log::trace!("movement mode {:?} -> {:?}", previous, mode);

        if mode.is_climbing() {
            self.climb.enter(host);
            self.events.push(MovementEvent::ClimbStarted);
        }

        if previous.is_climbing() {
            self.finish_climb(host, world, exit_reason);
        }
    }

    fn finish_climb(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, reason: ClimbExitReason) {
        if self.climb.exit(host, world) {
            self.events.push(MovementEvent::ClimbEnded { reason });
        }
    }

    // ========================================================================
    // Climbing
    // ========================================================================

    fn phys_custom(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        if !host.is_climbing() {
            return;
        }

        match self.climb.phys_climbing(host, world, self.scanner.hits(), delta_time) {
            ClimbStep::Continue => {}
            ClimbStep::LedgeMount => self.events.push(MovementEvent::LedgeClimbStarted),
            ClimbStep::Exit(reason) => {
                self.change_mode(host, world, MovementMode::Falling, reason);
                self.phys_falling(host, world, delta_time);
            }
        }
    }

    /// Request climbing against the currently scanned walls. Refused while
    /// crouched.
    pub fn try_climbing(&mut self, host: &impl LocomotionHost, world: &CollisionWorld) -> bool {
        if self.crouching {
            return false;
        }
        self.climb.try_climbing(host, world, self.scanner.hits())
    }

    /// Clear the climbing request. Climbing ends on the next update.
    pub fn cancel_climbing(&mut self) {
        self.climb.cancel_climbing();
    }

    pub fn is_climbing(&self, host: &impl LocomotionHost) -> bool {
        host.is_climbing()
    }

    /// Whether climbing is currently requested.
    pub fn wants_to_climb(&self) -> bool {
        self.climb.wants_to_climb()
    }

    /// Aggregate normal of the climbed surface; zero when not climbing.
    pub fn climb_surface_normal(&self) -> Vec3 {
        if self.climb.is_active() {
            self.climb.surface().normal
        } else {
            Vec3::ZERO
        }
    }

    /// Walls found by the last scan.
    pub fn wall_hits(&self) -> &[WallHit] {
        self.scanner.hits()
    }

    pub fn scanner(&self) -> &SurfaceScanner {
        &self.scanner
    }

    pub fn climb(&self) -> &ClimbStateMachine {
        &self.climb
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<MovementEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Speeds and Input
    // ========================================================================

    /// Max speed in the current mode.
    pub fn max_speed(&self, host: &impl LocomotionHost) -> f32 {
        match host.movement_mode() {
            MovementMode::Custom(_) => self.config.climb.max_climbing_speed,
            MovementMode::Flying => self.config.fly_speed,
            _ => self.config.ground_speed(self.crouching, self.sprinting),
        }
    }

    /// Max input acceleration in the current mode.
    pub fn max_acceleration(&self, host: &impl LocomotionHost) -> f32 {
        if host.is_climbing() {
            self.config.climb.max_climbing_acceleration
        } else {
            self.config.max_acceleration
        }
    }

    /// Turn a world-space movement direction into input acceleration.
    ///
    /// Directions longer than one are clamped to unit length.
    pub fn apply_input(&self, host: &mut impl LocomotionHost, direction: Vec3) {
        let acceleration = direction.clamp_length_max(1.0) * self.max_acceleration(host);
        host.set_acceleration(acceleration);
    }

    /// Yaw the character turns to when using controller-desired rotation.
    pub fn set_control_yaw(&mut self, yaw: f32) {
        self.control_yaw = yaw;
    }

    pub fn control_yaw(&self) -> f32 {
        self.control_yaw
    }

    pub fn set_sprinting(&mut self, sprinting: bool) {
        self.sprinting = sprinting;
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    /// Record traversal probes for debug drawing. Wall-run tasks started for
    /// this character should follow [`show_debug_traversal`](Self::show_debug_traversal).
    pub fn set_show_debug_traversal(&mut self, enabled: bool) {
        self.show_debug_traversal = enabled;
        self.scanner.set_debug_draw(enabled);
    }

    pub fn show_debug_traversal(&self) -> bool {
        self.show_debug_traversal
    }

    pub fn direction_type(&self) -> MovementDirectionType {
        self.direction_type
    }

    /// Choose how the character's facing follows input.
    pub fn set_movement_direction_type(&mut self, host: &mut impl LocomotionHost, direction_type: MovementDirectionType) {
        self.direction_type = direction_type;
        let (orient, controller) = match direction_type {
            MovementDirectionType::OrientToMovement => (true, false),
            MovementDirectionType::Strafe => (false, true),
            MovementDirectionType::None => (false, false),
        };
        // Climbing restores its own facing flags on exit
        if !host.is_climbing() {
            host.set_orient_rotation_to_movement(orient);
        }
        host.set_use_controller_desired_rotation(controller);
    }

    // ========================================================================
    // Jumping and Crouching
    // ========================================================================

    /// Launch upward. Only possible while walking.
    pub fn jump(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld) -> bool {
        if host.movement_mode() != MovementMode::Walking {
            return false;
        }

        let mut velocity = host.velocity();
        velocity.y = self.config.jump_velocity;
        host.set_velocity(velocity);
        self.set_movement_mode(host, world, MovementMode::Falling);
        true
    }

    /// Shrink to the crouched capsule, keeping the feet in place on ground.
    pub fn crouch(&mut self, host: &mut impl LocomotionHost) -> bool {
        if self.crouching || host.is_climbing() {
            return false;
        }

        let standing = host.capsule().half_height;
        let crouched = self.config.crouched_half_height.min(standing);
        host.set_capsule_half_height(crouched);
        if host.movement_mode().is_moving_on_ground() {
            host.set_position(host.position() - Vec3::Y * (standing - crouched));
        }

        self.crouching = true;
        true
    }

    /// Return to the standing capsule if it fits.
    pub fn uncrouch(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld) -> bool {
        if !self.crouching || host.is_climbing() || self.climb.is_active() {
            return false;
        }

        let crouched = host.capsule().half_height;
        let standing = self.config.capsule_half_height;
        let centre = if host.movement_mode().is_moving_on_ground() {
            host.position() + Vec3::Y * (standing - crouched)
        } else {
            host.position()
        };

        let standing_shape = crate::collision::TraceShape::capsule(host.capsule().radius, standing);
        if world.point_in_solid(centre, standing_shape, host.query_filter()) {
            log::debug!("cannot stand up at {:?}", centre);
            return false;
        }

        host.set_capsule_half_height(standing);
        host.set_position(centre);
        self.crouching = false;
        true
    }

    // ========================================================================
    // Ground Movement
    // ========================================================================

    fn phys_walking(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        let mut velocity = host.velocity();
        self.apply_friction(&mut velocity, delta_time);

        let (wish_direction, wish_speed) = self.wish_velocity(host);
        accelerate(&mut velocity, wish_direction, wish_speed, self.config.ground_acceleration, delta_time);

        // Clip velocity to ground plane for smooth slope movement
        velocity = clip_velocity(velocity, self.ground_normal, self.config.overbounce);

        if velocity.length_squared() < 0.001 {
            host.set_velocity(Vec3::ZERO);
        } else {
            let mut position = host.position();
            step_slide_move(
                world,
                &mut position,
                &mut velocity,
                host.capsule().trace_shape(),
                host.query_filter(),
                delta_time,
                &self.config,
            );
            host.set_position(position);
            host.set_velocity(velocity);
        }

        match self.check_ground(host, world) {
            Some(normal) => self.ground_normal = normal,
            None => {
                self.ground_normal = Vec3::Y;
                self.set_movement_mode(host, world, MovementMode::Falling);
            }
        }
    }

    fn apply_friction(&self, velocity: &mut Vec3, delta_time: f32) {
        let speed = velocity.length();

        if speed < 0.1 {
            // Stop completely when moving very slowly
            velocity.x = 0.0;
            velocity.z = 0.0;
            return;
        }

        let control = speed.max(self.config.stop_speed);
        let drop = control * self.config.friction * delta_time;

        let new_speed = (speed - drop).max(0.0);
        if new_speed != speed {
            *velocity *= new_speed / speed;
        }
    }

    /// Walkable ground just below the host, snapping down onto it.
    fn check_ground(&self, host: &mut impl LocomotionHost, world: &CollisionWorld) -> Option<Vec3> {
        if host.velocity().y > LIFTOFF_SPEED {
            return None;
        }

        let position = host.position();
        let trace = world.trace(
            position,
            position - Vec3::Y * GROUND_TRACE_DISTANCE,
            host.capsule().trace_shape(),
            host.query_filter(),
        );

        let normal = trace.hit_normal?;
        if normal.y < self.config.min_ground_normal {
            return None;
        }

        if trace.fraction > 0.0 && trace.fraction < 1.0 {
            host.set_position(trace.end_position);
        }
        Some(normal)
    }

    // ========================================================================
    // Air Movement
    // ========================================================================

    fn phys_falling(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        let mut velocity = host.velocity();
        velocity.y -= self.config.gravity * host.gravity_scale() * delta_time;

        let (wish_direction, wish_speed) = self.wish_velocity(host);
        accelerate(
            &mut velocity,
            wish_direction,
            wish_speed * self.config.air_control,
            self.config.air_acceleration,
            delta_time,
        );

        self.move_with_slide(host, world, velocity, delta_time);

        if let Some(normal) = self.check_ground(host, world) {
            self.ground_normal = normal;
            let mut landed = host.velocity();
            landed.y = 0.0;
            host.set_velocity(landed);
            self.set_movement_mode(host, world, MovementMode::Walking);
            self.events.push(MovementEvent::Landed);
        }
    }

    // ========================================================================
    // Flying
    // ========================================================================

    /// Gravity-free movement, constrained to the host's plane if it has one.
    fn phys_flying(&mut self, host: &mut impl LocomotionHost, world: &CollisionWorld, delta_time: f32) {
        let velocity = calc_velocity(
            host.velocity(),
            host.acceleration(),
            delta_time,
            self.max_speed(host),
            0.0,
            self.config.braking_deceleration_flying,
        );
        self.move_with_slide(host, world, velocity, delta_time);
    }

    fn phys_root_motion(
        &mut self,
        host: &mut impl LocomotionHost,
        world: &CollisionWorld,
        velocity: Vec3,
        delta_time: f32,
    ) {
        self.move_with_slide(host, world, velocity, delta_time);
    }

    fn move_with_slide(&self, host: &mut impl LocomotionHost, world: &CollisionWorld, velocity: Vec3, delta_time: f32) {
        let mut velocity = match host.plane_constraint() {
            Some(plane) => plane.constrain_direction(velocity),
            None => velocity,
        };

        let mut position = host.position();
        slide_move(
            world,
            &mut position,
            &mut velocity,
            host.capsule().trace_shape(),
            host.query_filter(),
            delta_time,
            &self.config,
        );
        host.set_position(position);
        host.set_velocity(velocity);
    }

    // ========================================================================
    // Shared Movement Helpers
    // ========================================================================

    /// Horizontal wish direction and speed from the input acceleration.
    fn wish_velocity(&self, host: &impl LocomotionHost) -> (Vec3, f32) {
        let acceleration = host.acceleration();
        let direction = safe_normal_2d(acceleration);
        if direction == Vec3::ZERO {
            return (Vec3::ZERO, 0.0);
        }

        let input_magnitude = (acceleration.length() / self.config.max_acceleration.max(1.0e-3)).min(1.0);
        (direction, self.max_speed(host) * input_magnitude)
    }

    fn physics_rotation(&self, host: &mut impl LocomotionHost, delta_time: f32) {
        if host.is_climbing() || host.has_root_motion() {
            return;
        }

        let target = if host.use_controller_desired_rotation() {
            Some(rotation_from_yaw(self.control_yaw))
        } else if host.orient_rotation_to_movement() {
            let heading = safe_normal_2d(host.acceleration());
            (heading != Vec3::ZERO).then(|| rotation_from_forward(heading))
        } else {
            None
        };

        if let Some(target) = target {
            let rotation = rotate_toward(host.rotation(), target, self.config.rotation_rate * delta_time);
            host.set_rotation(rotation);
        }
    }
}

/// Quake-style acceleration toward a wish direction.
fn accelerate(velocity: &mut Vec3, wish_direction: Vec3, wish_speed: f32, acceleration: f32, delta_time: f32) {
    if wish_direction.length_squared() < 0.0001 {
        return;
    }

    let current_speed = velocity.dot(wish_direction);
    let add_speed = wish_speed - current_speed;
    if add_speed <= 0.0 {
        return;
    }

    let accel_speed = (acceleration * delta_time * wish_speed).min(add_speed);
    *velocity += wish_direction * accel_speed;
}

// ============================================================================
// Tests
// ============================================================================
