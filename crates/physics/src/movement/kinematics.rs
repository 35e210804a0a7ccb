//! Velocity integration and rotation helpers shared by the movement modes.

use glam::{Mat3, Quat, Vec3};

/// Time steps shorter than this are ignored.
pub const MIN_TICK_TIME: f32 = 1.0e-6;

/// Braking stops the body outright below this speed (meters/second).
pub const BRAKE_TO_STOP_VELOCITY: f32 = 0.1;

/// Longest braking sub-step when friction is involved.
const MAX_BRAKING_SUBSTEP: f32 = 1.0 / 33.0;

/// Speeds within this fraction above the max still count as "at max".
const OVER_MAX_SPEED_TOLERANCE: f32 = 1.01;

/// Two unit vectors are parallel when the absolute dot exceeds this.
const PARALLEL_THRESHOLD: f32 = 0.999_845;

const SMALL_NUMBER: f32 = 1.0e-8;

/// Whether `velocity` exceeds `max_speed` by more than a small tolerance.
#[inline]
pub fn is_exceeding_max_speed(velocity: Vec3, max_speed: f32) -> bool {
    let max_speed = max_speed.max(0.0) * OVER_MAX_SPEED_TOLERANCE;
    velocity.length_squared() > max_speed * max_speed
}

/// Integrate velocity toward an input acceleration.
///
/// With no input (or when over the speed cap) the velocity brakes using
/// `friction` and `braking_deceleration`; otherwise friction steers the
/// velocity toward the input direction and the acceleration is added,
/// clamped to `max_speed`.
pub fn calc_velocity(
    velocity: Vec3,
    acceleration: Vec3,
    delta_time: f32,
    max_speed: f32,
    friction: f32,
    braking_deceleration: f32,
) -> Vec3 {
    if delta_time < MIN_TICK_TIME {
        return velocity;
    }

    let friction = friction.max(0.0);
    let mut velocity = velocity;
    let zero_acceleration = acceleration.length_squared() < SMALL_NUMBER;
    let over_max = is_exceeding_max_speed(velocity, max_speed);

    if zero_acceleration || over_max {
        let old_velocity = velocity;
        velocity = apply_velocity_braking(velocity, delta_time, friction, braking_deceleration);

        // Don't let braking drop us below max speed while still pushing forward
        if over_max && velocity.length_squared() < max_speed * max_speed && acceleration.dot(old_velocity) > 0.0 {
            velocity = old_velocity.normalize_or_zero() * max_speed;
        }
    } else {
        let accel_direction = acceleration.normalize_or_zero();
        let speed = velocity.length();
        velocity -= (velocity - accel_direction * speed) * (delta_time * friction).min(1.0);
    }

    if !zero_acceleration {
        let max_input_speed = if is_exceeding_max_speed(velocity, max_speed) {
            velocity.length()
        } else {
            max_speed
        };
        velocity += acceleration * delta_time;
        velocity = velocity.clamp_length_max(max_input_speed);
    }

    velocity
}

/// Slow a velocity down with friction and a constant braking deceleration.
pub fn apply_velocity_braking(velocity: Vec3, delta_time: f32, friction: f32, braking_deceleration: f32) -> Vec3 {
    if velocity.length_squared() < SMALL_NUMBER || delta_time < MIN_TICK_TIME {
        return velocity;
    }

    let zero_friction = friction <= 0.0;
    let zero_braking = braking_deceleration <= 0.0;
    if zero_friction && zero_braking {
        return velocity;
    }

    let old_velocity = velocity;
    let reverse_acceleration = if zero_braking {
        Vec3::ZERO
    } else {
        -braking_deceleration * velocity.normalize_or_zero()
    };

    let mut velocity = velocity;
    let mut remaining = delta_time;
    while remaining >= MIN_TICK_TIME {
        let step = if zero_friction {
            remaining
        } else {
            remaining.min(MAX_BRAKING_SUBSTEP)
        };
        remaining -= step;

        velocity += (-friction * velocity + reverse_acceleration) * step;

        // Braking never reverses direction
        if velocity.dot(old_velocity) <= 0.0 {
            return Vec3::ZERO;
        }
    }

    let speed_squared = velocity.length_squared();
    if speed_squared < SMALL_NUMBER
        || (!zero_braking && speed_squared <= BRAKE_TO_STOP_VELOCITY * BRAKE_TO_STOP_VELOCITY)
    {
        Vec3::ZERO
    } else {
        velocity
    }
}

/// Horizontal part of a vector, normalized. Zero if there is none.
#[inline]
pub fn safe_normal_2d(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// Whether two directions are parallel (or anti-parallel).
#[inline]
pub fn is_parallel(a: Vec3, b: Vec3) -> bool {
    a.normalize_or_zero().dot(b.normalize_or_zero()).abs() >= PARALLEL_THRESHOLD
}

/// Rotation whose forward (local X) axis points along `forward`, keeping
/// local Y as close to world up as possible.
pub fn rotation_from_forward(forward: Vec3) -> Quat {
    let x = forward.normalize_or_zero();
    if x == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let reference = if x.y.abs() > 0.9999 { Vec3::NEG_X } else { Vec3::Y };
    let z = x.cross(reference).normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// The yaw part of a rotation: same heading, no pitch or roll.
pub fn yaw_only(rotation: Quat) -> Quat {
    let heading = safe_normal_2d(rotation * Vec3::X);
    if heading != Vec3::ZERO {
        return rotation_from_forward(heading);
    }

    // Looking straight up or down: the up axis carries the heading
    let heading = safe_normal_2d(rotation * Vec3::Y * -(rotation * Vec3::X).y.signum());
    if heading != Vec3::ZERO {
        rotation_from_forward(heading)
    } else {
        Quat::IDENTITY
    }
}

/// Rotation facing a yaw angle; yaw 0 faces +X, positive yaw turns toward +Z.
#[inline]
pub fn rotation_from_yaw(yaw: f32) -> Quat {
    Quat::from_rotation_y(-yaw)
}

/// Exponential interpolation between rotations at `speed`.
pub fn interp_rotation(current: Quat, target: Quat, delta_time: f32, speed: f32) -> Quat {
    if speed <= 0.0 || current.dot(target).abs() > 1.0 - 1.0e-6 {
        return target;
    }
    let alpha = (speed * delta_time).clamp(0.0, 1.0);
    current.slerp(target, alpha).normalize()
}

/// Rotate toward `target` by at most `max_angle` radians.
pub fn rotate_toward(current: Quat, target: Quat, max_angle: f32) -> Quat {
    let angle = current.angle_between(target);
    if angle <= max_angle || angle < 1.0e-5 {
        target
    } else {
        current.slerp(target, max_angle / angle).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_velocity_clamps_to_max_speed() {
        let mut velocity = Vec3::ZERO;
        for _ in 0..120 {
            velocity = calc_velocity(velocity, Vec3::Y * 3.8, 1.0 / 60.0, 1.2, 0.0, 5.5);
        }
        assert!((velocity.length() - 1.2).abs() < 1.0e-3, "speed={}", velocity.length());
        assert!(velocity.normalize().dot(Vec3::Y) > 0.999);
    }

    #[test]
    fn test_calc_velocity_brakes_without_input() {
        let mut velocity = Vec3::new(0.0, 1.2, 0.0);
        for _ in 0..30 {
            velocity = calc_velocity(velocity, Vec3::ZERO, 1.0 / 60.0, 1.2, 0.0, 5.5);
        }
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_braking_without_friction_or_deceleration_is_noop() {
        let velocity = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(apply_velocity_braking(velocity, 0.1, 0.0, 0.0), velocity);
    }

    #[test]
    fn test_rotation_from_forward_axes() {
        let rotation = rotation_from_forward(Vec3::Z);
        assert!((rotation * Vec3::X).dot(Vec3::Z) > 0.999);
        assert!((rotation * Vec3::Y).dot(Vec3::Y) > 0.999);

        let identity = rotation_from_forward(Vec3::X);
        assert!((identity * Vec3::Z).dot(Vec3::Z) > 0.999);
    }

    #[test]
    fn test_rotation_from_yaw_matches_forward() {
        let yaw = 0.7_f32;
        let rotation = rotation_from_yaw(yaw);
        let forward = rotation * Vec3::X;
        assert!((forward - Vec3::new(yaw.cos(), 0.0, yaw.sin())).length() < 1.0e-5);
    }

    #[test]
    fn test_yaw_only_drops_pitch() {
        let pitched = rotation_from_forward(Vec3::new(1.0, 1.0, 0.0));
        let flat = yaw_only(pitched);
        let forward = flat * Vec3::X;
        assert!(forward.y.abs() < 1.0e-5);
        assert!(forward.dot(Vec3::X) > 0.999);
    }

    #[test]
    fn test_interp_rotation_converges() {
        let target = rotation_from_forward(Vec3::Z);
        let mut current = Quat::IDENTITY;
        for _ in 0..120 {
            current = interp_rotation(current, target, 1.0 / 60.0, 6.0);
        }
        assert!(current.angle_between(target) < 0.01);
    }

    #[test]
    fn test_parallel() {
        assert!(is_parallel(Vec3::Y, Vec3::NEG_Y));
        assert!(!is_parallel(Vec3::Y, Vec3::X));
        assert!(!is_parallel(Vec3::ZERO, Vec3::Y));
    }
}
