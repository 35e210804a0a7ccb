//! Slide move algorithm for collision response.
//!
//! This implements the classic Quake slide move algorithm that allows
//! smooth movement along walls and around corners. Walking, falling and
//! flying all move through it.

use glam::Vec3;

use crate::collision::{CollisionWorld, QueryFilter, TraceShape};

use super::config::MovementConfig;

/// Maximum number of collision planes to track during slide move.
const MAX_CLIP_PLANES: usize = 5;

/// Clip velocity against a surface normal.
///
/// This removes the component of velocity going into the surface and
/// optionally adds a small "overbounce" to prevent sticking.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);

    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };

    velocity - normal * adjusted_backoff
}

/// Outcome of a slide move.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlideOutcome {
    /// Whether the full move happened without touching anything.
    pub clear: bool,
    /// Most upward-facing normal touched during the move.
    pub floor_normal: Option<Vec3>,
}

/// Perform a slide move through the collision world.
///
/// This is the core algorithm that handles collision response. It:
/// 1. Traces the shape along the velocity
/// 2. If collision occurs, clips velocity to slide along surface
/// 3. Continues tracing with clipped velocity
/// 4. Handles corner cases with multiple surfaces
///
/// `position` is the shape centre.
pub fn slide_move(
    world: &CollisionWorld,
    position: &mut Vec3,
    velocity: &mut Vec3,
    shape: TraceShape,
    filter: QueryFilter,
    delta_time: f32,
    config: &MovementConfig,
) -> SlideOutcome {
    let mut time_remaining = delta_time;
    let original_velocity = *velocity;
    let mut planes: [Vec3; MAX_CLIP_PLANES] = [Vec3::ZERO; MAX_CLIP_PLANES];
    let mut num_planes = 0;
    let mut outcome = SlideOutcome::default();

    for _ in 0..config.max_clip_planes.max(1) {
        if velocity.length_squared() < 0.0001 {
            break;
        }

        let move_delta = *velocity * time_remaining;
        let trace = world.trace(*position, *position + move_delta, shape, filter);

        if trace.fraction >= 1.0 {
            *position = trace.end_position;
            outcome.clear = num_planes == 0;
            return outcome;
        }

        if trace.fraction > 0.0 {
            *position = trace.end_position;
        }

        time_remaining *= 1.0 - trace.fraction;

        let Some(normal) = trace.hit_normal else {
            break;
        };

        if outcome.floor_normal.map_or(true, |n| normal.y > n.y) {
            outcome.floor_normal = Some(normal);
        }

        // Pushing deeper into something we already overlap: just clip
        if trace.started_in_solid && trace.fraction <= 0.0 {
            *velocity = clip_velocity(*velocity, normal, config.overbounce);
            if num_planes < MAX_CLIP_PLANES {
                planes[num_planes] = normal;
                num_planes += 1;
            }
            continue;
        }

        if num_planes < MAX_CLIP_PLANES {
            planes[num_planes] = normal;
            num_planes += 1;
        }

        // Try to clip velocity to slide along all encountered planes
        let mut clipped = *velocity;
        let mut found_valid = false;

        for i in 0..num_planes {
            clipped = clip_velocity(clipped, planes[i], config.overbounce);

            let valid = (0..num_planes)
                .filter(|&j| j != i)
                .all(|j| clipped.dot(planes[j]) >= -0.01);

            if valid {
                *velocity = clipped;
                found_valid = true;
                break;
            }
        }

        if !found_valid {
            if num_planes >= 2 {
                // Slide along the crease of the first two planes
                let crease = planes[0].cross(planes[1]).normalize_or_zero();
                *velocity = crease * original_velocity.dot(crease);

                if velocity.dot(planes[0]) < -0.01 || velocity.dot(planes[1]) < -0.01 {
                    *velocity = Vec3::ZERO;
                    return outcome;
                }
            } else {
                *velocity = Vec3::ZERO;
                return outcome;
            }
        }
    }

    outcome
}

/// Perform a step slide move.
///
/// This extends slide move with stair stepping - if the body hits
/// something, try stepping up and over it.
pub fn step_slide_move(
    world: &CollisionWorld,
    position: &mut Vec3,
    velocity: &mut Vec3,
    shape: TraceShape,
    filter: QueryFilter,
    delta_time: f32,
    config: &MovementConfig,
) -> SlideOutcome {
    let start_position = *position;
    let start_velocity = *velocity;

    let outcome = slide_move(world, position, velocity, shape, filter, delta_time, config);
    if outcome.clear {
        return outcome;
    }

    let horizontal_dist_sq = horizontal(*position - start_position).length_squared();

    let up_trace = world.trace(
        start_position,
        start_position + Vec3::Y * config.step_height,
        shape,
        filter,
    );
    if up_trace.started_in_solid && up_trace.fraction <= 0.0 {
        return outcome;
    }

    let mut stepped_pos = up_trace.end_position;
    let mut stepped_vel = start_velocity;
    slide_move(world, &mut stepped_pos, &mut stepped_vel, shape, filter, delta_time, config);

    // Step back down
    let down_trace = world.trace(
        stepped_pos,
        stepped_pos - Vec3::Y * (config.step_height + 0.01),
        shape,
        filter,
    );
    stepped_pos = down_trace.end_position;

    let landed_on_ground = down_trace
        .hit_normal
        .is_some_and(|normal| normal.y >= config.min_ground_normal);

    if landed_on_ground && horizontal(stepped_pos - start_position).length_squared() > horizontal_dist_sq {
        *position = stepped_pos;
        *velocity = stepped_vel;
        return SlideOutcome {
            clear: false,
            floor_normal: down_trace.hit_normal,
        };
    }

    outcome
}

#[inline]
fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
