//! Movement configuration constants.
//!
//! All movement parameters are grouped here for easy tuning. Values use
//! metric units (meters, seconds) unless otherwise noted.

use serde::{Deserialize, Serialize};

/// Configuration for character locomotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Character Dimensions
    // ========================================================================
    /// Collision capsule radius (meters).
    pub capsule_radius: f32,

    /// Standing capsule half-height, caps included (meters).
    pub capsule_half_height: f32,

    /// Crouched capsule half-height (meters).
    pub crouched_half_height: f32,

    /// Eye height above the capsule centre (meters).
    pub eye_height: f32,

    // ========================================================================
    // Movement Speeds
    // ========================================================================
    /// Walking speed (meters/second).
    pub walk_speed: f32,

    /// Sprinting speed (meters/second).
    pub run_speed: f32,

    /// Crouching speed (meters/second).
    pub crouch_speed: f32,

    /// Flying speed (meters/second).
    pub fly_speed: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration before gravity scale (meters/second²).
    pub gravity: f32,

    /// Jump velocity (meters/second).
    pub jump_velocity: f32,

    /// Ground friction coefficient.
    pub friction: f32,

    /// Air control factor (0.0 = no air control, 1.0 = full control).
    pub air_control: f32,

    /// Ground acceleration (units/second²).
    pub ground_acceleration: f32,

    /// Air acceleration (units/second²).
    pub air_acceleration: f32,

    /// Speed below which friction stops the character (meters/second).
    pub stop_speed: f32,

    /// Input acceleration at full stick deflection (meters/second²).
    pub max_acceleration: f32,

    /// Braking while flying with no input (meters/second²).
    pub braking_deceleration_flying: f32,

    /// Turn rate when rotating toward movement or control yaw (radians/second).
    pub rotation_rate: f32,

    // ========================================================================
    // Stairs and Steps
    // ========================================================================
    /// Maximum step height the character can walk up (meters).
    pub step_height: f32,

    /// Minimum surface normal Y to be considered walkable ground.
    /// 0.7 ≈ 45 degrees, 0.85 ≈ 32 degrees
    pub min_ground_normal: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Maximum collision iterations per slide move.
    pub max_clip_planes: usize,

    /// Overbounce factor for velocity clipping (prevents sticking).
    pub overbounce: f32,

    // ========================================================================
    // Sub-stepping
    // ========================================================================
    /// Longest physics sub-step (seconds).
    pub max_simulation_time_step: f32,

    /// Maximum sub-steps per update.
    pub max_simulation_iterations: u32,

    // ========================================================================
    // Climbing
    // ========================================================================
    /// Climbing mode tuning.
    pub climb: ClimbConfig,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            capsule_radius: 0.42,
            capsule_half_height: 0.96,
            crouched_half_height: 0.6,
            eye_height: 0.64,

            walk_speed: 4.5,
            run_speed: 7.0,
            crouch_speed: 2.0,
            fly_speed: 6.0,

            gravity: 15.0,        // Slightly higher than real for game feel
            jump_velocity: 5.5,   // Gives ~1m jump height
            friction: 6.0,
            air_control: 0.3,
            ground_acceleration: 10.0,
            air_acceleration: 1.0,
            stop_speed: 0.5,
            max_acceleration: 20.0,
            braking_deceleration_flying: 0.0,
            rotation_rate: 10.0,

            step_height: 0.4,
            min_ground_normal: 0.7, // ~45 degree max slope

            max_clip_planes: 5,
            overbounce: 1.001,

            max_simulation_time_step: 0.05,
            max_simulation_iterations: 8,

            climb: ClimbConfig::default(),
        }
    }
}

impl MovementConfig {
    /// Max ground speed for the given stance.
    pub fn ground_speed(&self, is_crouching: bool, is_sprinting: bool) -> f32 {
        if is_crouching {
            self.crouch_speed
        } else if is_sprinting {
            self.run_speed
        } else {
            self.walk_speed
        }
    }
}

/// Climbing mode tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    // Wall scan
    /// Radius of the scan capsule.
    pub scan_capsule_radius: f32,
    /// Half-height of the scan capsule.
    pub scan_capsule_half_height: f32,
    /// Distance ahead of the character centre where the scan starts.
    pub scan_start_offset: f32,
    /// Length of the scan sweep.
    pub scan_length: f32,

    // Entry
    /// Largest angle between forward and the wall's inverted horizontal
    /// normal that still allows climbing to start. Must lie in
    /// [`ClimbConfig::START_ANGLE_DEGREES`].
    pub min_horizontal_degrees_to_start_climbing: f32,
    /// Base length of the eye-height facing probe.
    pub facing_trace_length: f32,
    /// Capsule half-height removed while climbing.
    pub collision_shrink_amount: f32,

    // Motion
    pub max_climbing_speed: f32,
    pub max_climbing_acceleration: f32,
    pub braking_deceleration_climbing: f32,
    /// Interpolation speed toward facing the wall.
    pub climbing_rotation_speed: f32,
    pub climbing_snap_speed: f32,
    /// Standoff kept between the assist anchor and the character.
    pub distance_from_surface: f32,
    /// Length of the downward probe used to dismount onto floors.
    pub floor_check_distance: f32,

    // Surface assist
    pub assist_sphere_radius: f32,
    pub assist_trace_length: f32,

    // Ledge mount
    /// Edge probe length as a multiple of the capsule radius.
    pub ledge_edge_trace_radius_scale: f32,
    pub ledge_check_up: f32,
    pub ledge_check_forward: f32,
    /// How far below the ledge check location walkable ground may be.
    pub ledge_walkable_trace_depth: f32,
    pub ledge_climb: LedgeClimbMontage,

    /// Climbing sub-steps shorter than this are skipped (seconds).
    pub min_tick_time: f32,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            scan_capsule_radius: 0.5,
            scan_capsule_half_height: 0.72,
            scan_start_offset: 0.2,
            scan_length: 0.01,

            min_horizontal_degrees_to_start_climbing: 25.0,
            facing_trace_length: 0.8,
            collision_shrink_amount: 0.3,

            max_climbing_speed: 1.2,
            max_climbing_acceleration: 3.8,
            braking_deceleration_climbing: 5.5,
            climbing_rotation_speed: 6.0,
            climbing_snap_speed: 4.0,
            distance_from_surface: 0.45,
            floor_check_distance: 1.0,

            assist_sphere_radius: 0.06,
            assist_trace_length: 1.2,

            ledge_edge_trace_radius_scale: 2.5,
            ledge_check_up: 1.6,
            ledge_check_forward: 1.2,
            ledge_walkable_trace_depth: 2.5,
            ledge_climb: LedgeClimbMontage::default(),

            min_tick_time: 1.0e-6,
        }
    }
}

impl ClimbConfig {
    /// Accepted range of the entry angle threshold, in degrees.
    pub const START_ANGLE_DEGREES: std::ops::RangeInclusive<f32> = 1.0..=75.0;
}

/// Root-motion path of the ledge mount: rise along world up, then advance
/// along the yaw-only forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgeClimbMontage {
    /// Total length (seconds).
    pub duration: f32,
    /// Fraction of the duration spent rising.
    pub rise_fraction: f32,
    /// Height gained (meters).
    pub rise: f32,
    /// Distance advanced onto the ledge (meters).
    pub advance: f32,
}

impl Default for LedgeClimbMontage {
    fn default() -> Self {
        Self {
            duration: 1.4,
            rise_fraction: 0.6,
            rise: 1.9,
            advance: 1.2,
        }
    }
}

/// Wall-run tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRunConfig {
    /// Probe length beyond the capsule radius.
    pub trace_extra_length: f32,
    /// A side wall counts when its normal opposes the probe by more than this.
    pub side_dot_threshold: f32,
    /// Distance kept from the wall while running.
    pub wall_standoff: f32,
    pub run_speed: f32,
    /// Gravity scale while running.
    pub gravity_scale: f32,
}

impl Default for WallRunConfig {
    fn default() -> Self {
        Self {
            trace_extra_length: 0.3,
            side_dot_threshold: 0.3,
            wall_standoff: 0.6,
            run_speed: 7.0,
            gravity_scale: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert!(config.walk_speed > 0.0);
        assert!(config.gravity > 0.0);
        assert!(config.capsule_radius > 0.0);
        assert!(config.capsule_half_height - config.climb.collision_shrink_amount > config.capsule_radius);
    }

    #[test]
    fn test_ground_speed() {
        let config = MovementConfig::default();

        assert_eq!(config.ground_speed(true, false), config.crouch_speed);
        assert_eq!(config.ground_speed(false, true), config.run_speed);
        assert_eq!(config.ground_speed(false, false), config.walk_speed);
        // Crouching overrides sprinting
        assert_eq!(config.ground_speed(true, true), config.crouch_speed);
    }

    #[test]
    fn test_default_climb_angle_in_range() {
        let climb = ClimbConfig::default();
        assert!(ClimbConfig::START_ANGLE_DEGREES.contains(&climb.min_horizontal_degrees_to_start_climbing));
    }
}
