//! Simulation configuration.
//!
//! Everything tunable lives in [`SimulationConfig`], loadable from RON. Files
//! only need the fields they change:
//!
//! ```ron
//! (
//!     tick_rate: 120,
//!     movement: (run_speed: 8.0, climb: (max_climbing_speed: 1.5)),
//!     wall_run: (run_speed: 9.0),
//!     traversal: [Jump],
//! )
//! ```

use std::path::{Path, PathBuf};

use ascend_physics::{ClimbConfig, MovementConfig, WallRunConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abilities::AbilityClass;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Mouse sensitivity.
    pub mouse_sensitivity: f32,

    /// Movement physics configuration.
    pub movement: MovementConfig,

    pub wall_run: WallRunConfig,

    /// Traversal abilities tried on jump, in priority order.
    pub traversal: Vec<AbilityClass>,

    /// Record traversal probes for debug drawing.
    pub show_debug_traversal: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            mouse_sensitivity: 2.0,
            movement: MovementConfig::default(),
            wall_run: WallRunConfig::default(),
            traversal: vec![AbilityClass::WallRun, AbilityClass::Jump],
            show_debug_traversal: false,
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Parse and validate a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_ron_str(&source)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }

        let movement = &self.movement;
        let climb = &movement.climb;
        let wall_run = &self.wall_run;

        positive("mouse_sensitivity", self.mouse_sensitivity)?;

        positive("movement.capsule_radius", movement.capsule_radius)?;
        positive("movement.capsule_half_height", movement.capsule_half_height)?;
        positive("movement.crouched_half_height", movement.crouched_half_height)?;
        positive("movement.walk_speed", movement.walk_speed)?;
        positive("movement.run_speed", movement.run_speed)?;
        positive("movement.crouch_speed", movement.crouch_speed)?;
        positive("movement.fly_speed", movement.fly_speed)?;
        positive("movement.gravity", movement.gravity)?;
        positive("movement.max_acceleration", movement.max_acceleration)?;
        positive("movement.max_simulation_time_step", movement.max_simulation_time_step)?;
        if movement.max_simulation_iterations == 0 {
            return Err(ConfigError::Invalid(
                "movement.max_simulation_iterations must be positive".into(),
            ));
        }
        if movement.capsule_half_height < movement.capsule_radius {
            return Err(ConfigError::Invalid(
                "movement.capsule_half_height must include the capsule radius".into(),
            ));
        }
        if movement.capsule_half_height - climb.collision_shrink_amount < movement.capsule_radius {
            return Err(ConfigError::Invalid(
                "movement.climb.collision_shrink_amount leaves no room for the capsule caps".into(),
            ));
        }
        if !(0.0..=1.0).contains(&movement.min_ground_normal) {
            return Err(ConfigError::Invalid("movement.min_ground_normal must be in 0..=1".into()));
        }

        positive("movement.climb.scan_capsule_radius", climb.scan_capsule_radius)?;
        positive("movement.climb.scan_capsule_half_height", climb.scan_capsule_half_height)?;
        positive("movement.climb.max_climbing_speed", climb.max_climbing_speed)?;
        positive("movement.climb.max_climbing_acceleration", climb.max_climbing_acceleration)?;
        positive("movement.climb.facing_trace_length", climb.facing_trace_length)?;
        let angle = climb.min_horizontal_degrees_to_start_climbing;
        if !ClimbConfig::START_ANGLE_DEGREES.contains(&angle) {
            return Err(ConfigError::Invalid(format!(
                "movement.climb.min_horizontal_degrees_to_start_climbing must be in {:?}, got {angle}",
                ClimbConfig::START_ANGLE_DEGREES
            )));
        }
        positive("movement.climb.ledge_climb.duration", climb.ledge_climb.duration)?;

        positive("wall_run.run_speed", wall_run.run_speed)?;
        positive("wall_run.wall_standoff", wall_run.wall_standoff)?;
        if wall_run.gravity_scale < 0.0 {
            return Err(ConfigError::Invalid("wall_run.gravity_scale must not be negative".into()));
        }

        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.delta_time() - 1.0 / 60.0).abs() < 1.0e-6);
    }

    #[test]
    fn test_partial_override() {
        let config = SimulationConfig::from_ron_str(
            "(tick_rate: 120, movement: (run_speed: 8.0, climb: (max_climbing_speed: 1.5)), traversal: [Jump])",
        )
        .unwrap();

        assert_eq!(config.tick_rate, 120);
        assert_eq!(config.movement.run_speed, 8.0);
        assert_eq!(config.movement.climb.max_climbing_speed, 1.5);
        assert_eq!(config.traversal, vec![AbilityClass::Jump]);
        // Untouched fields keep their defaults
        assert_eq!(config.movement.walk_speed, MovementConfig::default().walk_speed);
        assert_eq!(config.wall_run, WallRunConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimulationConfig::from_ron_str("(wall_run: (run_speed: 0.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = SimulationConfig::from_ron_str("(tick_rate: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_climb_angle_out_of_range_rejected() {
        for angle in ["0.5", "120.0"] {
            let source = format!("(movement: (climb: (min_horizontal_degrees_to_start_climbing: {angle})))");
            let err = SimulationConfig::from_ron_str(&source).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
        }

        let config =
            SimulationConfig::from_ron_str("(movement: (climb: (min_horizontal_degrees_to_start_climbing: 75.0)))")
                .unwrap();
        assert_eq!(config.movement.climb.min_horizontal_degrees_to_start_climbing, 75.0);
    }

    #[test]
    fn test_parse_error() {
        let err = SimulationConfig::from_ron_str("(tick_rate: \"fast\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    }
}
