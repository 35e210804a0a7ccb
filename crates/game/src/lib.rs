//! Ascend Game Logic
//!
//! Gameplay on top of `ascend_physics`:
//!
//! - Gameplay tags and the ability system that gates traversal
//! - Climb, jump, wall-run, crouch and sprint abilities
//! - Traversal selection for the jump button
//! - Characters, levels and the fixed-timestep simulation
//!
//! # Architecture
//!
//! Abilities never move the character themselves. They set intent on the
//! movement component (climb), start a wall-run task, or toggle stances;
//! movement applies the result on its next update.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Game Simulation                        │
//! │  ┌─────────┐    ┌───────────┐    ┌────────────────────────┐ │
//! │  │ Input   │───►│ Abilities │───►│ CharacterMovement      │ │
//! │  │ edges   │    │ (tags)    │    │ (walk/fall/fly/climb)  │ │
//! │  └─────────┘    └───────────┘    └───────────┬────────────┘ │
//! │       ▲                                      │ events       │
//! │       └──────────────── Character ◄──────────┘              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod abilities;
pub mod character;
pub mod config;
pub mod input;
pub mod level;
pub mod simulation;
pub mod tags;
pub mod traversal;

// Re-export main types
pub use abilities::{AbilityClass, AbilitySystem, GameplayAbility};
pub use character::{Character, EntityId};
pub use config::{ConfigError, SimulationConfig};
pub use input::{ActionInput, PlayerInput};
pub use level::{Level, SpawnPoint};
pub use simulation::{CharacterEvent, Simulation};
pub use tags::{GameplayTag, TagContainer};
pub use traversal::TraversalSelector;

// Re-export physics types for convenience
pub use ascend_physics::{
    CollisionWorld, ContentFlags, MovementConfig, MovementEvent, MovementMode, WallRunConfig,
};
