//! Game simulation - the main game loop.
//!
//! Fixed-timestep and deterministic: the same inputs always produce the same
//! frames. Per frame, each character handles its input edges, ticks its
//! abilities, runs movement and reacts to the movement events.

use ascend_physics::MovementEvent;
use glam::Vec3;
use serde::Serialize;

use crate::character::{Character, EntityId};
use crate::config::SimulationConfig;
use crate::input::PlayerInput;
use crate::level::{Level, SpawnPoint};

/// A movement event tagged with the character and frame it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CharacterEvent {
    pub frame: u64,
    pub character: EntityId,
    pub event: MovementEvent,
}

/// The main game simulation.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Current level.
    pub level: Level,

    /// All characters in the game.
    pub characters: Vec<Character>,

    /// Next entity ID to assign.
    next_entity_id: EntityId,
}

impl Simulation {
    /// Create a new simulation with the given configuration and level.
    pub fn new(config: SimulationConfig, level: Level) -> Self {
        Self {
            frame: 0,
            config,
            level,
            characters: Vec::new(),
            next_entity_id: 1,
        }
    }

    /// Create a simulation with default configuration and the traversal course.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::traversal_course())
    }

    /// Add a character at the next spawn point in turn.
    ///
    /// Returns the character's ID.
    pub fn add_character(&mut self, name: &str) -> EntityId {
        let spawn_index = self.characters.len() % self.level.player_spawn_count().max(1);
        let spawn = self.level.get_player_spawn(spawn_index).cloned().unwrap_or_else(|| {
            log::warn!("level '{}' has no spawn points, spawning at the origin", self.level.id);
            SpawnPoint {
                name: "origin".to_string(),
                position: Vec3::ZERO,
                facing: 0.0,
            }
        });

        self.spawn_character(name, &spawn)
    }

    /// Add a character at the named spawn point.
    pub fn add_character_at(&mut self, name: &str, spawn_name: &str) -> Option<EntityId> {
        let spawn = self.level.find_spawn(spawn_name)?.clone();
        Some(self.spawn_character(name, &spawn))
    }

    fn spawn_character(&mut self, name: &str, spawn: &SpawnPoint) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;

        let character = Character::spawn(id, name, spawn, &self.config, &self.level.collision);
        self.characters.push(character);
        id
    }

    /// Remove a character from the simulation, ending its abilities first.
    pub fn remove_character(&mut self, character_id: EntityId) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == character_id)?;
        let mut character = self.characters.remove(index);
        character.despawn(&self.level.collision);
        Some(character)
    }

    /// Get a character by ID.
    pub fn get_character(&self, character_id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == character_id)
    }

    /// Get a mutable reference to a character by ID.
    pub fn get_character_mut(&mut self, character_id: EntityId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == character_id)
    }

    /// Advance the simulation by one tick.
    ///
    /// `inputs` are indexed by character position in `characters`; missing
    /// entries count as no input. Returns the movement events of this frame.
    pub fn tick(&mut self, inputs: &[PlayerInput]) -> Vec<CharacterEvent> {
        let delta_time = self.config.delta_time();
        let mut events = Vec::new();

        for (i, character) in self.characters.iter_mut().enumerate() {
            let input = inputs.get(i).cloned().unwrap_or_default();

            let frame_events = character.tick(
                &input,
                &self.level.collision,
                self.config.mouse_sensitivity,
                delta_time,
            );

            events.extend(frame_events.into_iter().map(|event| CharacterEvent {
                frame: self.frame,
                character: character.id,
                event,
            }));
        }

        for event in &events {
            log::trace!("frame {} character {}: {:?}", event.frame, event.character, event.event);
        }

        self.frame += 1;
        events
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityClass;
    use crate::input::ActionInput;
    use crate::tags;
    use ascend_physics::{LocomotionHost, MovementMode};

    fn forward() -> PlayerInput {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::test();
        assert_eq!(sim.frame, 0);
        assert!(sim.characters.is_empty());
    }

    #[test]
    fn test_add_character() {
        let mut sim = Simulation::test();

        let id = sim.add_character("Player1");
        assert!(id > 0);
        assert_eq!(sim.characters.len(), 1);

        let character = sim.get_character(id).unwrap();
        assert_eq!(character.name, "Player1");
        assert_eq!(character.body.movement_mode(), MovementMode::Walking);

        assert!(sim.add_character_at("Player2", "wall_run").is_some());
        assert!(sim.add_character_at("Player3", "nowhere").is_none());

        assert!(sim.remove_character(id).is_some());
        assert!(sim.get_character(id).is_none());
        assert!(sim.remove_character(id).is_none());
    }

    #[test]
    fn test_tick_advances_frame() {
        let mut sim = Simulation::test();
        sim.add_character("Test");

        sim.tick(&[PlayerInput::default()]);
        assert_eq!(sim.frame, 1);

        sim.tick(&[]);
        assert_eq!(sim.frame, 2);
    }

    #[test]
    fn test_movement_input() {
        let mut sim = Simulation::test();
        let id = sim.add_character("Test");

        let start_pos = sim.get_character(id).unwrap().position();

        for _ in 0..60 {
            sim.tick(&[forward()]);
        }

        let end_pos = sim.get_character(id).unwrap().position();
        let distance = (end_pos - start_pos).length();

        assert!(distance > 1.0, "Character should have moved, distance={}", distance);
    }

    #[test]
    fn test_climb_onto_block() {
        let mut sim = Simulation::test();
        let id = sim.add_character_at("Climber", "climb").unwrap();

        for _ in 0..60 {
            sim.tick(&[forward()]);
        }

        let mut climb = forward();
        climb.actions.climb = true;

        let mut events = Vec::new();
        let mut highest = f32::MIN;
        for _ in 0..360 {
            events.extend(sim.tick(&[climb.clone()]).into_iter().map(|e| e.event));
            highest = highest.max(sim.get_character(id).unwrap().position().y);
        }

        assert!(events.contains(&MovementEvent::ClimbStarted), "{events:?}");
        assert!(events.contains(&MovementEvent::LedgeClimbStarted), "{events:?}");
        assert!(events.iter().any(|e| matches!(e, MovementEvent::ClimbEnded { .. })));
        assert!(highest > 2.5, "highest={highest}");

        let character = sim.get_character(id).unwrap();
        assert!(!character.is_climbing());
        assert!(!character.has_tag(tags::STATE_CLIMBING));
    }

    #[test]
    fn test_wall_run_along_corridor() {
        let mut sim = Simulation::test();
        let id = sim.add_character_at("Runner", "wall_run").unwrap();
        let start = sim.get_character(id).unwrap().position();

        let jump = PlayerInput {
            actions: ActionInput {
                jump: true,
                ..Default::default()
            },
            ..Default::default()
        };
        sim.tick(&[jump]);
        for _ in 0..30 {
            sim.tick(&[]);
        }

        let character = sim.get_character(id).unwrap();
        assert!(character.is_ability_active(AbilityClass::WallRun));
        assert!(!character.is_ability_active(AbilityClass::Jump));
        assert!(character.has_tag(tags::STATE_WALL_RUNNING));
        assert_eq!(character.body.movement_mode(), MovementMode::Flying);
        assert!(character.position().x > start.x + 2.0);
        assert!((character.position().z - 10.0).abs() < 0.05);

        // The wall ends at x=20
        for _ in 0..400 {
            sim.tick(&[]);
        }

        let character = sim.get_character(id).unwrap();
        assert!(!character.is_ability_active(AbilityClass::WallRun));
        assert!(!character.has_tag(tags::STATE_WALL_RUNNING));
        assert_ne!(character.body.movement_mode(), MovementMode::Flying);
        assert_eq!(character.body.gravity_scale(), 1.0);
        assert!(character.body.plane_constraint().is_none());
    }

    #[test]
    fn test_determinism() {
        // Run simulation twice with same inputs - should get same results
        let inputs: Vec<_> = (0..200)
            .map(|i| {
                let mut input = PlayerInput::default();
                input.movement.forward = i % 2 == 0;
                input.movement.right = i % 3 == 0;
                input.actions.jump = i % 10 == 0;
                input.actions.climb = i > 100;
                input.mouse_delta = (((i % 7) as f32) - 3.0, 0.0);
                input
            })
            .collect();

        let run = || {
            let mut sim = Simulation::test();
            sim.add_character("Test");
            let mut events = Vec::new();
            for input in &inputs {
                events.extend(sim.tick(&[input.clone()]));
            }
            (sim.get_character(1).unwrap().position(), events)
        };

        let (pos1, events1) = run();
        let (pos2, events2) = run();

        assert!(
            (pos1 - pos2).length() < 0.0001,
            "Simulations should be deterministic: {:?} vs {:?}",
            pos1,
            pos2
        );
        assert_eq!(events1, events2);
    }
}
