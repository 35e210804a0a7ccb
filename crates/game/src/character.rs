//! A playable character: body, movement, abilities and input handling.

use ascend_physics::movement::rotation_from_yaw;
use ascend_physics::{
    CharacterBody, CharacterMovement, CollisionWorld, LocomotionHost, MovementDirectionType, MovementEvent,
};
use glam::Vec3;

use crate::abilities::{
    AbilityClass, AbilityContext, AbilitySystem, ActivationScope, ClimbAbility, CrouchAbility, JumpAbility,
    SprintAbility, WallRunAbility,
};
use crate::config::SimulationConfig;
use crate::input::{ActionInput, PlayerInput};
use crate::level::SpawnPoint;
use crate::tags::{self, GameplayTag};
use crate::traversal::TraversalSelector;

/// Unique identifier for entities.
pub type EntityId = u32;

/// A character in the simulation.
#[derive(Debug)]
pub struct Character {
    /// Unique character ID.
    pub id: EntityId,

    /// Character name/handle.
    pub name: String,

    pub body: CharacterBody,

    pub movement: CharacterMovement,

    pub abilities: AbilitySystem,

    /// What the jump button tries.
    pub traversal: TraversalSelector,

    /// Actions held last frame, for edge detection.
    previous_actions: ActionInput,

    /// Camera yaw (radians).
    view_yaw: f32,
}

impl Character {
    /// Create a character standing at `spawn`, granted every ability.
    pub fn spawn(id: EntityId, name: &str, spawn: &SpawnPoint, config: &SimulationConfig, world: &CollisionWorld) -> Self {
        let mut body = CharacterBody::new(spawn.position, &config.movement);
        body.set_rotation(rotation_from_yaw(spawn.facing));

        let mut movement = CharacterMovement::new(config.movement.clone());
        movement.set_control_yaw(spawn.facing);
        movement.set_show_debug_traversal(config.show_debug_traversal);
        movement.spawn_at(&mut body, spawn.position, world);

        let mut abilities = AbilitySystem::new();
        abilities.grant(Box::new(JumpAbility::new()));
        abilities.grant(Box::new(WallRunAbility::new(config.wall_run.clone())));
        abilities.grant(Box::new(ClimbAbility::new()));
        abilities.grant(Box::new(CrouchAbility::new()));
        abilities.grant(Box::new(SprintAbility::new()));

        log::debug!("character {} '{}' spawned at {:?}", id, name, body.position());

        Self {
            id,
            name: name.to_string(),
            body,
            movement,
            abilities,
            traversal: TraversalSelector::new(config.traversal.clone()),
            previous_actions: ActionInput::default(),
            view_yaw: spawn.facing,
        }
    }

    /// Get the character's capsule centre.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    pub fn view_yaw(&self) -> f32 {
        self.view_yaw
    }

    pub fn is_climbing(&self) -> bool {
        self.movement.is_climbing(&self.body)
    }

    pub fn has_tag(&self, tag: GameplayTag) -> bool {
        self.abilities.has_matching_tag(tag)
    }

    pub fn is_ability_active(&self, class: AbilityClass) -> bool {
        self.abilities.is_ability_active(class)
    }

    /// End every running ability and revoke them, restoring whatever movement
    /// state they changed.
    pub fn despawn(&mut self, world: &CollisionWorld) {
        self.abilities
            .clear_abilities(&mut AbilityContext::new(&mut self.body, &mut self.movement, world));
        log::debug!("character {} '{}' despawned", self.id, self.name);
    }

    /// Advance one frame. Returns the movement events it produced.
    pub fn tick(
        &mut self,
        input: &PlayerInput,
        world: &CollisionWorld,
        mouse_sensitivity: f32,
        delta_time: f32,
    ) -> Vec<MovementEvent> {
        self.view_yaw += input.yaw_delta(mouse_sensitivity);
        self.movement.set_control_yaw(self.view_yaw);

        self.handle_actions(input.actions, world);
        self.apply_tag_changes();

        let direction = self.movement_direction(input);
        self.movement.apply_input(&mut self.body, direction);

        self.abilities.tick(
            &mut AbilityContext::new(&mut self.body, &mut self.movement, world),
            delta_time,
        );

        self.movement.tick(&mut self.body, world, delta_time);

        let events = self.movement.drain_events();
        for event in &events {
            if let MovementEvent::ClimbEnded { reason } = event {
                log::debug!("character {} stopped climbing ({:?})", self.id, reason);
                self.abilities.cancel_abilities(
                    tags::ABILITY_CLIMB,
                    &mut AbilityContext::new(&mut self.body, &mut self.movement, world),
                );
            }
        }

        // Standing up is retried until it fits
        if self.movement.is_crouching() && !self.abilities.is_ability_active(AbilityClass::Crouch) {
            CrouchAbility::stand_up(&mut AbilityContext::new(&mut self.body, &mut self.movement, world));
        }

        let airborne = self.body.movement_mode().is_falling();
        self.abilities.set_loose_tag(tags::STATE_IN_AIR, airborne);

        events
    }

    // ========================================================================
    // Input
    // ========================================================================

    fn handle_actions(&mut self, actions: ActionInput, world: &CollisionWorld) {
        let edges = actions.edges_from(&self.previous_actions);
        self.previous_actions = actions;

        if edges.pressed.jump && !self.movement.is_climbing(&self.body) {
            let ctx = AbilityContext::new(&mut self.body, &mut self.movement, world);
            let mut scope = ActivationScope::new(&mut self.abilities, ctx);
            self.traversal.try_traversal(&mut scope);
        }

        let mut ctx = AbilityContext::new(&mut self.body, &mut self.movement, world);

        let held = [
            (edges.pressed.crouch, edges.released.crouch, tags::ABILITY_CROUCH),
            (edges.pressed.sprint, edges.released.sprint, tags::ABILITY_SPRINT),
            (edges.pressed.climb, edges.released.climb, tags::ABILITY_CLIMB),
        ];
        for (pressed, released, tag) in held {
            if pressed {
                self.abilities.try_activate_abilities_by_tag(tag, &mut ctx);
            }
            if released {
                self.abilities.cancel_abilities(tag, &mut ctx);
            }
        }

        if edges.pressed.cancel_climb {
            self.abilities.cancel_abilities(tags::ABILITY_CLIMB, &mut ctx);
        }

        self.abilities.set_loose_tag(tags::MOVEMENT_ENFORCED_STRAFE, actions.aim);
    }

    fn apply_tag_changes(&mut self) {
        for change in self.abilities.drain_tag_changes() {
            if change.tag.matches(tags::MOVEMENT_ENFORCED_STRAFE) {
                let direction_type = if change.count > 0 {
                    MovementDirectionType::Strafe
                } else {
                    MovementDirectionType::OrientToMovement
                };
                self.movement.set_movement_direction_type(&mut self.body, direction_type);
            }
        }
    }

    /// World-space movement direction for this frame's input.
    ///
    /// While climbing, forward moves up the wall and right moves along it.
    fn movement_direction(&self, input: &PlayerInput) -> Vec3 {
        let (forward_axis, right_axis) = input.move_axes();

        let (forward, right) = if self.is_climbing() {
            let normal = self.movement.climb_surface_normal();
            (normal.cross(self.body.right()), self.body.up().cross(normal))
        } else {
            let view = rotation_from_yaw(self.view_yaw);
            (view * Vec3::X, view * Vec3::Z)
        };

        forward * forward_axis + right * right_axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use ascend_physics::{ContentFlags, MovementMode};

    const DT: f32 = 1.0 / 60.0;

    fn spawn_at(level: &Level, name: &str) -> Character {
        let spawn = level.find_spawn(name).unwrap();
        Character::spawn(1, "Test", spawn, &SimulationConfig::default(), &level.collision)
    }

    fn held(actions: ActionInput) -> PlayerInput {
        PlayerInput {
            actions,
            ..Default::default()
        }
    }

    #[test]
    fn test_spawn_on_ground() {
        let level = Level::traversal_course();
        let character = spawn_at(&level, "climb");

        assert_eq!(character.body.movement_mode(), MovementMode::Walking);
        assert!(character.body.forward().dot(Vec3::X) > 0.99);
        assert!(!character.is_climbing());
    }

    #[test]
    fn test_sprint_held_and_released() {
        let level = Level::traversal_course();
        let mut character = spawn_at(&level, "climb");

        let sprint = held(ActionInput {
            sprint: true,
            ..Default::default()
        });
        character.tick(&sprint, &level.collision, 1.0, DT);
        assert!(character.has_tag(tags::STATE_SPRINTING));
        assert!(character.movement.is_sprinting());

        character.tick(&PlayerInput::default(), &level.collision, 1.0, DT);
        assert!(!character.has_tag(tags::STATE_SPRINTING));
        assert!(!character.movement.is_sprinting());
    }

    #[test]
    fn test_aim_forces_strafe() {
        let level = Level::traversal_course();
        let mut character = spawn_at(&level, "climb");

        let aim = held(ActionInput {
            aim: true,
            ..Default::default()
        });
        character.tick(&aim, &level.collision, 1.0, DT);
        assert_eq!(character.movement.direction_type(), MovementDirectionType::Strafe);
        assert!(character.body.use_controller_desired_rotation());

        character.tick(&PlayerInput::default(), &level.collision, 1.0, DT);
        assert_eq!(character.movement.direction_type(), MovementDirectionType::OrientToMovement);
        assert!(character.body.orient_rotation_to_movement());
    }

    #[test]
    fn test_climb_refused_on_no_climb_surface() {
        let level = Level::traversal_course();
        let mut character = spawn_at(&level, "no_climb");

        let climb = held(ActionInput {
            climb: true,
            ..Default::default()
        });
        for _ in 0..10 {
            character.tick(&climb, &level.collision, 1.0, DT);
        }

        assert!(!character.is_climbing());
        assert!(!character.has_tag(tags::STATE_CLIMBING));
    }

    #[test]
    fn test_climb_release_and_cancel() {
        let level = Level::traversal_course();
        let mut character = spawn_at(&level, "climb");

        // Walk up to the block
        let mut walk = PlayerInput::default();
        walk.movement.forward = true;
        for _ in 0..60 {
            character.tick(&walk, &level.collision, 1.0, DT);
        }

        let climb = held(ActionInput {
            climb: true,
            ..Default::default()
        });
        character.tick(&climb, &level.collision, 1.0, DT);
        character.tick(&climb, &level.collision, 1.0, DT);
        assert!(character.is_climbing());
        assert!(character.has_tag(tags::STATE_CLIMBING));

        // Jump does nothing while climbing
        let jump = held(ActionInput {
            climb: true,
            jump: true,
            ..Default::default()
        });
        character.tick(&jump, &level.collision, 1.0, DT);
        assert!(character.is_climbing());
        assert!(!character.is_ability_active(AbilityClass::Jump));

        // Cancel action ends it while the climb button is still held
        let cancel = held(ActionInput {
            climb: true,
            cancel_climb: true,
            ..Default::default()
        });
        let events = character.tick(&cancel, &level.collision, 1.0, DT);
        assert!(!character.is_climbing());
        assert!(!character.has_tag(tags::STATE_CLIMBING));
        assert!(events
            .iter()
            .any(|event| matches!(event, MovementEvent::ClimbEnded { .. })));
    }

    #[test]
    fn test_despawn_mid_wall_run_restores_movement() {
        let level = Level::traversal_course();
        let mut character = spawn_at(&level, "wall_run");

        let jump = held(ActionInput {
            jump: true,
            ..Default::default()
        });
        character.tick(&jump, &level.collision, 1.0, DT);
        assert!(character.is_ability_active(AbilityClass::WallRun));
        assert_eq!(character.body.movement_mode(), MovementMode::Flying);

        character.despawn(&level.collision);
        assert!(!character.has_tag(tags::STATE_WALL_RUNNING));
        assert!(character.abilities.specs().is_empty());
        assert_eq!(character.body.movement_mode(), MovementMode::Falling);
        assert_eq!(character.body.gravity_scale(), 1.0);
        assert!(character.body.plane_constraint().is_none());
    }

    #[test]
    fn test_stuck_crouch_blocks_climbing() {
        let mut level = Level::traversal_course();
        let mut character = spawn_at(&level, "climb");

        let mut walk = PlayerInput::default();
        walk.movement.forward = true;
        for _ in 0..60 {
            character.tick(&walk, &level.collision, 1.0, DT);
        }

        let crouch = held(ActionInput {
            crouch: true,
            ..Default::default()
        });
        character.tick(&crouch, &level.collision, 1.0, DT);
        assert!(character.movement.is_crouching());

        // A low ceiling over the character keeps it crouched after release
        let ceiling = character.position() + Vec3::Y * 1.3;
        level
            .collision
            .add_box(ceiling, Vec3::new(0.3, 0.2, 0.3), ContentFlags::SOLID);
        character.tick(&PlayerInput::default(), &level.collision, 1.0, DT);
        assert!(!character.has_tag(tags::STATE_CROUCHING));
        assert!(character.movement.is_crouching());

        let climb = held(ActionInput {
            climb: true,
            ..Default::default()
        });
        character.tick(&climb, &level.collision, 1.0, DT);
        character.tick(&climb, &level.collision, 1.0, DT);
        assert!(!character.is_climbing());
        assert!(!character.has_tag(tags::STATE_CLIMBING));
        assert!(character.movement.is_crouching());
        assert!((character.body.capsule().half_height - 0.6).abs() < 1.0e-5);
    }

    #[test]
    fn test_debug_traversal_follows_config() {
        let level = Level::traversal_course();
        let spawn = level.find_spawn("climb").unwrap();
        let config = SimulationConfig {
            show_debug_traversal: true,
            ..Default::default()
        };
        let mut character = Character::spawn(1, "Test", spawn, &config, &level.collision);

        character.tick(&PlayerInput::default(), &level.collision, 1.0, DT);
        assert!(character.movement.show_debug_traversal());
        assert!(!character.movement.scanner().debug_draw().shapes().is_empty());
    }
}
