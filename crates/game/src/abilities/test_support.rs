//! Worlds and characters shared by the ability tests.

use ascend_physics::{CharacterBody, CharacterMovement, CollisionWorld, ContentFlags, MovementConfig};
use glam::Vec3;

use super::AbilityContext;

pub const DT: f32 = 1.0 / 60.0;

/// Floor at y=0.
pub fn floor_world() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(100.0, 0.5, 100.0), ContentFlags::SOLID);
    world
}

/// Floor plus a tall wall whose face is at x=0.6.
pub fn climbing_world() -> CollisionWorld {
    let mut world = floor_world();
    world.add_box(Vec3::new(1.1, 4.0, 0.0), Vec3::new(0.5, 4.0, 10.0), ContentFlags::SOLID);
    world
}

/// Floor plus a wall along +X whose face is at z=0.5, to the right of a
/// character facing +X.
pub fn wall_run_world() -> CollisionWorld {
    let mut world = floor_world();
    world.add_box(Vec3::new(0.0, 2.0, 1.0), Vec3::new(50.0, 2.0, 0.5), ContentFlags::SOLID);
    world
}

pub struct Fixture {
    pub body: CharacterBody,
    pub movement: CharacterMovement,
    pub world: CollisionWorld,
}

impl Fixture {
    /// Character spawned at the origin facing +X.
    pub fn spawned(world: CollisionWorld) -> Self {
        let config = MovementConfig::default();
        let mut body = CharacterBody::new(Vec3::ZERO, &config);
        let mut movement = CharacterMovement::new(config);
        movement.spawn_at(&mut body, Vec3::ZERO, &world);
        Self { body, movement, world }
    }

    pub fn ctx(&mut self) -> AbilityContext<'_> {
        AbilityContext::new(&mut self.body, &mut self.movement, &self.world)
    }

    /// One movement update.
    pub fn step(&mut self) {
        self.movement.tick(&mut self.body, &self.world, DT);
    }
}
