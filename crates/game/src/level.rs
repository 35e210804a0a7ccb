//! Level geometry and spawn points.

use ascend_physics::{CollisionWorld, ContentFlags, SurfaceFlags};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A level: collision geometry plus named spawn points.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    pub spawn_points: Vec<SpawnPoint>,
}

/// A character spawn point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub name: String,

    /// Feet position in world space.
    pub position: Vec3,

    /// Initial facing direction (yaw in radians).
    pub facing: f32,
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collision: CollisionWorld::new(),
            spawn_points: Vec::new(),
        }
    }

    /// Traversal test course.
    ///
    /// ```text
    ///   z
    ///   ▲   ════════════ wall-run wall (face z=10.6, x -12..20, 4m high)
    ///   │   wall_run ►
    ///   │
    ///   │              climb ►  ▓▓ climb block (face x=5, top y=2.5)
    ///   │
    ///   │     no_climb ► ░ pillar (face x=-6, not climbable)
    ///   └──────────────────────────► x
    /// ```
    pub fn traversal_course() -> Self {
        let mut level = Self::new("traversal_course", "Traversal Course");

        // Floor
        level
            .collision
            .add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0), ContentFlags::SOLID);

        // Climb block with a walkable top
        level
            .collision
            .add_box(Vec3::new(7.0, 1.25, 0.0), Vec3::new(2.0, 1.25, 3.0), ContentFlags::SOLID);

        // Wall-run wall
        level
            .collision
            .add_box(Vec3::new(4.0, 2.0, 11.1), Vec3::new(16.0, 2.0, 0.5), ContentFlags::SOLID);

        // Pillar that refuses climbing
        let pillar = level
            .collision
            .add_box(Vec3::new(-5.0, 2.0, -6.0), Vec3::new(1.0, 2.0, 1.0), ContentFlags::SOLID);
        level.collision.set_surface_flags(pillar, SurfaceFlags::NO_CLIMB);

        level.add_spawn("climb", Vec3::new(3.0, 0.0, 0.0), 0.0);
        level.add_spawn("wall_run", Vec3::new(-10.0, 0.0, 10.0), 0.0);
        level.add_spawn("no_climb", Vec3::new(-6.5, 0.0, -6.0), 0.0);

        level
    }

    pub fn add_spawn(&mut self, name: &str, position: Vec3, facing: f32) {
        self.spawn_points.push(SpawnPoint {
            name: name.to_string(),
            position,
            facing,
        });
    }

    /// Get a spawn point by index.
    pub fn get_player_spawn(&self, index: usize) -> Option<&SpawnPoint> {
        self.spawn_points.get(index)
    }

    /// Get a spawn point by name.
    pub fn find_spawn(&self, name: &str) -> Option<&SpawnPoint> {
        self.spawn_points.iter().find(|s| s.name == name)
    }

    /// Get the number of spawn points.
    pub fn player_spawn_count(&self) -> usize {
        self.spawn_points.len()
    }
}
