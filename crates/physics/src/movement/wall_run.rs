//! Wall running.
//!
//! A [`WallRunTask`] lives as long as the ability that owns it. The owner
//! calls [`WallRunTask::activate`] once, [`WallRunTask::tick`] every frame
//! and [`WallRunTask::end`] when it stops, and polls
//! [`WallRunTask::drain_events`] for what happened in between. Mode changes
//! go through the character's [`CharacterMovement`].
//!
//! Runnable walls are found with three rays from the capsule centre: forward
//! (a hit there aborts), then left and right. A side wall counts when its
//! normal opposes the probe direction by more than the configured threshold.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionWorld, DebugDrawBuffer, QueryFilter};

use super::config::WallRunConfig;
use super::controller::CharacterMovement;
use super::host::LocomotionHost;
use super::scanner::WallHit;
use super::state::{MovementMode, PlaneConstraint};

/// Lifecycle of a wall-run task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WallRunState {
    /// Created, not yet activated.
    #[default]
    Searching,
    /// Running along a wall.
    Active,
    /// Ended; the task does nothing further.
    Finished,
}

/// Observable results of a wall-run task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallRunEvent {
    /// A runnable wall was found at activation.
    WallSideDetermined { wall_on_left: bool },
    /// No runnable wall was found, or it was lost.
    Finished,
}

/// Why a wall-run task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallRunEndReason {
    /// The wall was lost while running.
    WallLost,
    /// No runnable wall at activation.
    NoWall,
    /// The owner cancelled the run.
    Cancelled,
    /// The owner was torn down while the run was active.
    Destroyed,
}

/// Host state captured at activation and restored at teardown.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WallRunSession {
    gravity_scale: f32,
}

/// Per-frame wall-run driver.
#[derive(Debug)]
pub struct WallRunTask {
    config: WallRunConfig,
    filter: QueryFilter,
    state: WallRunState,
    session: Option<WallRunSession>,
    wall_on_left: bool,
    elapsed: f32,
    events: Vec<WallRunEvent>,
    debug: DebugDrawBuffer,
}

impl WallRunTask {
    /// Create a task that probes with `filter` (the trace filter types).
    pub fn new(config: WallRunConfig, filter: QueryFilter) -> Self {
        Self {
            config,
            filter,
            state: WallRunState::Searching,
            session: None,
            wall_on_left: false,
            elapsed: 0.0,
            events: Vec::new(),
            debug: DebugDrawBuffer::default(),
        }
    }

    pub fn state(&self) -> WallRunState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == WallRunState::Active
    }

    pub fn is_finished(&self) -> bool {
        self.state == WallRunState::Finished
    }

    /// Side of the wall found at activation.
    pub fn wall_on_left(&self) -> bool {
        self.wall_on_left
    }

    /// Time spent running (seconds).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<WallRunEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record wall probes for debug drawing.
    pub fn set_debug_draw(&mut self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    /// Probes recorded while debug drawing was enabled.
    pub fn debug_draw(&self) -> &DebugDrawBuffer {
        &self.debug
    }

    /// Look for a wall and attach to it.
    ///
    /// Without a wall the task finishes at once and leaves the host alone.
    pub fn activate(
        &mut self,
        movement: &mut CharacterMovement,
        host: &mut impl LocomotionHost,
        world: &CollisionWorld,
    ) -> WallRunState {
        if self.state != WallRunState::Searching {
            return self.state;
        }

        let Some(hit) = self.find_runnable_wall(host, world) else {
            self.events.push(WallRunEvent::Finished);
            self.end(movement, host, world, WallRunEndReason::NoWall);
            return self.state;
        };

        self.wall_on_left = Self::is_wall_on_left(host, &hit);
        self.events.push(WallRunEvent::WallSideDetermined {
            wall_on_left: self.wall_on_left,
        });

        // Any climbing session ends before the gravity scale is captured
        movement.set_movement_mode(host, world, MovementMode::Flying);
        self.session = Some(WallRunSession {
            gravity_scale: host.gravity_scale(),
        });

        host.set_position(hit.impact_point + hit.impact_normal * self.config.wall_standoff);
        host.set_gravity_scale(self.config.gravity_scale);
        host.set_plane_constraint(Some(PlaneConstraint::new(hit.impact_point, hit.impact_normal)));

        log::debug!(
            "wall run started, wall on the {}",
            if self.wall_on_left { "left" } else { "right" }
        );

        self.state = WallRunState::Active;
        self.state
    }

    /// Keep running along the wall, or finish if it is gone.
    pub fn tick(
        &mut self,
        movement: &mut CharacterMovement,
        host: &mut impl LocomotionHost,
        world: &CollisionWorld,
        delta_time: f32,
    ) -> WallRunState {
        if self.state != WallRunState::Active {
            return self.state;
        }

        let Some(hit) = self.find_runnable_wall(host, world) else {
            self.events.push(WallRunEvent::Finished);
            self.end(movement, host, world, WallRunEndReason::WallLost);
            return self.state;
        };

        self.elapsed += delta_time;

        let direction = if Self::is_wall_on_left(host, &hit) {
            Vec3::Y.cross(hit.impact_normal)
        } else {
            hit.impact_normal.cross(Vec3::Y)
        };

        let mut velocity = direction.normalize_or_zero() * self.config.run_speed;
        velocity.y = 0.0;
        host.set_velocity(velocity);
        host.set_plane_constraint(Some(PlaneConstraint::new(hit.impact_point, hit.impact_normal)));

        self.state
    }

    /// Stop the run. Host state changed at activation is restored exactly
    /// once; later calls return `false`.
    pub fn end(
        &mut self,
        movement: &mut CharacterMovement,
        host: &mut impl LocomotionHost,
        world: &CollisionWorld,
        reason: WallRunEndReason,
    ) -> bool {
        if self.state == WallRunState::Finished {
            return false;
        }
        self.state = WallRunState::Finished;

        if let Some(session) = self.session.take() {
            host.set_plane_constraint(None);
            movement.set_movement_mode(host, world, MovementMode::Falling);
            host.set_gravity_scale(session.gravity_scale);
            log::debug!("wall run ended ({:?}) after {:.2}s", reason, self.elapsed);
        } else {
            log::trace!("wall run ended ({:?}) before attaching", reason);
        }

        true
    }

    /// First runnable wall around the host, if any.
    pub fn find_runnable_wall(&mut self, host: &impl LocomotionHost, world: &CollisionWorld) -> Option<WallHit> {
        let location = host.position();
        let right = host.right();
        let forward = host.forward();
        let length = host.capsule().radius + self.config.trace_extra_length;

        self.debug.clear();

        if self.probe(world, location, forward, length).is_some() {
            return None;
        }

        let threshold = self.config.side_dot_threshold;
        if let Some(hit) = self.probe(world, location, -right, length) {
            if hit.impact_normal.dot(right) > threshold {
                return Some(hit);
            }
        }

        if let Some(hit) = self.probe(world, location, right, length) {
            if hit.impact_normal.dot(-right) > threshold {
                return Some(hit);
            }
        }

        None
    }

    /// Whether the wall is on the host's left.
    pub fn is_wall_on_left(host: &impl LocomotionHost, hit: &WallHit) -> bool {
        host.right().dot(hit.impact_normal) > 0.0
    }

    fn probe(&mut self, world: &CollisionWorld, start: Vec3, direction: Vec3, length: f32) -> Option<WallHit> {
        let end = start + direction * length;
        let trace = world.line_trace(start, end, self.filter);
        self.debug.line(start, end, trace.impact_point);
        WallHit::from_trace(&trace)
    }
}

impl Drop for WallRunTask {
    fn drop(&mut self) {
        if self.session.is_some() {
            log::warn!("wall run task dropped while active; host state was not restored");
        }
    }
}
