//! Wall-run ability: owns a [`WallRunTask`] for the duration of one run.

use ascend_physics::{LocomotionHost, WallRunConfig, WallRunEndReason, WallRunEvent, WallRunState, WallRunTask};

use crate::tags;

use super::{AbilityClass, AbilityContext, AbilityStatus, AbilityTagRules, GameplayAbility};

const RULES: AbilityTagRules = AbilityTagRules {
    ability_tags: &[tags::ABILITY_WALL_RUN],
    activation_owned_tags: &[tags::STATE_WALL_RUNNING],
    activation_blocked_tags: &[tags::STATE_CLIMBING, tags::STATE_CROUCHING],
    activation_required_tags: &[],
    cancel_abilities_with_tags: &[tags::ABILITY_JUMP, tags::ABILITY_SPRINT],
};

#[derive(Debug)]
pub struct WallRunAbility {
    config: WallRunConfig,
    task: Option<WallRunTask>,
    wall_on_left: Option<bool>,
    runs: u32,
}

impl WallRunAbility {
    pub fn new(config: WallRunConfig) -> Self {
        Self {
            config,
            task: None,
            wall_on_left: None,
            runs: 0,
        }
    }

    pub fn config(&self) -> &WallRunConfig {
        &self.config
    }

    /// Side of the wall for the current or last run.
    pub fn wall_on_left(&self) -> Option<bool> {
        self.wall_on_left
    }

    /// Runs that attached to a wall.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// State of the running task.
    pub fn task_state(&self) -> Option<WallRunState> {
        self.task.as_ref().map(WallRunTask::state)
    }

    fn status(&mut self) -> AbilityStatus {
        let Some(task) = self.task.as_mut() else {
            return AbilityStatus::Ended;
        };

        for event in task.drain_events() {
            match event {
                WallRunEvent::WallSideDetermined { wall_on_left } => {
                    self.wall_on_left = Some(wall_on_left);
                    self.runs += 1;
                }
                WallRunEvent::Finished => {
                    log::trace!("wall run task finished");
                }
            }
        }

        if task.is_finished() {
            AbilityStatus::Ended
        } else {
            AbilityStatus::Running
        }
    }
}

impl GameplayAbility for WallRunAbility {
    fn class(&self) -> AbilityClass {
        AbilityClass::WallRun
    }

    fn tag_rules(&self) -> AbilityTagRules {
        RULES
    }

    fn can_activate(&self, ctx: &AbilityContext<'_>) -> bool {
        !ctx.body.is_climbing()
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityStatus {
        let mut task = WallRunTask::new(self.config.clone(), ctx.body.query_filter());
        task.set_debug_draw(ctx.movement.show_debug_traversal());
        task.activate(&mut *ctx.movement, &mut *ctx.body, ctx.world);
        self.task = Some(task);
        self.status()
    }

    fn tick(&mut self, ctx: &mut AbilityContext<'_>, delta_time: f32) -> AbilityStatus {
        if let Some(task) = self.task.as_mut() {
            task.tick(&mut *ctx.movement, &mut *ctx.body, ctx.world, delta_time);
        }
        self.status()
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, cancelled: bool) {
        if let Some(mut task) = self.task.take() {
            let reason = if cancelled {
                WallRunEndReason::Cancelled
            } else {
                WallRunEndReason::Destroyed
            };
            task.end(&mut *ctx.movement, &mut *ctx.body, ctx.world, reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::test_support::{floor_world, wall_run_world, Fixture, DT};
    use crate::abilities::AbilitySystem;
    use ascend_physics::MovementMode;

    fn system() -> AbilitySystem {
        let mut system = AbilitySystem::new();
        system.grant(Box::new(WallRunAbility::new(WallRunConfig::default())));
        system
    }

    #[test]
    fn test_no_wall_ends_immediately() {
        let mut fixture = Fixture::spawned(floor_world());
        let mut system = system();

        assert!(system.try_activate_ability_by_class(AbilityClass::WallRun, true, &mut fixture.ctx()));
        assert!(!system.is_ability_active(AbilityClass::WallRun));
        assert!(!system.has_matching_tag(tags::STATE_WALL_RUNNING));
        assert_eq!(fixture.body.movement_mode(), MovementMode::Walking);
        assert_eq!(fixture.body.gravity_scale(), 1.0);
    }

    #[test]
    fn test_runs_along_wall_until_cancelled() {
        let mut fixture = Fixture::spawned(wall_run_world());
        let mut system = system();

        assert!(system.try_activate_ability_by_class(AbilityClass::WallRun, true, &mut fixture.ctx()));
        assert!(system.is_ability_active(AbilityClass::WallRun));
        assert!(system.has_matching_tag(tags::STATE_WALL_RUNNING));
        assert_eq!(fixture.body.movement_mode(), MovementMode::Flying);

        let start = fixture.body.position();
        for _ in 0..30 {
            system.tick(&mut fixture.ctx(), DT);
            fixture.step();
        }

        let travelled = fixture.body.position() - start;
        assert!(travelled.x > 1.0, "travelled={travelled:?}");
        assert!(travelled.z.abs() < 0.05, "travelled={travelled:?}");

        assert!(system.cancel_ability(AbilityClass::WallRun, &mut fixture.ctx()));
        assert!(!system.has_matching_tag(tags::STATE_WALL_RUNNING));
        assert_eq!(fixture.body.movement_mode(), MovementMode::Falling);
        assert_eq!(fixture.body.gravity_scale(), 1.0);
        assert!(fixture.body.plane_constraint().is_none());
    }

    #[test]
    fn test_blocked_while_climbing() {
        let mut fixture = Fixture::spawned(wall_run_world());
        let mut system = system();
        system.set_loose_tag(tags::STATE_CLIMBING, true);

        assert!(!system.try_activate_ability_by_class(AbilityClass::WallRun, true, &mut fixture.ctx()));
        assert_eq!(fixture.body.movement_mode(), MovementMode::Walking);
        assert_eq!(fixture.body.position().z, 0.0);
    }
}
