//! Climb ability: turns the climb action into climbing intent.

use ascend_physics::LocomotionHost;

use crate::tags;

use super::{AbilityClass, AbilityContext, AbilityStatus, AbilityTagRules, GameplayAbility};

const RULES: AbilityTagRules = AbilityTagRules {
    ability_tags: &[tags::ABILITY_CLIMB],
    activation_owned_tags: &[tags::STATE_CLIMBING],
    activation_blocked_tags: &[tags::STATE_WALL_RUNNING, tags::STATE_CROUCHING],
    activation_required_tags: &[],
    cancel_abilities_with_tags: &[tags::ABILITY_SPRINT],
};

/// Requests climbing while running and clears the request when it ends.
///
/// The movement component switches into climbing on its next update. The
/// ability ends by itself once the request is gone, whether it was cleared
/// here or by climbing ending.
#[derive(Debug, Default)]
pub struct ClimbAbility;

impl ClimbAbility {
    pub fn new() -> Self {
        Self
    }
}

impl GameplayAbility for ClimbAbility {
    fn class(&self) -> AbilityClass {
        AbilityClass::Climb
    }

    fn tag_rules(&self) -> AbilityTagRules {
        RULES
    }

    /// A crouched capsule stays crouched until standing up fits, even after
    /// the crouch ability ended.
    fn can_activate(&self, ctx: &AbilityContext<'_>) -> bool {
        !ctx.movement.is_crouching()
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityStatus {
        if ctx.movement.try_climbing(&*ctx.body, ctx.world) {
            AbilityStatus::Running
        } else {
            log::debug!("nothing to climb at {:?}", ctx.body.position());
            AbilityStatus::Ended
        }
    }

    fn tick(&mut self, ctx: &mut AbilityContext<'_>, _delta_time: f32) -> AbilityStatus {
        if ctx.movement.wants_to_climb() || ctx.movement.is_climbing(&*ctx.body) {
            AbilityStatus::Running
        } else {
            AbilityStatus::Ended
        }
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, _cancelled: bool) {
        ctx.movement.cancel_climbing();
    }
}
