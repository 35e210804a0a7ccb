//! Jump ability.

use ascend_physics::{LocomotionHost, MovementMode};

use crate::tags;

use super::{AbilityClass, AbilityContext, AbilityStatus, AbilityTagRules, GameplayAbility};

const RULES: AbilityTagRules = AbilityTagRules {
    ability_tags: &[tags::ABILITY_JUMP],
    activation_owned_tags: &[],
    activation_blocked_tags: &[tags::STATE_CLIMBING, tags::STATE_WALL_RUNNING, tags::STATE_IN_AIR],
    activation_required_tags: &[],
    cancel_abilities_with_tags: &[tags::ABILITY_CROUCH],
};

/// Jumps from walkable ground and stays active until the character is back
/// on the ground.
#[derive(Debug, Default)]
pub struct JumpAbility {
    left_ground: bool,
}

impl JumpAbility {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameplayAbility for JumpAbility {
    fn class(&self) -> AbilityClass {
        AbilityClass::Jump
    }

    fn tag_rules(&self) -> AbilityTagRules {
        RULES
    }

    fn can_activate(&self, ctx: &AbilityContext<'_>) -> bool {
        ctx.body.movement_mode() == MovementMode::Walking
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityStatus {
        self.left_ground = ctx.movement.jump(&mut *ctx.body, ctx.world);
        if self.left_ground {
            AbilityStatus::Running
        } else {
            AbilityStatus::Ended
        }
    }

    fn tick(&mut self, ctx: &mut AbilityContext<'_>, _delta_time: f32) -> AbilityStatus {
        if ctx.body.movement_mode().is_falling() {
            AbilityStatus::Running
        } else {
            AbilityStatus::Ended
        }
    }

    fn end(&mut self, _ctx: &mut AbilityContext<'_>, _cancelled: bool) {
        self.left_ground = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::test_support::{floor_world, Fixture, DT};
    use crate::abilities::AbilitySystem;

    fn system() -> AbilitySystem {
        let mut system = AbilitySystem::new();
        system.grant(Box::new(JumpAbility::new()));
        system
    }

    #[test]
    fn test_jump_runs_until_landing() {
        let mut fixture = Fixture::spawned(floor_world());
        let mut system = system();

        assert!(system.try_activate_ability_by_class(AbilityClass::Jump, true, &mut fixture.ctx()));
        assert!(system.is_ability_active(AbilityClass::Jump));
        assert!(fixture.body.velocity().y > 0.0);

        let mut frames = 0;
        while system.is_ability_active(AbilityClass::Jump) && frames < 240 {
            fixture.step();
            system.tick(&mut fixture.ctx(), DT);
            frames += 1;
        }

        assert!(!system.is_ability_active(AbilityClass::Jump));
        assert_eq!(fixture.body.movement_mode(), MovementMode::Walking);
        assert!(frames > 10, "frames={frames}");
    }

    #[test]
    fn test_cannot_jump_in_air() {
        let mut fixture = Fixture::spawned(floor_world());
        let mut system = system();

        fixture.movement.set_movement_mode(&mut fixture.body, &fixture.world, MovementMode::Falling);
        assert!(!system.try_activate_ability_by_class(AbilityClass::Jump, true, &mut fixture.ctx()));

        system.set_loose_tag(tags::STATE_IN_AIR, true);
        fixture.movement.set_movement_mode(&mut fixture.body, &fixture.world, MovementMode::Walking);
        assert!(!system.try_activate_ability_by_class(AbilityClass::Jump, true, &mut fixture.ctx()));
    }
}
