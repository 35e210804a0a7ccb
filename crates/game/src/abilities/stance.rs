//! Crouch and sprint: held stances that last while their action is held.

use crate::tags;

use super::{AbilityClass, AbilityContext, AbilityStatus, AbilityTagRules, GameplayAbility};

// ============================================================================
// Crouch
// ============================================================================

const CROUCH_RULES: AbilityTagRules = AbilityTagRules {
    ability_tags: &[tags::ABILITY_CROUCH],
    activation_owned_tags: &[tags::STATE_CROUCHING],
    activation_blocked_tags: &[tags::STATE_CLIMBING, tags::STATE_WALL_RUNNING],
    activation_required_tags: &[],
    cancel_abilities_with_tags: &[tags::ABILITY_SPRINT],
};

/// Shrinks the capsule while held.
///
/// Standing up can fail under a low ceiling; the movement component then
/// stays crouched and the owner retries [`CrouchAbility::stand_up`].
#[derive(Debug, Default)]
pub struct CrouchAbility;

impl CrouchAbility {
    pub fn new() -> Self {
        Self
    }

    /// Try to stand up. Returns `true` once the character is standing.
    pub fn stand_up(ctx: &mut AbilityContext<'_>) -> bool {
        if !ctx.movement.is_crouching() {
            return true;
        }
        ctx.movement.uncrouch(&mut *ctx.body, ctx.world)
    }
}

impl GameplayAbility for CrouchAbility {
    fn class(&self) -> AbilityClass {
        AbilityClass::Crouch
    }

    fn tag_rules(&self) -> AbilityTagRules {
        CROUCH_RULES
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityStatus {
        if ctx.movement.crouch(&mut *ctx.body) {
            AbilityStatus::Running
        } else {
            AbilityStatus::Ended
        }
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, _cancelled: bool) {
        if !Self::stand_up(ctx) {
            log::debug!("staying crouched under an obstruction");
        }
    }
}

// ============================================================================
// Sprint
// ============================================================================

const SPRINT_RULES: AbilityTagRules = AbilityTagRules {
    ability_tags: &[tags::ABILITY_SPRINT],
    activation_owned_tags: &[tags::STATE_SPRINTING],
    activation_blocked_tags: &[tags::STATE_CLIMBING, tags::STATE_CROUCHING],
    activation_required_tags: &[],
    cancel_abilities_with_tags: &[],
};

/// Raises the ground speed to the run speed while held.
#[derive(Debug, Default)]
pub struct SprintAbility;

impl SprintAbility {
    pub fn new() -> Self {
        Self
    }
}

impl GameplayAbility for SprintAbility {
    fn class(&self) -> AbilityClass {
        AbilityClass::Sprint
    }

    fn tag_rules(&self) -> AbilityTagRules {
        SPRINT_RULES
    }

    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityStatus {
        ctx.movement.set_sprinting(true);
        AbilityStatus::Running
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, _cancelled: bool) {
        ctx.movement.set_sprinting(false);
    }
}
