//! Ability system.
//!
//! Abilities are the only way gameplay asks movement for something: climb,
//! jump, wall run, crouch, sprint. Each ability declares tag rules that gate
//! its activation; the [`AbilitySystem`] applies them and tracks which
//! abilities are running.
//!
//! ```text
//! input edge ──► AbilitySystem ──► GameplayAbility::activate ──► CharacterMovement
//!                     │                                            (intent only)
//!                     └── owned tags ──► TagContainer ──► TagChange
//! ```

mod climb;
mod jump;
mod stance;
mod system;
mod wall_run;

#[cfg(test)]
pub(crate) mod test_support;

use ascend_physics::{CharacterBody, CharacterMovement, CollisionWorld};
use serde::{Deserialize, Serialize};

use crate::tags::GameplayTag;

pub use climb::ClimbAbility;
pub use jump::JumpAbility;
pub use stance::{CrouchAbility, SprintAbility};
pub use system::{AbilityActivation, AbilitySpec, AbilitySystem, ActivationScope};
pub use wall_run::WallRunAbility;

/// Ability types a character can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityClass {
    Jump,
    WallRun,
    Climb,
    Crouch,
    Sprint,
}

impl AbilityClass {
    /// Human-readable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            AbilityClass::Jump => "Jump",
            AbilityClass::WallRun => "WallRun",
            AbilityClass::Climb => "Climb",
            AbilityClass::Crouch => "Crouch",
            AbilityClass::Sprint => "Sprint",
        }
    }
}

/// Tag rules gating an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbilityTagRules {
    /// Tags identifying the ability, used by activate/cancel-by-tag.
    pub ability_tags: &'static [GameplayTag],
    /// Tags held by the owner while the ability runs.
    pub activation_owned_tags: &'static [GameplayTag],
    /// Activation fails if the owner has any of these.
    pub activation_blocked_tags: &'static [GameplayTag],
    /// Activation fails unless the owner has all of these.
    pub activation_required_tags: &'static [GameplayTag],
    /// Running abilities with any of these tags are cancelled on activation.
    pub cancel_abilities_with_tags: &'static [GameplayTag],
}

impl AbilityTagRules {
    /// Whether any of the ability's tags matches `query`.
    pub fn has_ability_tag(&self, query: GameplayTag) -> bool {
        self.ability_tags.iter().any(|tag| tag.matches(query))
    }
}

/// Whether an ability keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityStatus {
    Running,
    Ended,
}

/// What an ability acts on: its character's body and movement.
#[derive(Debug)]
pub struct AbilityContext<'a> {
    pub body: &'a mut CharacterBody,
    pub movement: &'a mut CharacterMovement,
    pub world: &'a CollisionWorld,
}

impl<'a> AbilityContext<'a> {
    pub fn new(body: &'a mut CharacterBody, movement: &'a mut CharacterMovement, world: &'a CollisionWorld) -> Self {
        Self { body, movement, world }
    }
}

/// A gameplay ability.
///
/// Only [`AbilitySystem`] calls these; `end` is called exactly once for
/// every successful `activate`, whether the ability finished or was
/// cancelled.
pub trait GameplayAbility: std::fmt::Debug {
    fn class(&self) -> AbilityClass;

    fn tag_rules(&self) -> AbilityTagRules;

    /// Ability-specific precondition, checked after the tag rules.
    fn can_activate(&self, _ctx: &AbilityContext<'_>) -> bool {
        true
    }

    /// Start the ability. Returning [`AbilityStatus::Ended`] ends it at once.
    fn activate(&mut self, ctx: &mut AbilityContext<'_>) -> AbilityStatus;

    /// Per-frame update while running.
    fn tick(&mut self, _ctx: &mut AbilityContext<'_>, _delta_time: f32) -> AbilityStatus {
        AbilityStatus::Running
    }

    fn end(&mut self, ctx: &mut AbilityContext<'_>, cancelled: bool);
}
