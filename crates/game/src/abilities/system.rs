//! Granted abilities, activation rules and owned tags.

use crate::tags::{GameplayTag, TagChange, TagContainer};

use super::{AbilityClass, AbilityContext, AbilityStatus, AbilityTagRules, GameplayAbility};

/// A granted ability and whether it is running.
#[derive(Debug)]
pub struct AbilitySpec {
    ability: Box<dyn GameplayAbility>,
    active: bool,
    activation_count: u32,
}

impl AbilitySpec {
    pub fn class(&self) -> AbilityClass {
        self.ability.class()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of successful activations so far.
    pub fn activation_count(&self) -> u32 {
        self.activation_count
    }

    pub fn tag_rules(&self) -> AbilityTagRules {
        self.ability.tag_rules()
    }

    pub fn ability(&self) -> &dyn GameplayAbility {
        self.ability.as_ref()
    }
}

/// Activation by ability class, as used by traversal selection.
pub trait AbilityActivation {
    /// Try to activate the granted ability of `class`. Returns whether it
    /// was activated, even if it ended again right away.
    fn try_activate_ability_by_class(&mut self, class: AbilityClass, allow_remote_activation: bool) -> bool;

    fn find_ability_spec_from_class(&self, class: AbilityClass) -> Option<&AbilitySpec>;
}

/// One character's abilities and gameplay tags.
#[derive(Debug, Default)]
pub struct AbilitySystem {
    specs: Vec<AbilitySpec>,
    tags: TagContainer,
    loose_tags: Vec<GameplayTag>,
}

impl AbilitySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant an ability. Each class can be granted once.
    pub fn grant(&mut self, ability: Box<dyn GameplayAbility>) -> bool {
        let class = ability.class();
        if self.find_ability_spec_from_class(class).is_some() {
            log::warn!("ability {} already granted", class.name());
            return false;
        }

        self.specs.push(AbilitySpec {
            ability,
            active: false,
            activation_count: 0,
        });
        true
    }

    pub fn specs(&self) -> &[AbilitySpec] {
        &self.specs
    }

    pub fn find_ability_spec_from_class(&self, class: AbilityClass) -> Option<&AbilitySpec> {
        self.specs.iter().find(|spec| spec.class() == class)
    }

    pub fn is_ability_active(&self, class: AbilityClass) -> bool {
        self.find_ability_spec_from_class(class).is_some_and(AbilitySpec::is_active)
    }

    // ========================================================================
    // Activation
    // ========================================================================

    /// Try to activate the ability of `class`.
    ///
    /// Activation is always local; `allow_remote_activation` is accepted for
    /// callers that pass it through.
    pub fn try_activate_ability_by_class(
        &mut self,
        class: AbilityClass,
        allow_remote_activation: bool,
        ctx: &mut AbilityContext<'_>,
    ) -> bool {
        let Some(index) = self.specs.iter().position(|spec| spec.class() == class) else {
            log::debug!("ability {} not granted", class.name());
            return false;
        };

        log::trace!("activate {} (remote allowed: {})", class.name(), allow_remote_activation);
        self.try_activate_index(index, ctx)
    }

    /// Try to activate every granted ability with a tag matching `tag`.
    /// Returns whether any was activated.
    pub fn try_activate_abilities_by_tag(&mut self, tag: GameplayTag, ctx: &mut AbilityContext<'_>) -> bool {
        let mut activated = false;
        for index in 0..self.specs.len() {
            if self.specs[index].tag_rules().has_ability_tag(tag) {
                activated |= self.try_activate_index(index, ctx);
            }
        }
        activated
    }

    fn try_activate_index(&mut self, index: usize, ctx: &mut AbilityContext<'_>) -> bool {
        let spec = &self.specs[index];
        let class = spec.class();
        let rules = spec.tag_rules();

        if spec.active {
            return false;
        }
        if self.tags.has_any(rules.activation_blocked_tags) {
            log::debug!("{} blocked by tags", class.name());
            return false;
        }
        if !self.tags.has_all(rules.activation_required_tags) {
            log::debug!("{} missing required tags", class.name());
            return false;
        }
        if !spec.ability.can_activate(ctx) {
            log::debug!("{} cannot activate", class.name());
            return false;
        }

        for &tag in rules.cancel_abilities_with_tags {
            self.cancel_matching(tag, ctx, Some(index));
        }

        for &tag in rules.activation_owned_tags {
            self.tags.add(tag);
        }

        let spec = &mut self.specs[index];
        spec.active = true;
        spec.activation_count += 1;
        log::debug!("{} activated", class.name());

        if spec.ability.activate(ctx) == AbilityStatus::Ended {
            self.end_index(index, ctx, false);
        }
        true
    }

    // ========================================================================
    // Ending
    // ========================================================================

    /// Cancel running abilities with a tag matching `tag`. Returns how many
    /// were cancelled.
    pub fn cancel_abilities(&mut self, tag: GameplayTag, ctx: &mut AbilityContext<'_>) -> usize {
        self.cancel_matching(tag, ctx, None)
    }

    /// Cancel the ability of `class` if it is running.
    pub fn cancel_ability(&mut self, class: AbilityClass, ctx: &mut AbilityContext<'_>) -> bool {
        match self.specs.iter().position(|spec| spec.class() == class) {
            Some(index) => self.end_index(index, ctx, true),
            None => false,
        }
    }

    /// End everything that is running, without cancelling, and revoke every
    /// ability. Used when the owner goes away.
    pub fn clear_abilities(&mut self, ctx: &mut AbilityContext<'_>) {
        for index in 0..self.specs.len() {
            self.end_index(index, ctx, false);
        }
        self.specs.clear();
    }

    fn cancel_matching(&mut self, tag: GameplayTag, ctx: &mut AbilityContext<'_>, except: Option<usize>) -> usize {
        let mut cancelled = 0;
        for index in 0..self.specs.len() {
            if Some(index) != except && self.specs[index].tag_rules().has_ability_tag(tag) && self.end_index(index, ctx, true)
            {
                cancelled += 1;
            }
        }
        cancelled
    }

    fn end_index(&mut self, index: usize, ctx: &mut AbilityContext<'_>, cancelled: bool) -> bool {
        let spec = &mut self.specs[index];
        if !spec.active {
            return false;
        }

        spec.active = false;
        spec.ability.end(ctx, cancelled);
        let class = spec.class();
        let rules = spec.tag_rules();

        for &tag in rules.activation_owned_tags {
            self.tags.remove(tag);
        }

        log::debug!("{} ended (cancelled: {})", class.name(), cancelled);
        true
    }

    /// Update running abilities, ending those that finished.
    pub fn tick(&mut self, ctx: &mut AbilityContext<'_>, delta_time: f32) {
        for index in 0..self.specs.len() {
            if !self.specs[index].active {
                continue;
            }
            if self.specs[index].ability.tick(ctx, delta_time) == AbilityStatus::Ended {
                self.end_index(index, ctx, false);
            }
        }
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub fn tags(&self) -> &TagContainer {
        &self.tags
    }

    pub fn has_matching_tag(&self, tag: GameplayTag) -> bool {
        self.tags.has_tag(tag)
    }

    /// Add or remove a tag not owned by any ability. Idempotent.
    pub fn set_loose_tag(&mut self, tag: GameplayTag, present: bool) {
        let position = self.loose_tags.iter().position(|&loose| loose == tag);
        match (present, position) {
            (true, None) => {
                self.loose_tags.push(tag);
                self.tags.add(tag);
            }
            (false, Some(index)) => {
                self.loose_tags.swap_remove(index);
                self.tags.remove(tag);
            }
            _ => {}
        }
    }

    /// Tag changes since the last call.
    pub fn drain_tag_changes(&mut self) -> Vec<TagChange> {
        self.tags.drain_changes()
    }
}

/// An ability system bound to the character it acts on.
#[derive(Debug)]
pub struct ActivationScope<'s, 'a> {
    system: &'s mut AbilitySystem,
    ctx: AbilityContext<'a>,
}

impl<'s, 'a> ActivationScope<'s, 'a> {
    pub fn new(system: &'s mut AbilitySystem, ctx: AbilityContext<'a>) -> Self {
        Self { system, ctx }
    }
}

impl AbilityActivation for ActivationScope<'_, '_> {
    fn try_activate_ability_by_class(&mut self, class: AbilityClass, allow_remote_activation: bool) -> bool {
        self.system
            .try_activate_ability_by_class(class, allow_remote_activation, &mut self.ctx)
    }

    fn find_ability_spec_from_class(&self, class: AbilityClass) -> Option<&AbilitySpec> {
        self.system.find_ability_spec_from_class(class)
    }
}
