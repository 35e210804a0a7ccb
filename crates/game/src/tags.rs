//! Gameplay tags.
//!
//! Tags are dotted names (`State.Climbing`, `Movement.Enforced.Strafe`)
//! matched hierarchically: a tag matches any of its parents. Abilities gate
//! on them and characters react to them changing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A hierarchical gameplay tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GameplayTag(&'static str);

impl GameplayTag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }

    /// Whether this tag equals `other` or is a child of it.
    ///
    /// `Movement.Enforced.Strafe` matches `Movement.Enforced` but not
    /// `Movement.Enf`.
    pub fn matches(&self, other: GameplayTag) -> bool {
        match self.0.strip_prefix(other.0) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// Tag catalogue
// ============================================================================

pub const ABILITY: GameplayTag = GameplayTag::new("Ability");
pub const ABILITY_CLIMB: GameplayTag = GameplayTag::new("Ability.Climb");
pub const ABILITY_JUMP: GameplayTag = GameplayTag::new("Ability.Jump");
pub const ABILITY_WALL_RUN: GameplayTag = GameplayTag::new("Ability.WallRun");
pub const ABILITY_CROUCH: GameplayTag = GameplayTag::new("Ability.Crouch");
pub const ABILITY_SPRINT: GameplayTag = GameplayTag::new("Ability.Sprint");

pub const STATE_CLIMBING: GameplayTag = GameplayTag::new("State.Climbing");
pub const STATE_WALL_RUNNING: GameplayTag = GameplayTag::new("State.WallRunning");
pub const STATE_CROUCHING: GameplayTag = GameplayTag::new("State.Crouching");
pub const STATE_SPRINTING: GameplayTag = GameplayTag::new("State.Sprinting");
pub const STATE_IN_AIR: GameplayTag = GameplayTag::new("State.InAir");

pub const MOVEMENT_ENFORCED_STRAFE: GameplayTag = GameplayTag::new("Movement.Enforced.Strafe");

/// A tag's count crossed zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagChange {
    pub tag: GameplayTag,
    /// Count after the change: zero when removed.
    pub count: u32,
}

/// Counted set of tags.
///
/// The same tag may be added by several sources; it stays present until
/// each of them removed it. Additions and removals that cross zero are
/// recorded as [`TagChange`]s.
#[derive(Debug, Clone, Default)]
pub struct TagContainer {
    counts: BTreeMap<GameplayTag, u32>,
    changes: Vec<TagChange>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: GameplayTag) {
        let count = self.counts.entry(tag).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.changes.push(TagChange { tag, count: 1 });
        }
    }

    /// Remove one count of `tag`. Returns `false` if it was not present.
    pub fn remove(&mut self, tag: GameplayTag) -> bool {
        let Some(count) = self.counts.get_mut(&tag) else {
            return false;
        };

        *count -= 1;
        if *count == 0 {
            self.counts.remove(&tag);
            self.changes.push(TagChange { tag, count: 0 });
        }
        true
    }

    /// Exact count of `tag`.
    pub fn count(&self, tag: GameplayTag) -> u32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// Whether any present tag matches `query`.
    pub fn has_tag(&self, query: GameplayTag) -> bool {
        self.counts.keys().any(|tag| tag.matches(query))
    }

    pub fn has_any(&self, queries: &[GameplayTag]) -> bool {
        queries.iter().any(|&query| self.has_tag(query))
    }

    pub fn has_all(&self, queries: &[GameplayTag]) -> bool {
        queries.iter().all(|&query| self.has_tag(query))
    }

    pub fn iter(&self) -> impl Iterator<Item = GameplayTag> + '_ {
        self.counts.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Take the changes recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<TagChange> {
        std::mem::take(&mut self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchical_match() {
        assert!(MOVEMENT_ENFORCED_STRAFE.matches(GameplayTag::new("Movement.Enforced")));
        assert!(MOVEMENT_ENFORCED_STRAFE.matches(MOVEMENT_ENFORCED_STRAFE));
        assert!(!MOVEMENT_ENFORCED_STRAFE.matches(GameplayTag::new("Movement.Enf")));
        assert!(!GameplayTag::new("Movement").matches(MOVEMENT_ENFORCED_STRAFE));
        assert!(ABILITY_CLIMB.matches(ABILITY));
    }

    #[test]
    fn test_counts_and_changes() {
        let mut tags = TagContainer::new();

        tags.add(STATE_CLIMBING);
        tags.add(STATE_CLIMBING);
        assert_eq!(tags.count(STATE_CLIMBING), 2);
        assert!(tags.has_tag(GameplayTag::new("State")));

        assert!(tags.remove(STATE_CLIMBING));
        assert!(tags.has_tag(STATE_CLIMBING));
        assert!(tags.remove(STATE_CLIMBING));
        assert!(!tags.has_tag(STATE_CLIMBING));
        assert!(!tags.remove(STATE_CLIMBING));

        // Only the zero crossings are reported
        assert_eq!(
            tags.drain_changes(),
            vec![
                TagChange {
                    tag: STATE_CLIMBING,
                    count: 1
                },
                TagChange {
                    tag: STATE_CLIMBING,
                    count: 0
                },
            ]
        );
        assert!(tags.drain_changes().is_empty());
    }

    #[test]
    fn test_any_and_all() {
        let mut tags = TagContainer::new();
        tags.add(STATE_CROUCHING);

        assert!(tags.has_any(&[STATE_CLIMBING, STATE_CROUCHING]));
        assert!(!tags.has_all(&[STATE_CLIMBING, STATE_CROUCHING]));
        assert!(tags.has_all(&[]));
        assert!(!tags.has_any(&[]));
    }
}
