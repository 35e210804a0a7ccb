//! Traversal selection: what the jump button does.
//!
//! Jumping while grounded tries each traversal ability in priority order and
//! stops at the first one that activates and is still running afterwards.
//! An ability that activates but ends straight away (a wall run with no
//! wall) lets the next one have a go.

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityActivation, AbilityClass};

/// Ordered list of traversal abilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalSelector {
    pub abilities: Vec<AbilityClass>,
}

impl Default for TraversalSelector {
    fn default() -> Self {
        Self {
            abilities: vec![AbilityClass::WallRun, AbilityClass::Jump],
        }
    }
}

impl TraversalSelector {
    pub fn new(abilities: Vec<AbilityClass>) -> Self {
        Self { abilities }
    }

    /// Try the abilities in order. Returns whether one is now running.
    pub fn try_traversal(&self, activation: &mut impl AbilityActivation) -> bool {
        for &class in &self.abilities {
            let activated = activation.try_activate_ability_by_class(class, true);
            let running = activated
                && activation
                    .find_ability_spec_from_class(class)
                    .is_some_and(|spec| spec.is_active());

            if running {
                log::debug!("traversal: {}", class.name());
                return true;
            }
        }

        log::trace!("no traversal ability activated");
        false
    }
}
