//! Player input handling.
//!
//! Raw per-frame input: held movement keys, mouse delta and held action
//! buttons. The character turns held buttons into press/release edges by
//! comparing against the previous frame.

use serde::{Deserialize, Serialize};

/// Raw player input for a single frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Mouse delta this frame (pixels).
    pub mouse_delta: (f32, f32),

    /// Action buttons held.
    pub actions: ActionInput,

    /// Frame number this input was generated.
    pub frame: u32,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    pub crouch: bool,
    pub sprint: bool,
    pub climb: bool,
    pub cancel_climb: bool,
    /// Aiming forces strafing.
    pub aim: bool,
}

/// Press and release edges between two frames of [`ActionInput`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionEdges {
    pub pressed: ActionInput,
    pub released: ActionInput,
}

impl ActionInput {
    /// Edges going from `previous` to `self`.
    pub fn edges_from(&self, previous: &ActionInput) -> ActionEdges {
        ActionEdges {
            pressed: self.held_without(previous),
            released: previous.held_without(self),
        }
    }

    /// Actions held in `self` but not in `other`.
    fn held_without(&self, other: &ActionInput) -> ActionInput {
        ActionInput {
            jump: self.jump && !other.jump,
            crouch: self.crouch && !other.crouch,
            sprint: self.sprint && !other.sprint,
            climb: self.climb && !other.climb,
            cancel_climb: self.cancel_climb && !other.cancel_climb,
            aim: self.aim && !other.aim,
        }
    }
}

impl PlayerInput {
    /// Movement axes as `(forward, right)`, each in -1..=1 and normalized
    /// for diagonals.
    pub fn move_axes(&self) -> (f32, f32) {
        let mut forward = 0.0_f32;
        let mut right = 0.0_f32;

        if self.movement.forward {
            forward += 1.0;
        }
        if self.movement.backward {
            forward -= 1.0;
        }
        if self.movement.right {
            right += 1.0;
        }
        if self.movement.left {
            right -= 1.0;
        }

        // Normalize diagonal movement
        let magnitude: f32 = (forward * forward + right * right).sqrt();
        if magnitude > 1.0 {
            forward /= magnitude;
            right /= magnitude;
        }

        (forward, right)
    }

    /// Yaw change in radians for this frame's mouse movement.
    ///
    /// Moving the mouse right turns right (increases yaw).
    pub fn yaw_delta(&self, mouse_sensitivity: f32) -> f32 {
        self.mouse_delta.0 * mouse_sensitivity * 0.001
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.movement.forward || self.movement.backward || self.movement.left || self.movement.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_normalized() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.right = true;

        let (forward, right) = input.move_axes();

        assert!(forward > 0.0 && forward < 1.0);
        assert!(right > 0.0 && right < 1.0);
        assert!(((forward * forward + right * right) - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn test_straight_movement_not_normalized() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;

        assert_eq!(input.move_axes(), (1.0, 0.0));
        assert!(input.has_movement());
    }

    #[test]
    fn test_edges() {
        let previous = ActionInput {
            climb: true,
            sprint: true,
            ..Default::default()
        };
        let current = ActionInput {
            climb: true,
            jump: true,
            ..Default::default()
        };

        let edges = current.edges_from(&previous);

        assert!(edges.pressed.jump);
        assert!(!edges.pressed.climb, "held is not a press");
        assert!(edges.released.sprint);
        assert!(!edges.released.climb);
        assert_eq!(current.edges_from(&current), ActionEdges::default());
    }
}
