//! Gesture handlers - pure mappings from a gesture snapshot to a command
//!
//! Each handler looks at exactly the cues it cares about and ignores the
//! rest, so several handlers can be evaluated against the same snapshot.
//! Handlers are stateless; debounce and latching live in the router.

use pose_tetris_types::{GameAction, GestureState, RotationDir};

/// The built-in ways a body cue can drive the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureHandler {
    /// Shoulder lean left/right nudges the piece one column.
    LeanStep,
    /// Horizontal hip position continuously tracks a target column.
    /// The camera image is mirrored, so the column axis is flipped.
    HipTrack,
    /// One hand up rotates: left counter-clockwise, right clockwise.
    /// Both hands up is reserved for the drop cue and maps to nothing here.
    SingleHandRotate,
    /// Both hands above the head drops the piece.
    BothHandsDrop,
    /// A held squat drops the piece.
    SquatDrop,
}

impl GestureHandler {
    /// Map a snapshot to a command for a board `cols` wide.
    pub fn evaluate(&self, state: &GestureState, cols: usize) -> GameAction {
        match self {
            GestureHandler::LeanStep => {
                if state.lean_left {
                    GameAction::Step { delta: -1 }
                } else if state.lean_right {
                    GameAction::Step { delta: 1 }
                } else {
                    GameAction::None
                }
            }
            GestureHandler::HipTrack => {
                let raw = (state.hip_x * cols as f32).floor() as i64;
                let mirrored = cols as i64 - 1 - raw;
                let column = mirrored.clamp(0, cols as i64 - 1) as usize;
                GameAction::Move { column }
            }
            GestureHandler::SingleHandRotate => {
                match (state.left_hand_up, state.right_hand_up) {
                    (true, false) => GameAction::Rotate {
                        dir: RotationDir::Ccw,
                    },
                    (false, true) => GameAction::Rotate {
                        dir: RotationDir::Cw,
                    },
                    _ => GameAction::None,
                }
            }
            GestureHandler::BothHandsDrop => {
                if state.both_hands_up {
                    GameAction::Drop
                } else {
                    GameAction::None
                }
            }
            GestureHandler::SquatDrop => {
                if state.squat {
                    GameAction::Drop
                } else {
                    GameAction::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> GestureState {
        GestureState::default()
    }

    #[test]
    fn test_lean_step_directions() {
        let mut state = idle();
        assert_eq!(GestureHandler::LeanStep.evaluate(&state, 10), GameAction::None);

        state.lean_left = true;
        assert_eq!(
            GestureHandler::LeanStep.evaluate(&state, 10),
            GameAction::Step { delta: -1 }
        );

        state.lean_left = false;
        state.lean_right = true;
        assert_eq!(
            GestureHandler::LeanStep.evaluate(&state, 10),
            GameAction::Step { delta: 1 }
        );
    }

    #[test]
    fn test_hip_track_mirrors_and_clamps() {
        let mut state = idle();

        // Far left of the image maps to the right edge of the board.
        state.hip_x = 0.0;
        assert_eq!(
            GestureHandler::HipTrack.evaluate(&state, 10),
            GameAction::Move { column: 9 }
        );

        // Exactly 1.0 would floor to cols; clamp keeps it on the board.
        state.hip_x = 1.0;
        assert_eq!(
            GestureHandler::HipTrack.evaluate(&state, 10),
            GameAction::Move { column: 0 }
        );

        state.hip_x = 0.5;
        assert_eq!(
            GestureHandler::HipTrack.evaluate(&state, 10),
            GameAction::Move { column: 4 }
        );

        state.hip_x = 0.349;
        assert_eq!(
            GestureHandler::HipTrack.evaluate(&state, 10),
            GameAction::Move { column: 6 }
        );
    }

    #[test]
    fn test_single_hand_rotate() {
        let mut state = idle();
        assert_eq!(
            GestureHandler::SingleHandRotate.evaluate(&state, 10),
            GameAction::None
        );

        state.left_hand_up = true;
        assert_eq!(
            GestureHandler::SingleHandRotate.evaluate(&state, 10),
            GameAction::Rotate {
                dir: RotationDir::Ccw
            }
        );

        state.right_hand_up = true;
        assert_eq!(
            GestureHandler::SingleHandRotate.evaluate(&state, 10),
            GameAction::None,
            "both hands up is not a rotation"
        );

        state.left_hand_up = false;
        assert_eq!(
            GestureHandler::SingleHandRotate.evaluate(&state, 10),
            GameAction::Rotate {
                dir: RotationDir::Cw
            }
        );
    }

    #[test]
    fn test_drop_handlers() {
        let mut state = idle();
        assert_eq!(GestureHandler::BothHandsDrop.evaluate(&state, 10), GameAction::None);
        assert_eq!(GestureHandler::SquatDrop.evaluate(&state, 10), GameAction::None);

        state.both_hands_up = true;
        assert_eq!(GestureHandler::BothHandsDrop.evaluate(&state, 10), GameAction::Drop);

        state.squat = true;
        assert_eq!(GestureHandler::SquatDrop.evaluate(&state, 10), GameAction::Drop);
    }
}
