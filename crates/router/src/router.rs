//! Command router - orders handlers and debounces one-shot commands
//!
//! Drop beats rotation beats movement; the first handler that produces a
//! command wins the frame. Discrete commands (`Step`, `Rotate`, `Drop`) are
//! latched so a held pose does not machine-gun the engine: the same command
//! is reissued only after the handler output transitions away and back, or
//! after the cooldown elapses. Continuous `Move` passes through untouched.

use std::time::{Duration, Instant};

use pose_tetris_types::{GameAction, GestureState, InputCategory, ACTION_COOLDOWN_MS};

use crate::binding::InteractionBinding;
use crate::handlers::GestureHandler;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub binding: InteractionBinding,
    /// Board width used for column mapping.
    pub cols: usize,
    /// Reissue window for a held discrete command.
    pub cooldown: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            binding: InteractionBinding::default(),
            cols: pose_tetris_types::BOARD_COLS,
            cooldown: Duration::from_millis(ACTION_COOLDOWN_MS),
        }
    }
}

pub struct CommandRouter {
    drop: GestureHandler,
    rotation: GestureHandler,
    movement: GestureHandler,
    cols: usize,
    cooldown: Duration,
    latched: Option<(GameAction, Instant)>,
}

impl CommandRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            drop: config.binding.handler(InputCategory::Drop),
            rotation: config.binding.handler(InputCategory::Rotation),
            movement: config.binding.handler(InputCategory::Movement),
            cols: config.cols,
            cooldown: config.cooldown,
            latched: None,
        }
    }

    /// Route a gesture snapshot to at most one command.
    pub fn route(&mut self, state: &GestureState, now: Instant) -> GameAction {
        let candidate = [self.drop, self.rotation, self.movement]
            .iter()
            .map(|h| h.evaluate(state, self.cols))
            .find(|a| *a != GameAction::None)
            .unwrap_or(GameAction::None);

        if !candidate.is_discrete() {
            // Continuous or empty output releases the latch.
            self.latched = None;
            return candidate;
        }

        match self.latched {
            Some((held, issued_at)) if held == candidate => {
                if now.duration_since(issued_at) >= self.cooldown {
                    self.latched = Some((candidate, now));
                    candidate
                } else {
                    GameAction::None
                }
            }
            _ => {
                self.latched = Some((candidate, now));
                candidate
            }
        }
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_tetris_types::RotationDir;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drop_state() -> GestureState {
        GestureState {
            idle: false,
            both_hands_up: true,
            left_hand_up: true,
            right_hand_up: true,
            ..GestureState::default()
        }
    }

    fn left_hand_state() -> GestureState {
        GestureState {
            idle: false,
            left_hand_up: true,
            ..GestureState::default()
        }
    }

    #[test]
    fn test_drop_outranks_rotation() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        // Both hands up also sets both per-hand flags; drop still wins
        // because the single-hand handler ignores the two-hand pose and the
        // drop handler is evaluated first anyway.
        assert_eq!(router.route(&drop_state(), t0), GameAction::Drop);
    }

    #[test]
    fn test_rotation_outranks_movement() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        let state = GestureState {
            idle: false,
            left_hand_up: true,
            lean_right: true,
            ..GestureState::default()
        };
        assert_eq!(
            router.route(&state, t0),
            GameAction::Rotate {
                dir: RotationDir::Ccw
            }
        );
    }

    #[test]
    fn test_held_discrete_is_latched() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        assert_eq!(router.route(&drop_state(), t0), GameAction::Drop);
        assert_eq!(router.route(&drop_state(), t0 + ms(50)), GameAction::None);
        assert_eq!(router.route(&drop_state(), t0 + ms(250)), GameAction::None);
    }

    #[test]
    fn test_latch_reissues_after_cooldown() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        assert_eq!(router.route(&drop_state(), t0), GameAction::Drop);
        assert_eq!(router.route(&drop_state(), t0 + ms(300)), GameAction::Drop);
        // The reissue restarts the window.
        assert_eq!(router.route(&drop_state(), t0 + ms(350)), GameAction::None);
    }

    #[test]
    fn test_latch_releases_on_transition_away_and_back() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        assert_eq!(router.route(&drop_state(), t0), GameAction::Drop);

        // Pose released: no command, latch cleared.
        assert_eq!(
            router.route(&GestureState::default(), t0 + ms(100)),
            GameAction::None
        );

        // Back inside the cooldown window still reissues.
        assert_eq!(router.route(&drop_state(), t0 + ms(150)), GameAction::Drop);
    }

    #[test]
    fn test_switching_discrete_commands_bypasses_latch() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        assert_eq!(router.route(&drop_state(), t0), GameAction::Drop);
        assert_eq!(
            router.route(&left_hand_state(), t0 + ms(50)),
            GameAction::Rotate {
                dir: RotationDir::Ccw
            }
        );
    }

    #[test]
    fn test_continuous_move_is_never_latched() {
        let config = RouterConfig {
            binding: InteractionBinding {
                movement: "step".to_string(),
                ..InteractionBinding::default()
            },
            ..RouterConfig::default()
        };
        let mut router = CommandRouter::new(config);
        let t0 = Instant::now();

        let state = GestureState {
            idle: false,
            hip_x: 0.2,
            hip_left: true,
            ..GestureState::default()
        };
        let expected = GameAction::Move { column: 7 };
        assert_eq!(router.route(&state, t0), expected);
        assert_eq!(router.route(&state, t0 + ms(10)), expected);
        assert_eq!(router.route(&state, t0 + ms(20)), expected);
    }

    #[test]
    fn test_idle_routes_nothing_with_default_binding() {
        let mut router = CommandRouter::default();
        let t0 = Instant::now();
        assert_eq!(
            router.route(&GestureState::default(), t0),
            GameAction::None
        );
    }
}
