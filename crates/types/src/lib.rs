//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (engine, gesture interpreter, router, renderer,
//! adapter wire encoding).
//!
//! # Board Dimensions
//!
//! Default playfield dimensions (configurable at engine construction):
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//!
//! # Timing Constants
//!
//! All values are in milliseconds and are defaults for the corresponding
//! config structs; nothing reads them as global state.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_DROP_MS` | 1000 | Gravity interval with zero lines cleared |
//! | `DROP_SPEEDUP_PER_LINE_MS` | 40 | Interval reduction per cleared line |
//! | `DROP_INTERVAL_FLOOR_MS` | 150 | Minimum gravity interval |
//! | `CLEAR_ANIMATION_MS` | 400 | Line-clear animation duration |
//! | `GESTURE_COOLDOWN_MS` | 300 | Min gap between non-idle gesture emits |
//! | `ACTION_COOLDOWN_MS` | 300 | Router latch cooldown for discrete actions |
//! | `SQUAT_HOLD_MS` | 300 | Raw squat must persist this long to enter |
//! | `SQUAT_RELEASE_MS` | 200 | Raw non-squat must persist this long to leave |

/// Default board dimensions.
pub const BOARD_COLS: usize = 10;
pub const BOARD_ROWS: usize = 20;

/// Gravity cadence defaults (milliseconds).
pub const BASE_DROP_MS: u64 = 1000;
pub const DROP_SPEEDUP_PER_LINE_MS: u64 = 40;
pub const DROP_INTERVAL_FLOOR_MS: u64 = 150;

/// Line-clear animation duration (milliseconds).
pub const CLEAR_ANIMATION_MS: u64 = 400;

/// Gesture emission / action debounce defaults (milliseconds).
pub const GESTURE_COOLDOWN_MS: u64 = 300;
pub const ACTION_COOLDOWN_MS: u64 = 300;
pub const SQUAT_HOLD_MS: u64 = 300;
pub const SQUAT_RELEASE_MS: u64 = 200;

/// Gesture detection defaults.
pub const SMOOTHING_ALPHA: f32 = 0.2;
pub const HIP_SHIFT_THRESHOLD: f32 = 0.12;
pub const HAND_RAISE_MARGIN: f32 = 0.05;

/// Line-clear reward table indexed by simultaneous clear count.
/// Out-of-range counts award 0.
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in a stable order (used for random selection and encoding).
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Stable index in `ALL` (0..=6).
    pub fn index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::J => 5,
            PieceKind::L => 6,
        }
    }

    /// Non-zero cell encoding for wire/render layers (1..=7, 0 = empty).
    pub fn color_id(&self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Rotation direction for the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDir {
    Cw,
    Ccw,
}

/// Cell on the board (None = empty, Some = filled with piece kind)
pub type Cell = Option<PieceKind>;

/// Command produced by the router and consumed by the engine.
///
/// `Move` is continuous (applied every frame while the input persists);
/// `Step`, `Rotate` and `Drop` are discrete and debounced by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    None,
    Move { column: usize },
    Step { delta: i32 },
    Rotate { dir: RotationDir },
    Drop,
}

impl GameAction {
    /// Whether this action is a one-shot command subject to the router latch.
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            GameAction::Step { .. } | GameAction::Rotate { .. } | GameAction::Drop
        )
    }
}

/// The three command categories an interaction binding maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCategory {
    Movement,
    Rotation,
    Drop,
}

/// Per-frame snapshot of detected body cues.
///
/// Produced fresh each processed frame by the gesture interpreter; carries no
/// identity. Only the interpreter's internal smoothing/debounce state
/// persists across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    /// True when no actionable cue is set this frame.
    pub idle: bool,
    /// Smoothed horizontal hip-center position in [0,1].
    pub hip_x: f32,
    /// Hip x offset relative to the first-seen frame of the session.
    pub hip_delta_x: f32,
    /// Hip shifted past the left/right threshold.
    pub hip_left: bool,
    pub hip_right: bool,
    pub left_hand_up: bool,
    pub right_hand_up: bool,
    /// Shoulder-tilt lean (threshold proportional to shoulder separation).
    pub lean_left: bool,
    pub lean_right: bool,
    /// Both wrists above the head landmark.
    pub both_hands_up: bool,
    /// Debounced squat state.
    pub squat: bool,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            idle: true,
            hip_x: 0.5,
            hip_delta_x: 0.0,
            hip_left: false,
            hip_right: false,
            left_hand_up: false,
            right_hand_up: false,
            lean_left: false,
            lean_right: false,
            both_hands_up: false,
            squat: false,
        }
    }
}

/// Lock notification fired once per piece lock, before line-clear resolution.
///
/// `final_row`/`final_col` are the bottom-most and left-most occupied board
/// cells of the locked piece, not the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub kind: PieceKind,
    pub rotation: usize,
    pub final_row: usize,
    pub final_col: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_kind_str_roundtrip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(PieceKind::from_str("T"), Some(PieceKind::T));
        assert_eq!(PieceKind::from_str("x"), None);
    }

    #[test]
    fn test_color_ids_are_non_zero_and_unique() {
        let mut seen = [false; 8];
        for kind in PieceKind::ALL {
            let id = kind.color_id();
            assert!(id >= 1 && id <= 7);
            assert!(!seen[id as usize], "duplicate color id {}", id);
            seen[id as usize] = true;
        }
    }

    #[test]
    fn test_discrete_actions() {
        assert!(!GameAction::None.is_discrete());
        assert!(!GameAction::Move { column: 3 }.is_discrete());
        assert!(GameAction::Step { delta: -1 }.is_discrete());
        assert!(GameAction::Rotate { dir: RotationDir::Cw }.is_discrete());
        assert!(GameAction::Drop.is_discrete());
    }

    #[test]
    fn test_default_gesture_state_is_idle_and_centered() {
        let gs = GestureState::default();
        assert!(gs.idle);
        assert_eq!(gs.hip_x, 0.5);
        assert!(!gs.squat && !gs.both_hands_up);
    }

    #[test]
    fn test_line_score_table() {
        assert_eq!(LINE_SCORES[1], 40);
        assert_eq!(LINE_SCORES[2], 100);
        assert_eq!(LINE_SCORES[3], 300);
        assert_eq!(LINE_SCORES[4], 1200);
    }
}
