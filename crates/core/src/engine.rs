//! Engine module - the deterministic game state machine
//!
//! Owns the board, the active piece, scoring and the gravity cadence. All
//! timing flows in through caller-supplied `Instant`s so whole games can be
//! driven from tests without sleeping.
//!
//! # Phases
//!
//! ```text
//! Ready ──start──▶ Falling ──lock with full rows──▶ Clearing ──▶ Falling
//!                     │                                             │
//!                     └────────── spawn collision ──▶ GameOver ◀────┘
//! ```
//!
//! `GameOver` is terminal until `restart`. Every invalid operation in every
//! other situation is a silent no-op that returns `false`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use pose_tetris_types::{
    GameAction, LockEvent, PieceKind, RotationDir, BASE_DROP_MS, BOARD_COLS, BOARD_ROWS,
    CLEAR_ANIMATION_MS, DROP_INTERVAL_FLOOR_MS, DROP_SPEEDUP_PER_LINE_MS, LINE_SCORES,
};

use crate::board::Board;
use crate::pieces::{shape, ActivePiece};
use crate::rng::SimpleRng;

/// Horizontal kick offsets tried when a rotation does not fit in place.
/// Order is fixed; the first fitting offset wins.
const KICK_OFFSETS: [i32; 5] = [0, -1, 1, -2, 2];

/// Engine tunables. Dimensions are fixed after construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rows: usize,
    pub cols: usize,
    pub base_drop_ms: u64,
    pub speedup_per_line_ms: u64,
    pub drop_floor_ms: u64,
    pub clear_animation_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: BOARD_ROWS,
            cols: BOARD_COLS,
            base_drop_ms: BASE_DROP_MS,
            speedup_per_line_ms: DROP_SPEEDUP_PER_LINE_MS,
            drop_floor_ms: DROP_INTERVAL_FLOOR_MS,
            clear_animation_ms: CLEAR_ANIMATION_MS,
        }
    }
}

/// Current phase of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Falling,
    /// Full rows stay on the board, gravity and spawning are suspended,
    /// until the animation window elapses.
    Clearing {
        rows: ArrayVec<usize, 4>,
        started_at: Instant,
    },
    GameOver,
}

/// Display-only hint of where movement input is steering the piece.
/// Never consulted by gameplay logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostTarget {
    pub kind: PieceKind,
    pub rotation: usize,
    pub column: usize,
}

type LockObserver = Box<dyn FnMut(&LockEvent)>;
type GameOverObserver = Box<dyn FnMut()>;

pub struct Engine {
    config: EngineConfig,
    board: Board,
    rng: SimpleRng,
    phase: Phase,
    active: Option<ActivePiece>,
    ghost: Option<GhostTarget>,
    score: u32,
    lines: u32,
    last_fall: Instant,
    lock_observers: Vec<LockObserver>,
    game_over_observers: Vec<GameOverObserver>,
}

impl Engine {
    pub fn new(config: EngineConfig, seed: u32, now: Instant) -> Self {
        let board = Board::new(config.rows, config.cols);
        Self {
            config,
            board,
            rng: SimpleRng::new(seed),
            phase: Phase::Ready,
            active: None,
            ghost: None,
            score: 0,
            lines: 0,
            last_fall: now,
            lock_observers: Vec::new(),
            game_over_observers: Vec::new(),
        }
    }

    /// Register a callback fired once per piece lock, before row clearing.
    /// An observer that panics is dropped; the engine state is unaffected.
    pub fn on_lock(&mut self, observer: impl FnMut(&LockEvent) + 'static) {
        self.lock_observers.push(Box::new(observer));
    }

    /// Register a callback fired once when the game ends.
    pub fn on_game_over(&mut self, observer: impl FnMut() + 'static) {
        self.game_over_observers.push(Box::new(observer));
    }

    /// Begin a game from `Ready` or `GameOver`. No-op while a game runs.
    pub fn start(&mut self, now: Instant) {
        if matches!(self.phase, Phase::Ready | Phase::GameOver) {
            self.reset(now);
        }
    }

    /// Full reset of grid, score and piece state, then spawn.
    pub fn restart(&mut self, now: Instant) {
        self.reset(now);
    }

    fn reset(&mut self, now: Instant) {
        self.board.clear();
        self.score = 0;
        self.lines = 0;
        self.active = None;
        self.ghost = None;
        self.phase = Phase::Falling;
        self.last_fall = now;
        self.spawn(None, 0, now);
    }

    /// Spawn a piece centered at the top. `None` draws a random kind.
    ///
    /// A spawn whose cells collide with settled blocks is the one fatal
    /// condition: the phase becomes `GameOver` and the piece stays visible
    /// where it overlapped.
    pub fn spawn(&mut self, kind: Option<PieceKind>, rotation: usize, now: Instant) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let kind = kind.unwrap_or_else(|| self.rng.draw_piece());
        let mut piece = ActivePiece::spawn(kind, self.config.cols);
        piece.rotation = rotation % crate::pieces::rotation_count(kind);
        self.last_fall = now;

        if self.piece_fits(&piece) {
            self.active = Some(piece);
            true
        } else {
            self.active = Some(piece);
            self.enter_game_over();
            false
        }
    }

    fn piece_fits(&self, piece: &ActivePiece) -> bool {
        piece.cells().iter().all(|&(r, c)| self.board.is_free(r, c))
    }

    fn enter_game_over(&mut self) {
        self.phase = Phase::GameOver;
        let mut observers = std::mem::take(&mut self.game_over_observers);
        observers.retain_mut(|ob| catch_unwind(AssertUnwindSafe(|| ob())).is_ok());
        self.game_over_observers = observers;
    }

    /// Try to move the active piece by (d_row, d_col).
    /// Returns false without mutation if any target cell is blocked.
    pub fn try_shift(&mut self, d_row: i32, d_col: i32) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };
        let mut moved = piece;
        moved.row += d_row;
        moved.col += d_col;
        if self.piece_fits(&moved) {
            self.active = Some(moved);
            true
        } else {
            false
        }
    }

    /// Rotate the active piece, trying horizontal kicks in a fixed order.
    /// Rotation and column commit atomically; failure leaves the piece as is.
    pub fn rotate(&mut self, dir: RotationDir) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };
        let rotation = piece.next_rotation(dir);
        for kick in KICK_OFFSETS {
            let candidate = ActivePiece {
                rotation,
                col: piece.col + kick,
                ..piece
            };
            if self.piece_fits(&candidate) {
                self.active = Some(candidate);
                return true;
            }
        }
        false
    }

    /// Step the active piece one column toward `target_col` (the desired
    /// left-most occupied column). Smooth tracking rather than teleporting.
    pub fn move_toward_column(&mut self, target_col: usize) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        if self.phase != Phase::Falling {
            return false;
        }
        let min_dc = shape(piece.kind, piece.rotation)
            .iter()
            .map(|&(_, c)| c)
            .min()
            .unwrap_or(0) as i32;
        let desired_anchor = target_col as i32 - min_dc;
        match desired_anchor.cmp(&piece.col) {
            std::cmp::Ordering::Less => self.try_shift(0, -1),
            std::cmp::Ordering::Greater => self.try_shift(0, 1),
            std::cmp::Ordering::Equal => false,
        }
    }

    /// Drop the active piece straight down and lock it.
    pub fn hard_drop(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Falling || self.active.is_none() {
            return false;
        }
        while self.try_shift(1, 0) {}
        self.lock(now);
        true
    }

    /// One gravity step; a blocked step locks the piece where it is.
    pub fn gravity_tick(&mut self, now: Instant) {
        if self.phase != Phase::Falling || self.active.is_none() {
            return;
        }
        if !self.try_shift(1, 0) {
            self.lock(now);
        }
    }

    /// Settle the active piece into the grid.
    ///
    /// Fires the lock observers, then either starts the clear animation over
    /// any full rows or spawns the next piece.
    pub fn lock(&mut self, now: Instant) {
        let Some(piece) = self.active.take() else {
            return;
        };
        self.board.fill(piece.cells(), piece.kind);

        let event = LockEvent {
            kind: piece.kind,
            rotation: piece.rotation,
            final_row: piece.bottom_row().max(0) as usize,
            final_col: piece.leftmost_col().max(0) as usize,
        };
        let mut observers = std::mem::take(&mut self.lock_observers);
        observers.retain_mut(|ob| catch_unwind(AssertUnwindSafe(|| ob(&event))).is_ok());
        self.lock_observers = observers;

        let full = self.board.full_rows();
        if full.is_empty() {
            self.spawn(None, 0, now);
        } else {
            self.phase = Phase::Clearing {
                rows: full,
                started_at: now,
            };
        }
    }

    /// Remove the animated rows, score them and spawn the next piece.
    /// A no-op in any phase other than `Clearing`.
    pub fn finish_clear_animation(&mut self, now: Instant) {
        let Phase::Clearing { rows, .. } = &self.phase else {
            return;
        };
        let rows = rows.clone();
        self.phase = Phase::Falling;
        self.board.remove_rows(&rows);
        let n = rows.len();
        self.score += LINE_SCORES.get(n).copied().unwrap_or(0);
        self.lines += n as u32;
        self.spawn(None, 0, now);
    }

    /// Gravity interval for the current line total: shrinks with cleared
    /// lines down to a floor.
    pub fn fall_interval(&self) -> Duration {
        let ms = self
            .config
            .base_drop_ms
            .saturating_sub(self.config.speedup_per_line_ms * self.lines as u64)
            .max(self.config.drop_floor_ms);
        Duration::from_millis(ms)
    }

    /// Drive the clock-dependent transitions: gravity steps while falling,
    /// animation completion while clearing.
    pub fn update(&mut self, now: Instant) {
        match &self.phase {
            Phase::Falling => {
                if now.duration_since(self.last_fall) >= self.fall_interval() {
                    self.last_fall = now;
                    self.gravity_tick(now);
                }
            }
            Phase::Clearing { started_at, .. } => {
                let elapsed = now.duration_since(*started_at);
                if elapsed >= Duration::from_millis(self.config.clear_animation_ms) {
                    self.finish_clear_animation(now);
                }
            }
            Phase::Ready | Phase::GameOver => {}
        }
    }

    /// Apply a routed command. Returns whether anything changed.
    pub fn apply(&mut self, action: GameAction, now: Instant) -> bool {
        match action {
            GameAction::None => false,
            GameAction::Move { column } => self.move_toward_column(column),
            GameAction::Step { delta } => self.try_shift(0, delta),
            GameAction::Rotate { dir } => self.rotate(dir),
            GameAction::Drop => self.hard_drop(now),
        }
    }

    pub fn set_ghost_target(&mut self, ghost: Option<GhostTarget>) {
        self.ghost = ghost;
    }

    pub fn ghost_target(&self) -> Option<GhostTarget> {
        self.ghost
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Rows currently held by the clear animation, if any.
    pub fn clearing_rows(&self) -> Option<&[usize]> {
        match &self.phase {
            Phase::Clearing { rows, .. } => Some(rows),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}
