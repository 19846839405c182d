//! Composes the play field, side panel and banners into a framebuffer.
//!
//! The view is a pure function of engine state plus the latest gesture
//! snapshot; it owns no state of its own.

use crossterm::style::Color;

use pose_tetris_core::{Engine, Phase};
use pose_tetris_types::{GameAction, GestureState, PieceKind};

use crate::fb::{FrameBuffer, Style};

/// Each board cell is two characters wide.
const CELL_W: u16 = 2;
/// Side panel width to the right of the well.
const PANEL_W: u16 = 24;

pub struct GameView;

impl GameView {
    /// Terminal size needed for a board of the given dimensions.
    pub fn required_size(rows: usize, cols: usize) -> (u16, u16) {
        (cols as u16 * CELL_W + 2 + PANEL_W, rows as u16 + 3)
    }

    /// Render one frame of the game.
    pub fn render(
        engine: &Engine,
        gesture: Option<&GestureState>,
        last_action: GameAction,
    ) -> FrameBuffer {
        let rows = engine.board().rows();
        let cols = engine.board().cols();
        let (w, h) = Self::required_size(rows, cols);
        let mut fb = FrameBuffer::new(w, h);

        draw_well_frame(&mut fb, rows, cols);
        draw_ghost_marker(&mut fb, engine);
        draw_cells(&mut fb, engine);
        draw_panel(&mut fb, engine, gesture, last_action, cols);

        if engine.is_game_over() {
            draw_banner(&mut fb, rows, cols, " GAME OVER - r to restart ");
        }
        fb
    }
}

fn well_origin() -> (u16, u16) {
    // One row above the well is reserved for the ghost marker.
    (1, 2)
}

fn draw_well_frame(fb: &mut FrameBuffer, rows: usize, cols: usize) {
    let (ox, oy) = well_origin();
    let inner_w = cols as u16 * CELL_W;
    let frame = Style::fg(Color::DarkGrey);

    for x in 0..inner_w {
        fb.put(ox + x, oy - 1, '─', frame);
        fb.put(ox + x, oy + rows as u16, '─', frame);
    }
    for y in 0..rows as u16 {
        fb.put(ox - 1, oy + y, '│', frame);
        fb.put(ox + inner_w, oy + y, '│', frame);
    }
    fb.put(ox - 1, oy - 1, '┌', frame);
    fb.put(ox + inner_w, oy - 1, '┐', frame);
    fb.put(ox - 1, oy + rows as u16, '└', frame);
    fb.put(ox + inner_w, oy + rows as u16, '┘', frame);
}

fn draw_ghost_marker(fb: &mut FrameBuffer, engine: &Engine) {
    let Some(ghost) = engine.ghost_target() else {
        return;
    };
    let (ox, oy) = well_origin();
    let x = ox + ghost.column as u16 * CELL_W;
    fb.put_str(x, oy - 2, "vv", Style::fg(Color::DarkGrey));
}

fn draw_cells(fb: &mut FrameBuffer, engine: &Engine) {
    let (ox, oy) = well_origin();
    let board = engine.board();

    for row in 0..board.rows() {
        for col in 0..board.cols() {
            if let Some(Some(kind)) = board.get(row as i32, col as i32) {
                put_block(fb, ox, oy, row, col, Style::fg(kind_color(kind)));
            }
        }
    }

    // Clearing rows flash over the settled cells.
    if let Some(rows) = engine.clearing_rows() {
        let flash = Style::fg(Color::White).bold();
        for &row in rows {
            for col in 0..board.cols() {
                let x = ox + col as u16 * CELL_W;
                fb.put_str(x, oy + row as u16, "▒▒", flash);
            }
        }
    }

    if let Some(piece) = engine.active_piece() {
        let style = Style::fg(kind_color(piece.kind)).bold();
        for (row, col) in piece.cells() {
            if row >= 0 {
                put_block(fb, ox, oy, row as usize, col as usize, style);
            }
        }
    }
}

fn put_block(fb: &mut FrameBuffer, ox: u16, oy: u16, row: usize, col: usize, style: Style) {
    let x = ox + col as u16 * CELL_W;
    fb.put_str(x, oy + row as u16, "[]", style);
}

fn draw_panel(
    fb: &mut FrameBuffer,
    engine: &Engine,
    gesture: Option<&GestureState>,
    last_action: GameAction,
    cols: usize,
) {
    let x = cols as u16 * CELL_W + 4;
    let label = Style::fg(Color::Grey);
    let value = Style::fg(Color::White).bold();

    fb.put_str(x, 2, "pose-tetris", value);
    fb.put_str(x, 4, &format!("score {:>6}", engine.score()), label);
    fb.put_str(x, 5, &format!("lines {:>6}", engine.lines()), label);
    fb.put_str(
        x,
        6,
        &format!("speed {:>4}ms", engine.fall_interval().as_millis()),
        label,
    );

    let phase = match engine.phase() {
        Phase::Ready => "ready",
        Phase::Falling => "falling",
        Phase::Clearing { .. } => "clearing",
        Phase::GameOver => "game over",
    };
    fb.put_str(x, 7, &format!("phase {:>9}", phase), label);

    fb.put_str(x, 9, &gesture_line(gesture), label);
    fb.put_str(x, 10, &action_line(last_action), label);
    fb.put_str(x, 12, "q quit  r restart", Style::fg(Color::DarkGrey));
}

fn gesture_line(gesture: Option<&GestureState>) -> String {
    let Some(g) = gesture else {
        return "pose  (no signal)".to_string();
    };
    if g.idle {
        return "pose  idle".to_string();
    }
    let mut flags = Vec::new();
    if g.hip_left {
        flags.push("hipL");
    }
    if g.hip_right {
        flags.push("hipR");
    }
    if g.both_hands_up {
        flags.push("hands^^");
    } else {
        if g.left_hand_up {
            flags.push("L^");
        }
        if g.right_hand_up {
            flags.push("R^");
        }
    }
    if g.lean_left {
        flags.push("leanL");
    }
    if g.lean_right {
        flags.push("leanR");
    }
    if g.squat {
        flags.push("squat");
    }
    format!("pose  {}", flags.join(" "))
}

fn action_line(action: GameAction) -> String {
    match action {
        GameAction::None => "cmd   -".to_string(),
        GameAction::Move { column } => format!("cmd   move->{}", column),
        GameAction::Step { delta } if delta < 0 => "cmd   step left".to_string(),
        GameAction::Step { .. } => "cmd   step right".to_string(),
        GameAction::Rotate { .. } => "cmd   rotate".to_string(),
        GameAction::Drop => "cmd   drop".to_string(),
    }
}

fn draw_banner(fb: &mut FrameBuffer, rows: usize, cols: usize, text: &str) {
    let (ox, oy) = well_origin();
    let inner_w = cols as u16 * CELL_W;
    let y = oy + rows as u16 / 2;
    let x = ox + inner_w.saturating_sub(text.len() as u16) / 2;
    fb.put_str(x, y, text, Style::fg(Color::Red).bold());
}

fn kind_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Cyan,
        PieceKind::O => Color::Yellow,
        PieceKind::T => Color::Magenta,
        PieceKind::S => Color::Green,
        PieceKind::Z => Color::Red,
        PieceKind::J => Color::Blue,
        PieceKind::L => Color::DarkYellow,
    }
}
