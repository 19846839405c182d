//! Piece definitions - tetromino shapes and the active falling piece
//!
//! Shapes are stored as per-rotation offset tables of four (row, col) cells
//! relative to the piece anchor. Rotation indices wrap over each kind's
//! distinct rotation count (O has 1, I/S/Z have 2, T/J/L have 4), so
//! rotating four times always returns to the original orientation.

use pose_tetris_types::{PieceKind, RotationDir};

/// Offsets are (d_row, d_col) from the anchor; row grows downward.
type Shape = [(i8, i8); 4];

const I_SHAPES: [Shape; 2] = [
    [(0, 0), (0, 1), (0, 2), (0, 3)],
    [(0, 1), (1, 1), (2, 1), (3, 1)],
];

const O_SHAPES: [Shape; 1] = [[(0, 0), (0, 1), (1, 0), (1, 1)]];

const T_SHAPES: [Shape; 4] = [
    [(0, 0), (0, 1), (0, 2), (1, 1)],
    [(0, 1), (1, 0), (1, 1), (2, 1)],
    [(0, 1), (1, 0), (1, 1), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (2, 0)],
];

const S_SHAPES: [Shape; 2] = [
    [(0, 1), (0, 2), (1, 0), (1, 1)],
    [(0, 0), (1, 0), (1, 1), (2, 1)],
];

const Z_SHAPES: [Shape; 2] = [
    [(0, 0), (0, 1), (1, 1), (1, 2)],
    [(0, 1), (1, 0), (1, 1), (2, 0)],
];

const J_SHAPES: [Shape; 4] = [
    [(0, 0), (1, 0), (1, 1), (1, 2)],
    [(0, 0), (0, 1), (1, 0), (2, 0)],
    [(0, 0), (0, 1), (0, 2), (1, 2)],
    [(0, 1), (1, 1), (2, 0), (2, 1)],
];

const L_SHAPES: [Shape; 4] = [
    [(0, 2), (1, 0), (1, 1), (1, 2)],
    [(0, 0), (1, 0), (2, 0), (2, 1)],
    [(0, 0), (0, 1), (0, 2), (1, 0)],
    [(0, 0), (0, 1), (1, 1), (2, 1)],
];

/// Number of distinct rotations for a piece kind.
pub fn rotation_count(kind: PieceKind) -> usize {
    match kind {
        PieceKind::O => 1,
        PieceKind::I | PieceKind::S | PieceKind::Z => 2,
        PieceKind::T | PieceKind::J | PieceKind::L => 4,
    }
}

/// Get the offset table for a kind and rotation index.
/// The rotation index is taken modulo the kind's rotation count.
pub fn shape(kind: PieceKind, rotation: usize) -> &'static Shape {
    let r = rotation % rotation_count(kind);
    match kind {
        PieceKind::I => &I_SHAPES[r],
        PieceKind::O => &O_SHAPES[r],
        PieceKind::T => &T_SHAPES[r],
        PieceKind::S => &S_SHAPES[r],
        PieceKind::Z => &Z_SHAPES[r],
        PieceKind::J => &J_SHAPES[r],
        PieceKind::L => &L_SHAPES[r],
    }
}

/// Width in columns of a shape in the given rotation.
pub fn shape_width(kind: PieceKind, rotation: usize) -> i32 {
    let cells = shape(kind, rotation);
    let min = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);
    let max = cells.iter().map(|&(_, c)| c).max().unwrap_or(0);
    (max - min + 1) as i32
}

/// The currently falling piece: a kind, rotation and anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: usize,
    /// Anchor row; may be negative while the piece is above the board.
    pub row: i32,
    pub col: i32,
}

impl ActivePiece {
    /// Spawn a piece horizontally centered at the top of a board
    /// with the given column count.
    pub fn spawn(kind: PieceKind, cols: usize) -> Self {
        let width = shape_width(kind, 0);
        let min_dc = shape(kind, 0).iter().map(|&(_, c)| c).min().unwrap_or(0) as i32;
        Self {
            kind,
            rotation: 0,
            row: 0,
            col: (cols as i32 - width) / 2 - min_dc,
        }
    }

    /// Absolute board cells occupied in the current pose.
    pub fn cells(&self) -> [(i32, i32); 4] {
        let mut out = [(0, 0); 4];
        for (i, &(dr, dc)) in shape(self.kind, self.rotation).iter().enumerate() {
            out[i] = (self.row + dr as i32, self.col + dc as i32);
        }
        out
    }

    /// The rotation index after turning once in the given direction.
    pub fn next_rotation(&self, dir: RotationDir) -> usize {
        let count = rotation_count(self.kind);
        match dir {
            RotationDir::Cw => (self.rotation + 1) % count,
            RotationDir::Ccw => (self.rotation + count - 1) % count,
        }
    }

    /// Left-most column currently occupied.
    pub fn leftmost_col(&self) -> i32 {
        self.cells().iter().map(|&(_, c)| c).min().unwrap_or(self.col)
    }

    /// Bottom-most row currently occupied.
    pub fn bottom_row(&self) -> i32 {
        self.cells().iter().map(|&(r, _)| r).max().unwrap_or(self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_cells_in_bounds() {
        for kind in PieceKind::ALL {
            for rotation in 0..rotation_count(kind) {
                let cells = shape(kind, rotation);
                assert_eq!(cells.len(), 4);
                for &(dr, dc) in cells {
                    assert!((0..4).contains(&dr), "{:?} r{}", kind, rotation);
                    assert!((0..4).contains(&dc), "{:?} r{}", kind, rotation);
                }
            }
        }
    }

    #[test]
    fn test_shapes_have_distinct_cells() {
        for kind in PieceKind::ALL {
            for rotation in 0..rotation_count(kind) {
                let cells = shape(kind, rotation);
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        assert_ne!(cells[i], cells[j], "{:?} r{}", kind, rotation);
                    }
                }
            }
        }
    }

    #[test]
    fn test_rotation_wraps_to_identity() {
        for kind in PieceKind::ALL {
            let count = rotation_count(kind);
            assert_eq!(shape(kind, 0), shape(kind, count));
        }
    }

    #[test]
    fn test_four_turns_return_to_start() {
        for kind in PieceKind::ALL {
            let mut piece = ActivePiece::spawn(kind, 10);
            let start = piece.rotation;
            for _ in 0..4 {
                piece.rotation = piece.next_rotation(RotationDir::Cw);
            }
            assert_eq!(piece.rotation, start, "{:?}", kind);
        }
    }

    #[test]
    fn test_ccw_undoes_cw() {
        for kind in PieceKind::ALL {
            let piece = ActivePiece::spawn(kind, 10);
            let mut turned = piece;
            turned.rotation = turned.next_rotation(RotationDir::Cw);
            turned.rotation = turned.next_rotation(RotationDir::Ccw);
            assert_eq!(turned.rotation, piece.rotation, "{:?}", kind);
        }
    }

    #[test]
    fn test_spawn_is_centered() {
        // O on a 10-wide board occupies columns 4 and 5.
        let o = ActivePiece::spawn(PieceKind::O, 10);
        let cols: Vec<i32> = o.cells().iter().map(|&(_, c)| c).collect();
        assert!(cols.contains(&4) && cols.contains(&5));
        assert_eq!(o.leftmost_col(), 4);

        // I occupies columns 3..=6.
        let i = ActivePiece::spawn(PieceKind::I, 10);
        assert_eq!(i.leftmost_col(), 3);
        assert_eq!(i.cells().iter().map(|&(_, c)| c).max(), Some(6));
    }

    #[test]
    fn test_spawn_fits_on_narrow_board() {
        for kind in PieceKind::ALL {
            let piece = ActivePiece::spawn(kind, 4);
            for (_, col) in piece.cells() {
                assert!((0..4).contains(&col), "{:?} col {}", kind, col);
            }
        }
    }

    #[test]
    fn test_bottom_row_tracks_rotation() {
        let mut i = ActivePiece::spawn(PieceKind::I, 10);
        assert_eq!(i.bottom_row(), 0);
        i.rotation = 1;
        assert_eq!(i.bottom_row(), 3);
    }
}
