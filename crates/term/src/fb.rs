//! Styled character framebuffer, the unit of work for the renderer.

use crossterm::style::Color;

/// Per-cell styling. Colors come straight from crossterm so the renderer
/// never has to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Color::Grey,
            bg: Color::Black,
            bold: false,
        }
    }
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub style: Style,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// 2D buffer of styled characters, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            glyphs: vec![Glyph::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        self.idx(x, y).map(|i| self.glyphs[i])
    }

    /// Out-of-bounds writes are dropped, which lets drawing code stay
    /// clamp-free.
    pub fn put(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if let Some(i) = self.idx(x, y) {
            self.glyphs[i] = Glyph { ch, style };
        }
    }

    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: Style) {
        for (i, ch) in s.chars().enumerate() {
            self.put(x + i as u16, y, ch, style);
        }
    }

    pub fn clear(&mut self) {
        self.glyphs.fill(Glyph::default());
    }

    /// Visit each horizontal run of cells that differ from `prev`.
    /// Buffers of different sizes report every row as one dirty run.
    pub fn dirty_runs(&self, prev: &FrameBuffer, mut visit: impl FnMut(u16, u16, u16)) {
        if self.width != prev.width || self.height != prev.height {
            for y in 0..self.height {
                visit(0, y, self.width);
            }
            return;
        }
        for y in 0..self.height {
            let mut run_start: Option<u16> = None;
            for x in 0..self.width {
                let changed = self.get(x, y) != prev.get(x, y);
                match (changed, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(start)) => {
                        visit(start, y, x - start);
                        run_start = None;
                    }
                    _ => {}
                }
            }
            if let Some(start) = run_start {
                visit(start, y, self.width - start);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_writes_are_dropped() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.put(10, 10, 'x', Style::default());
        fb.put_str(3, 0, "abc", Style::default());
        assert_eq!(fb.get(3, 0).unwrap().ch, 'a');
        assert_eq!(fb.get(10, 10), None);
    }

    #[test]
    fn test_dirty_runs_coalesce() {
        let prev = FrameBuffer::new(6, 2);
        let mut next = FrameBuffer::new(6, 2);
        next.put_str(1, 0, "abc", Style::default());
        next.put(5, 1, 'z', Style::default());

        let mut runs = Vec::new();
        next.dirty_runs(&prev, |x, y, len| runs.push((x, y, len)));
        assert_eq!(runs, vec![(1, 0, 3), (5, 1, 1)]);
    }

    #[test]
    fn test_dirty_runs_size_mismatch_is_full_redraw() {
        let prev = FrameBuffer::new(4, 2);
        let next = FrameBuffer::new(6, 2);
        let mut runs = Vec::new();
        next.dirty_runs(&prev, |x, y, len| runs.push((x, y, len)));
        assert_eq!(runs, vec![(0, 0, 6), (0, 1, 6)]);
    }

    #[test]
    fn test_identical_buffers_have_no_dirty_runs() {
        let a = FrameBuffer::new(8, 4);
        let b = a.clone();
        let mut runs = Vec::new();
        b.dirty_runs(&a, |x, y, len| runs.push((x, y, len)));
        assert!(runs.is_empty());
    }
}
