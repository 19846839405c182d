//! Flushes framebuffers to the terminal, drawing only what changed.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::fb::{FrameBuffer, Style};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    prev: Option<FrameBuffer>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            prev: None,
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.queue(terminal::EnterAlternateScreen)?;
        self.stdout.queue(cursor::Hide)?;
        self.stdout.flush()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(cursor::Show)?;
        self.stdout.queue(terminal::LeaveAlternateScreen)?;
        self.stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to repaint everything (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.prev = None;
    }

    /// Diff `fb` against the previously drawn frame and flush the changes.
    /// The frame is kept for the next diff; the caller passes a fresh one
    /// each tick.
    pub fn draw(&mut self, fb: FrameBuffer) -> Result<()> {
        match self.prev.take() {
            Some(prev) if prev == fb => {
                self.prev = Some(prev);
                return Ok(());
            }
            Some(prev) => {
                let mut failure = None;
                fb.dirty_runs(&prev, |x, y, len| {
                    if failure.is_none() {
                        if let Err(e) = self.draw_run(&fb, x, y, len) {
                            failure = Some(e);
                        }
                    }
                });
                if let Some(e) = failure {
                    return Err(e);
                }
            }
            None => {
                self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
                for y in 0..fb.height() {
                    self.draw_run(&fb, 0, y, fb.width())?;
                }
            }
        }
        self.stdout.queue(ResetColor)?;
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.flush()?;
        self.prev = Some(fb);
        Ok(())
    }

    fn draw_run(&mut self, fb: &FrameBuffer, x: u16, y: u16, len: u16) -> Result<()> {
        self.stdout.queue(cursor::MoveTo(x, y))?;
        let mut active: Option<Style> = None;
        for dx in 0..len {
            let glyph = fb.get(x + dx, y).unwrap_or_default();
            if active != Some(glyph.style) {
                self.apply_style(glyph.style)?;
                active = Some(glyph.style);
            }
            self.stdout.queue(Print(glyph.ch))?;
        }
        Ok(())
    }

    fn apply_style(&mut self, style: Style) -> Result<()> {
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(SetForegroundColor(style.fg))?;
        self.stdout.queue(SetBackgroundColor(style.bg))?;
        if style.bold {
            self.stdout.queue(SetAttribute(Attribute::Bold))?;
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}
