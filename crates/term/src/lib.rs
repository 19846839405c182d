//! Terminal presentation crate: framebuffer, diffing renderer and the game
//! view that projects engine state onto it.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use fb::{FrameBuffer, Glyph, Style};
pub use game_view::GameView;
pub use renderer::TerminalRenderer;
