//! Game engine crate: board grid, tetromino shapes, deterministic RNG and
//! the phase state machine that ties them together.
//!
//! Everything here is synchronous and clock-free: operations that depend on
//! time take an `Instant` from the caller.

pub mod board;
pub mod engine;
pub mod pieces;
pub mod rng;

pub use board::Board;
pub use engine::{Engine, EngineConfig, GhostTarget, Phase};
pub use pieces::{rotation_count, shape, shape_width, ActivePiece};
pub use rng::SimpleRng;
