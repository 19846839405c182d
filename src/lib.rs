//! Pose Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so the binary and the
//! integration tests can use `pose_tetris::{core,gesture,router,term,adapter,types}`.

pub use pose_tetris_adapter as adapter;
pub use pose_tetris_core as core;
pub use pose_tetris_gesture as gesture;
pub use pose_tetris_router as router;
pub use pose_tetris_term as term;
pub use pose_tetris_types as types;
