//! Gesture interpretation crate: normalized pose landmarks in, debounced
//! [`GestureState`](pose_tetris_types::GestureState) snapshots out.

pub mod interpreter;
pub mod pose;

pub use interpreter::{GestureConfig, GestureInterpreter};
pub use pose::{Landmark, LandmarkIndex, PoseFrame, LANDMARK_COUNT};
