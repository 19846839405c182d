//! Pose feed adapter crate: a line-delimited JSON TCP server for pose
//! estimation clients, bridged into the synchronous game loop.

pub mod feed;
pub mod protocol;
pub mod server;

pub use feed::PoseFeed;
pub use server::{FeedEvent, ServerConfig, StateSnapshot};
