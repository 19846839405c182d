//! Command routing crate: interaction bindings, gesture handlers and the
//! debouncing router that turns gesture snapshots into game commands.

pub mod binding;
pub mod handlers;
pub mod router;

pub use binding::{classify_id, resolve_id, InteractionBinding};
pub use handlers::GestureHandler;
pub use router::{CommandRouter, RouterConfig};
