//! Client session handling
//!
//! Per-connection session state and the control loop that drives it.

pub mod handler;
pub mod state;

pub use handler::{LoopState, handle_client};
pub use state::Session;
