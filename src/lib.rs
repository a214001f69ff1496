//! Active-mode FTP server library.
//!
//! Exposes the control-connection state machine (command parsing, session
//! state, data-channel establishment and transfers) so it can be driven by
//! the binary or embedded in tests.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transfer;

pub use server::{Server, ServerConfig};
