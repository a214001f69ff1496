//! Server core functionality
//!
//! This module contains the listener bootstrap and configuration.

pub mod config;
pub mod core;

pub use self::config::{Cli, ServerConfig};
pub use self::core::Server;
