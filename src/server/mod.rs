//! Server core functionality
//!
//! This module contains the listener, the accept loop and the state shared
//! with every connection worker.

pub mod context;
pub mod core;

pub use context::ServerContext;
pub use self::core::Server;
