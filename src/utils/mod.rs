//! Utility functions
//!
//! Provides logging and network helpers shared by the server and client binaries.

pub mod logging;
pub mod network;
