//! Error handling
//!
//! Defines error types and handling for the chat server.

pub mod handlers;
pub mod types;

pub use handlers::{error_response, handle_error, is_disconnect};
pub use types::*;
