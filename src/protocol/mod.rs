//! Chat protocol implementation
//!
//! Handles command parsing, validation, and response generation.

pub mod commands;
pub mod handlers;
pub mod responses;
pub mod validation;

pub use commands::{ChatInput, Command, CommandOutcome, parse_input};
pub use handlers::{handle_command, handle_input};
