//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;

use crate::client::ClientId;

/// Client registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NameTaken(String),
    InvalidName(String),
    ClientNotFound(ClientId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NameTaken(n) => write!(f, "Username already taken: {}", n),
            RegistryError::InvalidName(n) => write!(f, "Invalid username: {:?}", n),
            RegistryError::ClientNotFound(id) => write!(f, "Client not found: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Protocol errors, each answered with exactly one reply line to the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    NameTaken,
    InvalidName,
    InvalidTarget,
    MissingParameter,
    TargetNotFound,
    SelfTarget,
    EmptyMessage,
    InvalidCommand,
    /// The sender's own record is gone; the session is over.
    NotRegistered,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NameTaken => write!(f, "requested username is taken"),
            CommandError::InvalidName => write!(f, "requested username is malformed"),
            CommandError::InvalidTarget => write!(f, "PM target is malformed"),
            CommandError::MissingParameter => write!(f, "missing parameter"),
            CommandError::TargetNotFound => write!(f, "PM target not found"),
            CommandError::SelfTarget => write!(f, "PM addressed to self"),
            CommandError::EmptyMessage => write!(f, "empty PM"),
            CommandError::InvalidCommand => write!(f, "unrecognized command"),
            CommandError::NotRegistered => write!(f, "sender is no longer registered"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<RegistryError> for CommandError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NameTaken(_) => CommandError::NameTaken,
            RegistryError::InvalidName(_) => CommandError::InvalidName,
            RegistryError::ClientNotFound(_) => CommandError::NotRegistered,
        }
    }
}

/// Errors raised while writing to a single connection
#[derive(Debug)]
pub enum TransportError {
    /// The handle was already closed, locally or by the router
    ConnectionClosed,
    IoError(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionClosed => write!(f, "Connection already closed"),
            TransportError::IoError(e) => write!(f, "Send failed: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::IoError(error)
    }
}

/// Message routing errors
#[derive(Debug)]
pub enum RouteError {
    TargetNotFound(String),
    Transport(TransportError),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::TargetNotFound(n) => write!(f, "No client named {}", n),
            RouteError::Transport(e) => write!(f, "Delivery failed: {}", e),
        }
    }
}

impl std::error::Error for RouteError {}

impl From<TransportError> for RouteError {
    fn from(error: TransportError) -> Self {
        RouteError::Transport(error)
    }
}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Transport(TransportError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Transport(e) => write!(f, "Transport error: {}", e),
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<TransportError> for ChatServerError {
    fn from(error: TransportError) -> Self {
        ChatServerError::Transport(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_convert_to_server_error() {
        let err: ChatServerError = config::ConfigError::Message("port cannot be 0".into()).into();
        assert!(matches!(err, ChatServerError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: port cannot be 0");

        let err: ChatServerError = TransportError::ConnectionClosed.into();
        assert_eq!(err.to_string(), "Transport error: Connection already closed");
    }
}
