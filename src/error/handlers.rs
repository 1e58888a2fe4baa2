//! Error handlers
//!
//! Classifies and reports errors surfaced by connection workers.

use std::io;

use log::{error, warn};

use crate::error::types::{ChatServerError, CommandError, TransportError};
use crate::protocol::responses;

/// Log a chat server error at a level matching its severity.
pub fn handle_error(err: &ChatServerError) {
    match err {
        ChatServerError::Transport(TransportError::IoError(e))
        | ChatServerError::IoError(e)
            if is_disconnect(e) =>
        {
            warn!("Peer went away: {}", err)
        }
        ChatServerError::Transport(_) => warn!("{}", err),
        _ => error!("Chat server error: {}", err),
    }
}

/// Convert a protocol error to the reply line sent back to the client.
pub fn error_response(err: &CommandError, max_name_length: usize) -> String {
    match err {
        CommandError::NameTaken => responses::NAME_TAKEN.to_string(),
        CommandError::InvalidName => responses::invalid_name_entered(max_name_length),
        CommandError::InvalidTarget => responses::invalid_name_specified(max_name_length),
        CommandError::MissingParameter => responses::MISSING_PARAMETER.to_string(),
        CommandError::TargetNotFound => responses::USER_NOT_FOUND.to_string(),
        CommandError::SelfTarget => responses::PM_SELF.to_string(),
        CommandError::EmptyMessage => responses::PM_EMPTY.to_string(),
        CommandError::InvalidCommand | CommandError::NotRegistered => {
            responses::INVALID_COMMAND.to_string()
        }
    }
}

/// Whether an I/O error just means the peer is gone.
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::NotConnected
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_wording() {
        assert_eq!(error_response(&CommandError::NameTaken, 10), "Username already taken.\n");
        assert_eq!(
            error_response(&CommandError::SelfTarget, 10),
            "Cannot send private message to self.\n"
        );
        assert!(error_response(&CommandError::InvalidTarget, 7).contains("at most 7 characters"));
    }

    #[test]
    fn test_is_disconnect() {
        assert!(is_disconnect(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(is_disconnect(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_disconnect(&io::Error::from(io::ErrorKind::InvalidData)));
    }
}
