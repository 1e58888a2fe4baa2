//! Client registry result types
//!
//! Defines result structures returned by registry operations.

use crate::client::{ClientId, ConnectionHandle};

/// Result of a successful rename request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { old: String, new: String },
    /// The requested name already is the client's name.
    Unchanged,
}

/// A registered client resolved for delivery
#[derive(Clone)]
pub struct Recipient {
    pub id: ClientId,
    pub name: String,
    pub handle: ConnectionHandle,
}
