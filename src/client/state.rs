//! Module `state`
//!
//! Defines the `ClientRecord` struct and the identity and lifecycle types
//! the registry uses to track a connected chat client.

use std::fmt;

use crate::client::ConnectionHandle;

/// Registry-assigned identifier of a connection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle guard of a client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    /// Name reserved during the join handshake; not yet a message recipient.
    Joining,
    Active,
    /// `/quit` accepted; departure is being announced.
    Leaving,
    Removed,
}

/// Represents the server-side state of a connected chat client.
pub struct ClientRecord {
    id: ClientId,
    name: String,
    handle: ConnectionHandle,
    status: MembershipStatus,
}

impl ClientRecord {
    pub(crate) fn new(id: ClientId, name: String, handle: ConnectionHandle) -> Self {
        Self {
            id,
            name,
            handle,
            status: MembershipStatus::Joining,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the client's current username.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the handle used to send text to this client.
    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn status(&self) -> MembershipStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    // --------------------
    // Setter methods
    // --------------------

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_status(&mut self, status: MembershipStatus) {
        self.status = status;
    }
}

impl fmt::Debug for ClientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("peer", &self.handle.peer())
            .field("status", &self.status)
            .finish()
    }
}
