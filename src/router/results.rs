//! Router result types

use crate::client::ClientId;

/// Result of a fan-out send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Recipients whose send failed; their handles have been closed.
    pub failed: Vec<ClientId>,
}
