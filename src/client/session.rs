//! Client session
//!
//! Everything a connection worker knows after joining: its own id and
//! outbound handle, plus shared access to the registry and router. Other
//! clients are only ever reached through those two.

use std::sync::Arc;

use crate::client::{ClientId, ClientRegistry, ConnectionHandle};
use crate::error::TransportError;
use crate::router::Router;
use crate::server::ServerContext;

/// A joined client's view of the server
pub struct ClientSession {
    id: ClientId,
    handle: ConnectionHandle,
    context: ServerContext,
}

impl ClientSession {
    pub fn new(id: ClientId, handle: ConnectionHandle, context: ServerContext) -> Self {
        Self {
            id,
            handle,
            context,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.context.registry
    }

    pub fn router(&self) -> &Router {
        &self.context.router
    }

    pub fn max_name_length(&self) -> usize {
        self.context.config.max_name_length
    }

    pub fn buffer_size(&self) -> usize {
        self.context.config.buffer_size
    }

    /// Current username, or the connection id once the record is gone.
    pub async fn name(&self) -> String {
        self.registry()
            .name_of(self.id)
            .await
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Sends a reply to this client only.
    pub async fn reply(&self, message: &str) -> Result<(), TransportError> {
        self.handle.send(message).await
    }
}
