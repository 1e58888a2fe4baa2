//! Shared server state handed to every connection worker.

use std::sync::Arc;

use crate::client::ClientRegistry;
use crate::config::ServerConfig;
use crate::router::Router;

/// Cheaply cloneable bundle of the registry, router and configuration.
#[derive(Clone)]
pub struct ServerContext {
    pub registry: Arc<ClientRegistry>,
    pub router: Router,
    pub config: Arc<ServerConfig>,
}

impl ServerContext {
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(ClientRegistry::new(config.max_name_length));
        Self {
            router: Router::new(Arc::clone(&registry)),
            registry,
            config: Arc::new(config),
        }
    }
}
