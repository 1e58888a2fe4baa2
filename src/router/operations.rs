//! Router operations
//!
//! Resolves a target selection to recipients through the registry and
//! delivers text to each of them.

use std::sync::Arc;

use log::{info, warn};

use crate::client::{ClientId, ClientRegistry};
use crate::error::RouteError;
use crate::protocol::responses;
use crate::router::results::BroadcastReport;

/// Delivers messages to registered clients.
#[derive(Clone)]
pub struct Router {
    registry: Arc<ClientRegistry>,
}

impl Router {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Sends `text` to every active client except `sender`.
    ///
    /// Recipients are snapshotted first and sent to after the registry lock
    /// is released. A failed send closes that recipient's handle, so its own
    /// worker tears the session down, and delivery carries on with the rest.
    pub async fn broadcast_except(&self, sender: ClientId, text: &str) -> BroadcastReport {
        let recipients = self.registry.recipients_except(sender).await;
        let mut report = BroadcastReport::default();

        for recipient in recipients {
            match recipient.handle.send(text).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        "Dropping {} ({}) after failed broadcast: {}",
                        recipient.name, recipient.id, e
                    );
                    recipient.handle.close();
                    report.failed.push(recipient.id);
                }
            }
        }

        report
    }

    /// Sends `text` to the client currently named `target`.
    pub async fn unicast(&self, target: &str, text: &str) -> Result<ClientId, RouteError> {
        let recipient = self
            .registry
            .find(target)
            .await
            .ok_or_else(|| RouteError::TargetNotFound(target.to_string()))?;

        recipient
            .handle
            .send(text)
            .await
            .inspect_err(|_| recipient.handle.close())?;

        Ok(recipient.id)
    }

    /// Renders the member list in join order.
    pub async fn list_members(&self) -> String {
        let names = self.registry.snapshot_names().await;
        info!("Listing {} members", names.len());
        responses::member_list(&names)
    }
}
