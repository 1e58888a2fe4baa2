//! Client registry
//!
//! The single authoritative set of connected clients.
//!
//! Every mutation and every read that must be consistent goes through one
//! `tokio::sync::Mutex` covering the whole collection, so register, rename
//! and remove are linearizable with respect to each other. No I/O is ever
//! awaited while the lock is held; fan-out callers take a snapshot with
//! [`ClientRegistry::recipients_except`] and send after it is released.

use log::debug;
use tokio::sync::Mutex;

use crate::client::results::{Recipient, RenameOutcome};
use crate::client::{ClientId, ClientRecord, ConnectionHandle, MembershipStatus};
use crate::error::RegistryError;
use crate::protocol::validation::is_valid_name;

struct RegistryInner {
    /// Join order is the canonical listing order.
    records: Vec<ClientRecord>,
    next_id: u64,
}

impl RegistryInner {
    fn position(&self, id: ClientId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn name_in_use(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name() == name)
    }
}

/// Registry for tracking connected chat clients
pub struct ClientRegistry {
    inner: Mutex<RegistryInner>,
    max_name_length: usize,
}

impl ClientRegistry {
    pub fn new(max_name_length: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                records: Vec::new(),
                next_id: 1,
            }),
            max_name_length,
        }
    }

    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Atomically checks that `candidate` is valid and free, then inserts a new record.
    ///
    /// The record starts out `Joining`: it holds its name but receives no
    /// broadcasts until [`activate`](Self::activate) is called.
    pub async fn try_register(
        &self,
        candidate: &str,
        handle: ConnectionHandle,
    ) -> Result<ClientId, RegistryError> {
        if !is_valid_name(candidate, self.max_name_length) {
            return Err(RegistryError::InvalidName(candidate.to_string()));
        }

        let mut inner = self.inner.lock().await;
        if inner.name_in_use(candidate) {
            return Err(RegistryError::NameTaken(candidate.to_string()));
        }

        let id = ClientId::new(inner.next_id);
        inner.next_id += 1;
        inner
            .records
            .push(ClientRecord::new(id, candidate.to_string(), handle));

        debug!("Registered {} as {} ({} clients)", id, candidate, inner.records.len());
        Ok(id)
    }

    /// Atomically renames a client in place, keeping its position in join order.
    pub async fn rename(&self, id: ClientId, new_name: &str) -> Result<RenameOutcome, RegistryError> {
        let mut inner = self.inner.lock().await;
        let index = inner
            .position(id)
            .ok_or(RegistryError::ClientNotFound(id))?;

        if inner.records[index].name() == new_name {
            return Ok(RenameOutcome::Unchanged);
        }

        if !is_valid_name(new_name, self.max_name_length) {
            return Err(RegistryError::InvalidName(new_name.to_string()));
        }

        if inner.name_in_use(new_name) {
            return Err(RegistryError::NameTaken(new_name.to_string()));
        }

        let record = &mut inner.records[index];
        let old = record.name().to_string();
        record.set_name(new_name.to_string());

        Ok(RenameOutcome::Renamed {
            old,
            new: new_name.to_string(),
        })
    }

    /// Removes a client, returning its record the first time only.
    ///
    /// Calling this again for the same id is a no-op that returns `None`.
    pub async fn remove(&self, id: ClientId) -> Option<ClientRecord> {
        let mut inner = self.inner.lock().await;
        let index = inner.position(id)?;
        let mut record = inner.records.remove(index);
        record.set_status(MembershipStatus::Removed);

        debug!("Removed {} ({} clients left)", id, inner.records.len());
        Some(record)
    }

    /// Completes the join handshake; the client now receives messages.
    pub async fn activate(&self, id: ClientId) -> bool {
        self.set_status(id, MembershipStatus::Active).await
    }

    /// Flags a client as leaving so it no longer receives broadcasts.
    pub async fn mark_leaving(&self, id: ClientId) -> bool {
        self.set_status(id, MembershipStatus::Leaving).await
    }

    async fn set_status(&self, id: ClientId, status: MembershipStatus) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.position(id) {
            Some(index) => {
                inner.records[index].set_status(status);
                true
            }
            None => false,
        }
    }

    pub async fn status(&self, id: ClientId) -> MembershipStatus {
        let inner = self.inner.lock().await;
        inner
            .position(id)
            .map(|index| inner.records[index].status())
            .unwrap_or(MembershipStatus::Removed)
    }

    pub async fn name_of(&self, id: ClientId) -> Option<String> {
        let inner = self.inner.lock().await;
        inner
            .position(id)
            .map(|index| inner.records[index].name().to_string())
    }

    /// Point-in-time list of member names in join order.
    ///
    /// Clients still in the join handshake are left out until activated.
    pub async fn snapshot_names(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner
            .records
            .iter()
            .filter(|r| r.status() != MembershipStatus::Joining)
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Exact, case-sensitive lookup of an active client by name.
    pub async fn find(&self, name: &str) -> Option<Recipient> {
        let inner = self.inner.lock().await;
        inner
            .records
            .iter()
            .find(|r| r.name() == name && r.is_active())
            .map(|r| Recipient {
                id: r.id(),
                name: r.name().to_string(),
                handle: r.handle().clone(),
            })
    }

    /// Snapshot of every active client except `excluded`, in join order.
    pub async fn recipients_except(&self, excluded: ClientId) -> Vec<Recipient> {
        let inner = self.inner.lock().await;
        inner
            .records
            .iter()
            .filter(|r| r.id() != excluded && r.is_active())
            .map(|r| Recipient {
                id: r.id(),
                name: r.name().to_string(),
                handle: r.handle().clone(),
            })
            .collect()
    }

    pub async fn count_active(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.records.iter().filter(|r| r.is_active()).count()
    }

    /// Number of registered clients, joining and leaving ones included.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.records.is_empty()
    }
}
