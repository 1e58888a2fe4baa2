//! Connection handle
//!
//! Outbound side of one client connection. Cloning the handle shares the
//! same underlying writer, so the worker and the router can both send to it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, watch};

use crate::error::TransportError;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared, cloneable sender for one connection.
///
/// Writes are serialized per handle so two concurrent senders never
/// interleave the bytes of their messages. `close` marks the connection as
/// dead; the worker that owns the connection observes this through
/// [`ConnectionHandle::closed`] and tears the session down.
#[derive(Clone)]
pub struct ConnectionHandle {
    peer: Option<SocketAddr>,
    writer: Arc<Mutex<BoxedWriter>>,
    closed: Arc<watch::Sender<bool>>,
}

impl ConnectionHandle {
    pub fn new<W>(writer: W, peer: Option<SocketAddr>) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (closed, _) = watch::channel(false);
        Self {
            peer,
            writer: Arc::new(Mutex::new(Box::new(writer))),
            closed: Arc::new(closed),
        }
    }

    /// Remote address, when the connection is a real socket.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Writes one complete message and flushes it.
    pub async fn send(&self, message: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(message.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Marks the connection as dead. Idempotent.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once [`close`](Self::close) has been called on any clone.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Closes the handle and shuts down the write side of the connection.
    pub async fn shutdown(&self) {
        self.close();
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_send_writes_whole_message() {
        let (local, mut remote) = tokio::io::duplex(256);
        let handle = ConnectionHandle::new(local, None);

        handle.send("hello\n").await.unwrap();

        let mut buf = [0u8; 6];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello\n");
    }

    #[tokio::test]
    async fn test_send_to_dropped_peer_fails() {
        let (local, remote) = tokio::io::duplex(256);
        drop(remote);
        let handle = ConnectionHandle::new(local, None);

        assert!(matches!(
            handle.send("hello\n").await,
            Err(TransportError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_close_is_visible_to_clones() {
        let handle = ConnectionHandle::new(tokio::io::sink(), None);
        let clone = handle.clone();

        clone.close();
        handle.closed().await;

        assert!(handle.is_closed());
        assert!(matches!(
            handle.send("late\n").await,
            Err(TransportError::ConnectionClosed)
        ));
    }
}
