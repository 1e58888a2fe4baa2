use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::Semaphore;

use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::error::{ChatServerError, handle_error};
use crate::protocol::responses;
use crate::server::ServerContext;
use crate::utils::network::parse_socket_addr;

pub struct Server {
    listener: TcpListener,
    context: ServerContext,
    /// One permit per client slot, held for the lifetime of the connection.
    slots: Arc<Semaphore>,
}

impl Server {
    /// Binds the listener with the configured backlog.
    ///
    /// The configuration is taken as-is; `ServerConfig::load` validates it.
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        let addr = parse_socket_addr(&config.socket_addr())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            listener,
            slots: Arc::new(Semaphore::new(config.max_clients)),
            context: ServerContext::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop forever.
    pub async fn start(self) {
        info!(
            "Server has initialised (max {} clients)",
            self.context.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.dispatch(stream, addr),
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    /// Hands a new connection to its own worker task, or turns it away when
    /// every client slot is taken.
    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        let permit = match Arc::clone(&self.slots).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Rejecting {}: server is full", addr);
                tokio::spawn(reject_full(stream));
                return;
            }
        };

        info!("Accepted connection from {}", addr);
        let context = self.context.clone();

        // Spawn a task for each client so the accept loop doesn't block
        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            if let Err(e) = handle_client(reader, writer, Some(addr), context).await {
                handle_error(&e);
            }
            drop(permit);
        });
    }
}

async fn reject_full(mut stream: TcpStream) {
    if let Err(e) = stream.write_all(responses::FULL.as_bytes()).await {
        debug!("Could not send full-server notice: {}", e);
        return;
    }
    if let Err(e) = stream.shutdown().await {
        debug!("Could not shut down rejected connection: {}", e);
    }
}
