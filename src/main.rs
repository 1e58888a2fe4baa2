//! Chatroom server - Entry Point
//!
//! A multi-client text chat server with broadcast, listing and private messages.

use log::{error, info};

use chatroom::error::ChatServerError;
use chatroom::utils::logging::setup_logging;
use chatroom::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    setup_logging("info");

    if let Err(e) = run().await {
        error!("Server startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ChatServerError> {
    let config = ServerConfig::load()?;
    info!("Launching chat server on {}...", config.socket_addr());

    let server = Server::bind(config).await?;
    server.start().await;
    Ok(())
}
