//! Client management system
//!
//! Handles client connections, the shared client registry and the
//! per-connection session lifecycle.

pub mod connection;
pub mod handler;
pub mod registry;
pub mod results;
pub mod session;
pub mod state;

pub use connection::ConnectionHandle;
pub use handler::handle_client;
pub use registry::ClientRegistry;
pub use results::{Recipient, RenameOutcome};
pub use session::ClientSession;
pub use state::{ClientId, ClientRecord, MembershipStatus};
