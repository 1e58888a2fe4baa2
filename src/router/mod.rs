//! Message routing
//!
//! Broadcast, private delivery and member listing on top of the client registry.

pub mod operations;
pub mod results;

pub use operations::Router;
pub use results::BroadcastReport;
