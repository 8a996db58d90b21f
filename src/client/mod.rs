//! # Network Clients
//!
//! Outbound HTTP: genesis retrieval from a primary node and status
//! publication to the collector.

pub mod publisher;

pub use publisher::{GenesisBlock, StatusPublisher};
