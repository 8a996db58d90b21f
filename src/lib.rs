#![allow(clippy::doc_markdown)] // Allow technical terms like MGET, JoinSet in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Ledger Status
//!
//! Health snapshots for distributed ledger nodes.
//!
//! ## Overview
//!
//! Each reporting cycle gathers a node's recent operation and event rates from
//! per-second cache counters, queries the ledger for event counts and
//! consensus timing, assembles a status snapshot and posts it to a central
//! collector. Secondary nodes also use the same client to fetch the genesis
//! block from a primary.
//!
//! The cycle is expressed as a dependency graph of asynchronous tasks: reads
//! that do not depend on each other run concurrently, and the first failure
//! abandons the cycle so a partial snapshot is never published.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Dependency-graph task executor
//! - [`metrics`] - Windowed counter reads and aggregation
//! - [`cache`] - Counter store seam with Redis and in-memory backends
//! - [`ledger`] - Ledger node collaborator traits
//! - [`reporting`] - Reporting graph, snapshot assembly, cycle runner
//! - [`client`] - Genesis retrieval and status publication over HTTP
//! - [`key_namer`] - Node token derivation and cache key names
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledger_status::config::ReporterConfig;
//! use ledger_status::ledger::InMemoryLedgerRegistry;
//! use ledger_status::logging::init_structured_logging;
//! use ledger_status::reporting::StatusReporter;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReporterConfig::from_env()?;
//! init_structured_logging(&config.logging);
//!
//! let registry = Arc::new(InMemoryLedgerRegistry::new());
//! let reporter = StatusReporter::from_config(&config, registry).await?;
//!
//! let snapshot = reporter.report_once().await?;
//! println!("published {} events", snapshot.status.events.total);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod key_namer;
pub mod ledger;
pub mod logging;
pub mod metrics;
pub mod orchestration;
pub mod reporting;

pub use client::{GenesisBlock, StatusPublisher};
pub use config::ReporterConfig;
pub use error::{ReporterError, ReporterResult};
pub use key_namer::{token_for, KeyNamer};
pub use orchestration::{Task, TaskGraph, TaskResults};
pub use reporting::{PublishContext, SnapshotAssembler, StatusReporter, StatusSnapshot};
