#![deny(missing_docs)]
//! Auto-forward core library.
//!
//! Transport-agnostic logic for relaying channel history: the setup wizard,
//! the job supervisor and the forward executor.

/// Channel reference handling.
pub mod channel;
/// Configuration management.
pub mod config;
/// Error types shared across the crate.
pub mod error;
/// Forwarding jobs: supervisor, executor and status rendering.
pub mod job;
/// Messaging platform contract.
pub mod platform;
/// Conversational job setup.
pub mod wizard;

#[cfg(test)]
pub mod testing;
