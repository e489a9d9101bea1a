//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the payment core (payment gateway, role
//! lookup, notification sink, vote source) is abstracted behind a trait.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what they were asked to do
//! - Never touch the network or a real chain
//!
//! Usage: swap real implementations for nullables in tests.

pub mod access;
pub mod gateway;
pub mod notifier;
pub mod vote_source;

pub use access::NullAccess;
pub use gateway::NullGateway;
pub use notifier::NullNotifier;
pub use vote_source::NullVoteSource;
