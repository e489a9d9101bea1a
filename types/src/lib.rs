//! Fundamental types for quadratic reward rounds.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! wallet addresses, vote records, contributor entries, and ether amount helpers.

pub mod address;
pub mod amount;
pub mod error;
pub mod vote;

pub use address::WalletAddress;
pub use amount::{ether_to_wei, format_ether, parse_vote_weight, WEI_PER_ETHER};
pub use error::TypesError;
pub use vote::{ContributorEntry, VoteRecord};
