//! Quadratic reward computation.
//!
//! A round's reward pool is split in three pure, synchronous stages:
//!
//! 1. [`VoteTally`] reduces raw vote records to one aggregate per contributor,
//!    summing `sqrt(amount)` so large single votes have diminishing influence.
//! 2. [`QuadraticShares`] squares each aggregate back up and normalises:
//!    `share(w) = sqrtVoteSum(w)² / Σ sqrtVoteSum²`.
//! 3. [`RewardDistributor`] multiplies each share by the pool.
//!
//! Every stage is recomputed from its inputs; nothing is cached or mutated
//! incrementally.

pub mod aggregate;
pub mod distribute;
pub mod error;
pub mod round;
pub mod share;
pub mod source;

pub use aggregate::{ContributorAggregate, VoteTally};
pub use distribute::{Distribution, RewardAllocation, RewardDistributor};
pub use error::RewardError;
pub use round::RoundReport;
pub use share::QuadraticShares;
pub use source::{RoundFile, VoteSource};
