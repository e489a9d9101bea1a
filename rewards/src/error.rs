//! Reward computation errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RewardError {
    #[error("invalid vote record #{index}: {reason}")]
    InvalidVoteRecord { index: usize, reason: String },

    #[error("no votes cast: quadratic shares are undefined")]
    NoVotesCast,

    #[error("reward pool must be a non-negative finite amount, got {0}")]
    InvalidRewardPool(f64),

    #[error("arithmetic overflow in quadratic sum")]
    Overflow,

    #[error("vote source error: {0}")]
    Source(String),
}
