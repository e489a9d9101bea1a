//! One-call composition of the reward pipeline for a governance round.

use qd_types::{ContributorEntry, VoteRecord};
use serde::Serialize;

use crate::aggregate::VoteTally;
use crate::distribute::{Distribution, RewardDistributor};
use crate::error::RewardError;
use crate::share::QuadraticShares;
use crate::source::VoteSource;

/// Everything an operator needs to review before disbursing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundReport {
    pub total_sqrt_votes: f64,
    pub total_squared_sum: f64,
    pub distribution: Distribution,
}

impl RoundReport {
    /// Aggregate, share and distribute in one pass.
    pub fn compute(
        votes: &[VoteRecord],
        contributors: &[ContributorEntry],
        reward_pool: f64,
    ) -> Result<Self, RewardError> {
        let tally = VoteTally::from_records(votes)?;
        let shares = QuadraticShares::compute(&tally)?;
        let distribution = RewardDistributor::distribute(&tally, &shares, reward_pool, contributors)?;
        Ok(Self {
            total_sqrt_votes: tally.total_sqrt_votes(),
            total_squared_sum: shares.total_squared_sum(),
            distribution,
        })
    }

    /// Pull a round from a vote source and compute its report.
    pub fn from_source(source: &dyn VoteSource, reward_pool: f64) -> Result<Self, RewardError> {
        let votes = source.votes()?;
        let contributors = source.contributors()?;
        Self::compute(&votes, &contributors, reward_pool)
    }
}
