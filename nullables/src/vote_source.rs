//! Nullable vote source — an in-memory governance round.

use qd_rewards::{RewardError, VoteSource};
use qd_types::{ContributorEntry, VoteRecord};

pub struct NullVoteSource {
    votes: Vec<VoteRecord>,
    contributors: Vec<ContributorEntry>,
    failure: Option<String>,
}

impl NullVoteSource {
    pub fn new(votes: Vec<VoteRecord>, contributors: Vec<ContributorEntry>) -> Self {
        Self {
            votes,
            contributors,
            failure: None,
        }
    }

    /// A source whose every read fails with `detail`.
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            votes: Vec::new(),
            contributors: Vec::new(),
            failure: Some(detail.into()),
        }
    }

    fn check(&self) -> Result<(), RewardError> {
        match &self.failure {
            Some(detail) => Err(RewardError::Source(detail.clone())),
            None => Ok(()),
        }
    }
}

impl VoteSource for NullVoteSource {
    fn votes(&self) -> Result<Vec<VoteRecord>, RewardError> {
        self.check()?;
        Ok(self.votes.clone())
    }

    fn contributors(&self) -> Result<Vec<ContributorEntry>, RewardError> {
        self.check()?;
        Ok(self.contributors.clone())
    }
}
