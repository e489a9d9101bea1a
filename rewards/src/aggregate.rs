//! Vote aggregation: raw records → one quadratic aggregate per contributor.

use qd_types::{ContributorEntry, VoteRecord, WalletAddress};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::RewardError;

/// Per-contributor aggregate, derived from the full record set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContributorAggregate {
    pub wallet: WalletAddress,
    /// Name from the first record naming this contributor.
    pub name: String,
    /// `Σ sqrt(amount)` over every record naming this contributor.
    pub sqrt_vote_sum: f64,
    /// True once any record was cast by the contributor's own wallet.
    pub has_voted: bool,
}

/// All contributor aggregates for one round, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct VoteTally {
    aggregates: Vec<ContributorAggregate>,
    index: HashMap<WalletAddress, usize>,
    total_sqrt_votes: f64,
}

impl VoteTally {
    /// Reduce an ordered sequence of vote records.
    ///
    /// Fails on the first record whose amount is negative or non-finite;
    /// no partial tally is returned.
    pub fn from_records(records: &[VoteRecord]) -> Result<Self, RewardError> {
        let mut tally = VoteTally::default();

        for (position, record) in records.iter().enumerate() {
            let sqrt_vote = quadratic_weight(position, record)?;

            let slot = match tally.index.get(&record.contributor_wallet) {
                Some(&slot) => slot,
                None => {
                    tally.aggregates.push(ContributorAggregate {
                        wallet: record.contributor_wallet.clone(),
                        name: record.contributor_name.clone(),
                        sqrt_vote_sum: 0.0,
                        has_voted: false,
                    });
                    let slot = tally.aggregates.len() - 1;
                    tally.index.insert(record.contributor_wallet.clone(), slot);
                    slot
                }
            };

            let aggregate = &mut tally.aggregates[slot];
            aggregate.sqrt_vote_sum += sqrt_vote;
            if !aggregate.has_voted && record.is_self_attested() {
                aggregate.has_voted = true;
            }
            tally.total_sqrt_votes += sqrt_vote;
        }

        debug!(
            records = records.len(),
            contributors = tally.aggregates.len(),
            total_sqrt_votes = tally.total_sqrt_votes,
            "votes aggregated"
        );
        Ok(tally)
    }

    /// Sum of every contributor's `sqrt_vote_sum` (display only).
    pub fn total_sqrt_votes(&self) -> f64 {
        self.total_sqrt_votes
    }

    pub fn get(&self, wallet: &WalletAddress) -> Option<&ContributorAggregate> {
        self.index.get(wallet).map(|&slot| &self.aggregates[slot])
    }

    /// Aggregates in the order their contributor first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &ContributorAggregate> {
        self.aggregates.iter()
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Known contributors that have not cast a self-attested vote, including
    /// those absent from the tally altogether.
    pub fn missing_participants(&self, contributors: &[ContributorEntry]) -> Vec<ContributorEntry> {
        contributors
            .iter()
            .filter(|entry| !self.get(&entry.wallet).is_some_and(|a| a.has_voted))
            .cloned()
            .collect()
    }
}

fn quadratic_weight(position: usize, record: &VoteRecord) -> Result<f64, RewardError> {
    let amount = record.amount;
    let reason = if !amount.is_finite() {
        format!("amount {amount} is not finite")
    } else if amount < 0.0 {
        format!("amount {amount} is negative")
    } else {
        return Ok(amount.sqrt());
    };
    warn!(
        index = position,
        contributor = %record.contributor_wallet,
        "rejecting vote record: {reason}"
    );
    Err(RewardError::InvalidVoteRecord {
        index: position,
        reason,
    })
}
