//! Reward distribution: shares × pool → per-recipient amounts.

use qd_types::{ContributorEntry, WalletAddress};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::VoteTally;
use crate::error::RewardError;
use crate::share::QuadraticShares;

/// One recipient's slice of the reward pool.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RewardAllocation {
    pub wallet: WalletAddress,
    pub name: String,
    pub sqrt_vote_sum: f64,
    pub share: f64,
    /// Ether owed: `share × reward_pool`.
    pub amount: f64,
    pub has_voted: bool,
}

/// The full allocation for one pool amount.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    pub allocations: Vec<RewardAllocation>,
    /// Contributors that have not cast a self-attested vote. Reporting only.
    pub missing_participants: Vec<ContributorEntry>,
    pub reward_pool: f64,
}

impl Distribution {
    /// Sum of every allocation's amount; equals the pool up to rounding.
    pub fn total_allocated(&self) -> f64 {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    pub fn allocation_for(&self, wallet: &WalletAddress) -> Option<&RewardAllocation> {
        self.allocations.iter().find(|a| &a.wallet == wallet)
    }
}

pub struct RewardDistributor;

impl RewardDistributor {
    /// Split `reward_pool` across the recipients in `shares`.
    pub fn distribute(
        tally: &VoteTally,
        shares: &QuadraticShares,
        reward_pool: f64,
        contributors: &[ContributorEntry],
    ) -> Result<Distribution, RewardError> {
        if !reward_pool.is_finite() || reward_pool < 0.0 {
            return Err(RewardError::InvalidRewardPool(reward_pool));
        }

        let allocations: Vec<RewardAllocation> = shares
            .iter()
            .filter_map(|(wallet, share)| {
                let aggregate = tally.get(wallet)?;
                Some(RewardAllocation {
                    wallet: wallet.clone(),
                    name: aggregate.name.clone(),
                    sqrt_vote_sum: aggregate.sqrt_vote_sum,
                    share,
                    amount: share * reward_pool,
                    has_voted: aggregate.has_voted,
                })
            })
            .collect();

        let distribution = Distribution {
            allocations,
            missing_participants: tally.missing_participants(contributors),
            reward_pool,
        };
        debug!(
            reward_pool,
            recipients = distribution.allocations.len(),
            missing = distribution.missing_participants.len(),
            "reward pool distributed"
        );
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qd_types::VoteRecord;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{:0>40}", n)).unwrap()
    }

    fn vote(voter: u8, contributor: u8, amount: f64) -> VoteRecord {
        VoteRecord {
            voter_wallet: addr(voter),
            voting_address: addr(voter),
            contributor_wallet: addr(contributor),
            contributor_name: format!("member-{contributor}"),
            amount,
        }
    }

    fn make_distribution(pool: f64) -> Distribution {
        let tally = VoteTally::from_records(&[
            vote(1, 1, 4.0),
            vote(2, 1, 9.0),
            vote(2, 2, 9.0),
        ])
        .unwrap();
        let shares = QuadraticShares::compute(&tally).unwrap();
        let contributors = vec![
            ContributorEntry { wallet: addr(1), name: "one".into() },
            ContributorEntry { wallet: addr(2), name: "two".into() },
            ContributorEntry { wallet: addr(3), name: "three".into() },
        ];
        RewardDistributor::distribute(&tally, &shares, pool, &contributors).unwrap()
    }

    #[test]
    fn pool_of_340_splits_250_and_90() {
        let dist = make_distribution(340.0);
        let one = dist.allocation_for(&addr(1)).unwrap();
        let two = dist.allocation_for(&addr(2)).unwrap();
        assert!((one.amount - 250.0).abs() < 1e-9);
        assert!((two.amount - 90.0).abs() < 1e-9);
        assert!((one.share - 0.7353).abs() < 1e-4);
        assert!((two.share - 0.2647).abs() < 1e-4);
        assert!((dist.total_allocated() - 340.0).abs() < 1e-9);
    }

    #[test]
    fn absent_contributor_is_missing_not_allocated() {
        let dist = make_distribution(340.0);
        assert!(dist.allocation_for(&addr(3)).is_none());
        let missing: Vec<_> = dist.missing_participants.iter().map(|e| &e.wallet).collect();
        assert_eq!(missing, vec![&addr(3)]);
    }

    #[test]
    fn zero_pool_allocates_zero_to_everyone() {
        let dist = make_distribution(0.0);
        assert_eq!(dist.allocations.len(), 2);
        assert!(dist.allocations.iter().all(|a| a.amount == 0.0));
    }

    #[test]
    fn rejects_negative_or_non_finite_pool() {
        let tally = VoteTally::from_records(&[vote(1, 1, 1.0)]).unwrap();
        let shares = QuadraticShares::compute(&tally).unwrap();
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let result = RewardDistributor::distribute(&tally, &shares, bad, &[]);
            assert!(matches!(result, Err(RewardError::InvalidRewardPool(_))));
        }
    }
}
