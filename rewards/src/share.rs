//! Quadratic share calculation.

use qd_types::WalletAddress;
use tracing::debug;

use crate::aggregate::VoteTally;
use crate::error::RewardError;

/// Normalised quadratic shares, in tally order.
///
/// Only contributors with a positive `sqrt_vote_sum` receive a share, so
/// every share is strictly positive and the shares sum to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadraticShares {
    shares: Vec<(WalletAddress, f64)>,
    total_squared_sum: f64,
}

impl QuadraticShares {
    /// `share(w) = sqrt_vote_sum(w)² / Σ sqrt_vote_sum²`.
    pub fn compute(tally: &VoteTally) -> Result<Self, RewardError> {
        let squares: Vec<(WalletAddress, f64)> = tally
            .iter()
            .filter(|a| a.sqrt_vote_sum > 0.0)
            .map(|a| (a.wallet.clone(), a.sqrt_vote_sum * a.sqrt_vote_sum))
            .collect();

        let total_squared_sum: f64 = squares.iter().map(|(_, square)| square).sum();
        if total_squared_sum == 0.0 {
            return Err(RewardError::NoVotesCast);
        }
        if !total_squared_sum.is_finite() {
            return Err(RewardError::Overflow);
        }

        let shares = squares
            .into_iter()
            .map(|(wallet, square)| (wallet, square / total_squared_sum))
            .collect::<Vec<_>>();

        debug!(
            recipients = shares.len(),
            total_squared_sum, "quadratic shares computed"
        );
        Ok(Self {
            shares,
            total_squared_sum,
        })
    }

    pub fn total_squared_sum(&self) -> f64 {
        self.total_squared_sum
    }

    pub fn share_of(&self, wallet: &WalletAddress) -> Option<f64> {
        self.shares
            .iter()
            .find(|(w, _)| w == wallet)
            .map(|(_, share)| *share)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WalletAddress, f64)> {
        self.shares.iter().map(|(wallet, share)| (wallet, *share))
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}
