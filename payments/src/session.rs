//! A disbursement session: one round's allocation plus its payment state.
//!
//! The tally and shares are computed once when the session opens. Changing
//! the reward pool recomputes amounts from the retained shares and leaves
//! payment statuses untouched, so recipients already paid stay paid.

use qd_rewards::{
    Distribution, QuadraticShares, RewardAllocation, RewardDistributor, VoteSource, VoteTally,
};
use qd_types::{ContributorEntry, VoteRecord, WalletAddress};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::PaymentError;
use crate::machine::PaymentStateMachine;
use crate::metrics::PaymentMetrics;
use crate::status::{PaymentOutcome, PaymentStatus};

/// Recipient counts per payment status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: usize,
    pub in_flight: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct DisbursementSession {
    tally: VoteTally,
    shares: QuadraticShares,
    contributors: Vec<ContributorEntry>,
    distribution: RwLock<Distribution>,
    machine: PaymentStateMachine,
}

impl DisbursementSession {
    /// Compute the allocation for `reward_pool` and wrap it for payment.
    pub fn open(
        votes: &[VoteRecord],
        contributors: Vec<ContributorEntry>,
        reward_pool: f64,
        machine: PaymentStateMachine,
    ) -> Result<Self, PaymentError> {
        let tally = VoteTally::from_records(votes)?;
        let shares = QuadraticShares::compute(&tally)?;
        let distribution = RewardDistributor::distribute(&tally, &shares, reward_pool, &contributors)?;
        info!(
            recipients = distribution.allocations.len(),
            reward_pool,
            missing = distribution.missing_participants.len(),
            "disbursement session opened"
        );
        Ok(Self {
            tally,
            shares,
            contributors,
            distribution: RwLock::new(distribution),
            machine,
        })
    }

    pub fn from_source(
        source: &dyn VoteSource,
        reward_pool: f64,
        machine: PaymentStateMachine,
    ) -> Result<Self, PaymentError> {
        let votes = source.votes()?;
        let contributors = source.contributors()?;
        Self::open(&votes, contributors, reward_pool, machine)
    }

    /// Whether `caller` may trigger payments; others get a read-only view.
    pub fn is_authorized(&self, caller: &WalletAddress) -> bool {
        self.machine.gate().is_authorized(caller)
    }

    pub fn total_sqrt_votes(&self) -> f64 {
        self.tally.total_sqrt_votes()
    }

    pub fn missing_participants(&self) -> Vec<ContributorEntry> {
        self.tally.missing_participants(&self.contributors)
    }

    pub async fn distribution(&self) -> Distribution {
        self.distribution.read().await.clone()
    }

    pub async fn allocations(&self) -> Vec<RewardAllocation> {
        self.distribution.read().await.allocations.clone()
    }

    pub async fn reward_pool(&self) -> f64 {
        self.distribution.read().await.reward_pool
    }

    /// Change the pool and recompute every amount.
    pub async fn set_reward_pool(
        &self,
        caller: &WalletAddress,
        reward_pool: f64,
    ) -> Result<(), PaymentError> {
        self.machine.gate().authorize(caller, "set_reward_pool")?;
        let updated =
            RewardDistributor::distribute(&self.tally, &self.shares, reward_pool, &self.contributors)?;
        *self.distribution.write().await = updated;
        info!(caller = %caller, reward_pool, "reward pool updated");
        Ok(())
    }

    /// Pay one recipient its current allocation.
    pub async fn pay(
        &self,
        caller: &WalletAddress,
        wallet: &WalletAddress,
    ) -> Result<PaymentOutcome, PaymentError> {
        self.machine.gate().authorize(caller, "pay")?;
        let amount = self
            .distribution
            .read()
            .await
            .allocation_for(wallet)
            .map(|a| a.amount)
            .ok_or_else(|| PaymentError::UnknownRecipient(wallet.clone()))?;
        Ok(self.machine.pay(wallet, amount).await)
    }

    /// Pay every recipient in allocation order. Already-paid recipients come
    /// back as skipped.
    pub async fn pay_all(&self, caller: &WalletAddress) -> Result<Vec<PaymentOutcome>, PaymentError> {
        let recipients: Vec<(WalletAddress, f64)> = self
            .distribution
            .read()
            .await
            .allocations
            .iter()
            .map(|a| (a.wallet.clone(), a.amount))
            .collect();
        self.machine.disburse_all(caller, &recipients).await
    }

    pub async fn status(&self, wallet: &WalletAddress) -> PaymentStatus {
        self.machine.status(wallet).await
    }

    /// Status counts across every recipient in the allocation.
    pub async fn summary(&self) -> StatusSummary {
        let statuses = self.machine.statuses().await;
        let distribution = self.distribution.read().await;
        let mut summary = StatusSummary::default();
        for allocation in &distribution.allocations {
            match statuses.get(&allocation.wallet).copied().unwrap_or_default() {
                PaymentStatus::Pending => summary.pending += 1,
                PaymentStatus::InFlight => summary.in_flight += 1,
                PaymentStatus::Completed => summary.completed += 1,
                PaymentStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn metrics(&self) -> &PaymentMetrics {
        self.machine.metrics()
    }
}
